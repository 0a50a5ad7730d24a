// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

mod env;
mod file;

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde_yaml::Value;
use thiserror::Error;
use tracing::debug;

pub use env::EnvConfigProvider;
pub use file::FileConfigProvider;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("environment variable {0}: {1}")]
    EnvError(String, std::env::VarError),
    #[error("unknown config provider: {0}")]
    UnknownProvider(String),
}

pub trait ConfigProvider: Send + Sync {
    /// Load the value addressed by `key`.
    fn load(&self, key: &str) -> Result<String, ProviderError>;
}

lazy_static! {
    static ref PLACEHOLDER: Regex =
        Regex::new(r"\$\{([a-z]+):([^}]+)\}").expect("placeholder regex must compile");
}

/// Replaces `${provider:key}` placeholders found in string values with the
/// value loaded from the named provider.
pub struct ConfigResolver {
    providers: HashMap<&'static str, Box<dyn ConfigProvider>>,
}

impl Default for ConfigResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigResolver {
    pub fn new() -> Self {
        let mut providers: HashMap<&'static str, Box<dyn ConfigProvider>> = HashMap::new();
        providers.insert("env", Box::new(EnvConfigProvider));
        providers.insert("file", Box::new(FileConfigProvider));
        ConfigResolver { providers }
    }

    /// Resolve every placeholder in `value`, walking sequences and mappings.
    pub fn resolve(&self, value: &mut Value) -> Result<(), ProviderError> {
        match value {
            Value::String(s) => {
                if let Some(resolved) = self.resolve_str(s)? {
                    *s = resolved;
                }
            }
            Value::Sequence(seq) => {
                for v in seq.iter_mut() {
                    self.resolve(v)?;
                }
            }
            Value::Mapping(map) => {
                for (_, v) in map.iter_mut() {
                    self.resolve(v)?;
                }
            }
            Value::Tagged(tagged) => self.resolve(&mut tagged.value)?,
            _ => {}
        }

        Ok(())
    }

    fn resolve_str(&self, input: &str) -> Result<Option<String>, ProviderError> {
        if !PLACEHOLDER.is_match(input) {
            return Ok(None);
        }

        let mut failure = None;
        let out = PLACEHOLDER.replace_all(input, |caps: &Captures| {
            let (provider, key) = (&caps[1], &caps[2]);
            let loaded = match self.providers.get(provider) {
                Some(p) => p.load(key),
                None => Err(ProviderError::UnknownProvider(provider.to_string())),
            };
            match loaded {
                Ok(v) => {
                    debug!(provider, key, "config value resolved");
                    v
                }
                Err(e) => {
                    if failure.is_none() {
                        failure = Some(e);
                    }
                    String::new()
                }
            }
        });

        match failure {
            Some(e) => Err(e),
            None => Ok(Some(out.into_owned())),
        }
    }
}
