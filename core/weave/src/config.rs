// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0
//
// ConfigLoader reads the configuration file once and exposes lazy, cached
// accessors for tracing, runtime and registries. Each section is decoded
// only when requested.

use std::collections::{BTreeMap, HashSet};

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use thiserror::Error;
use tracing::debug;

use crate::runtime::RuntimeConfiguration;
use weave_config::configuration::{Configuration, ConfigurationError};
use weave_config::provider::ConfigResolver;
use weave_tracing::TracingConfiguration;
use weave_url::{Url, UrlError};

#[derive(Error, Debug)]
pub enum ConfigError {
    // File / I/O
    #[error("not found: {0}")]
    NotFound(String),

    // Parsing / structural validity
    #[error("invalid configuration - impossible to parse yaml")]
    InvalidYaml,
    #[error("invalid configuration - key {0} not valid")]
    InvalidKey(String),
    #[error("invalid configuration - {section}: {reason}")]
    Invalid { section: String, reason: String },

    // YAML decoding
    #[error("yaml parse error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    // Placeholder resolution
    #[error("invalid configuration - {0}")]
    ResolverError(String),
}

lazy_static! {
    static ref CONFIG_KEYS: HashSet<&'static str> = {
        let mut s = HashSet::new();
        s.insert("tracing");
        s.insert("runtime");
        s.insert("registries");
        s
    };
}

/// One entry of the `registries` section.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig {
    /// Registry address, e.g. `memory://127.0.0.1:2181?application=demo`
    url: String,

    /// Extra parameters added to the descriptor parsed from `url`
    #[serde(default)]
    parameters: BTreeMap<String, String>,
}

impl RegistryConfig {
    pub fn new(url: impl Into<String>) -> Self {
        RegistryConfig {
            url: url.into(),
            parameters: BTreeMap::new(),
        }
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn descriptor(&self) -> Result<Url, UrlError> {
        let url: Url = self.url.parse()?;
        Ok(url.add_parameters(&self.parameters))
    }
}

impl Configuration for RegistryConfig {
    type Error = ConfigurationError;

    fn validate(&self) -> Result<(), Self::Error> {
        if self.url.trim().is_empty() {
            return Err(ConfigurationError::MissingField("url".to_string()));
        }

        let url = self
            .descriptor()
            .map_err(|e| ConfigurationError::InvalidValue {
                field: "url".to_string(),
                reason: e.to_string(),
            })?;
        if url.host().is_empty() {
            return Err(ConfigurationError::InvalidValue {
                field: "url".to_string(),
                reason: format!("{} has no host", self.url),
            });
        }

        Ok(())
    }
}

pub struct ConfigLoader {
    root: Value,
    tracing: Option<TracingConfiguration>,
    runtime: Option<RuntimeConfiguration>,
    registries: Option<Vec<RegistryConfig>>,
}

impl std::fmt::Debug for ConfigLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let root_keys = self
            .root
            .as_mapping()
            .map(|m| {
                m.keys()
                    .filter_map(|k| k.as_str())
                    .map(|s| s.to_string())
                    .collect::<Vec<String>>()
            })
            .unwrap_or_default();

        f.debug_struct("ConfigLoader")
            .field("root_keys", &root_keys)
            .field("tracing_loaded", &self.tracing.is_some())
            .field("runtime_loaded", &self.runtime.is_some())
            .field("registries_count", &self.registries.as_ref().map(|r| r.len()))
            .finish()
    }
}

impl ConfigLoader {
    pub fn new(file_path: &str) -> Result<Self, ConfigError> {
        let config_str = std::fs::read_to_string(file_path)
            .map_err(|e| ConfigError::NotFound(format!("{}: {}", file_path, e)))?;
        Self::from_yaml(&config_str)
    }

    pub fn from_yaml(config_str: &str) -> Result<Self, ConfigError> {
        let mut root: Value =
            serde_yaml::from_str(config_str).map_err(|_| ConfigError::InvalidYaml)?;

        // an empty document is an empty configuration
        if root.is_null() {
            root = Value::Mapping(Mapping::new());
        }

        let mapping = root.as_mapping().ok_or(ConfigError::InvalidYaml)?;
        for key in mapping.keys() {
            let k = key.as_str().ok_or(ConfigError::InvalidYaml)?;
            if !CONFIG_KEYS.contains(k) {
                return Err(ConfigError::InvalidKey(k.to_string()));
            }
        }

        ConfigResolver::new()
            .resolve(&mut root)
            .map_err(|e| ConfigError::ResolverError(e.to_string()))?;

        Ok(Self {
            root,
            tracing: None,
            runtime: None,
            registries: None,
        })
    }

    pub fn tracing(&mut self) -> Result<&TracingConfiguration, ConfigError> {
        if self.tracing.is_none() {
            let cfg: TracingConfiguration = self.section("tracing")?.unwrap_or_default();
            debug!(?cfg, "tracing configuration loaded");
            self.tracing = Some(cfg);
        }
        Ok(self.tracing.get_or_insert_with(TracingConfiguration::default))
    }

    pub fn runtime(&mut self) -> Result<&RuntimeConfiguration, ConfigError> {
        if self.runtime.is_none() {
            let cfg: RuntimeConfiguration = self.section("runtime")?.unwrap_or_default();
            cfg.validate().map_err(|e| ConfigError::Invalid {
                section: "runtime".to_string(),
                reason: e.to_string(),
            })?;
            debug!(?cfg, "runtime configuration loaded");
            self.runtime = Some(cfg);
        }
        Ok(self.runtime.get_or_insert_with(RuntimeConfiguration::default))
    }

    /// Registries to connect at startup. A missing section means none.
    pub fn registries(&mut self) -> Result<&[RegistryConfig], ConfigError> {
        if self.registries.is_none() {
            let registries: Vec<RegistryConfig> = self.section("registries")?.unwrap_or_default();
            for (i, registry) in registries.iter().enumerate() {
                registry.validate().map_err(|e| ConfigError::Invalid {
                    section: format!("registries[{}]", i),
                    reason: e.to_string(),
                })?;
            }
            debug!(count = registries.len(), "registries configuration loaded");
            self.registries = Some(registries);
        }
        Ok(self.registries.get_or_insert_with(Vec::new))
    }

    fn section<T>(&self, key: &str) -> Result<Option<T>, ConfigError>
    where
        T: for<'de> Deserialize<'de>,
    {
        match self.root.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(v) => Ok(Some(serde_yaml::from_value(v.clone())?)),
        }
    }
}
