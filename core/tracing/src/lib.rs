// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

#[derive(Error, Debug)]
pub enum TracingError {
    #[error("invalid log filter {filter}: {reason}")]
    InvalidFilter { filter: String, reason: String },
    #[error("a global subscriber is already installed: {0}")]
    AlreadyInstalled(String),
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TracingConfiguration {
    #[serde(default = "default_log_level")]
    log_level: String,

    #[serde(default = "default_display_thread_names")]
    display_thread_names: bool,

    #[serde(default = "default_display_thread_ids")]
    display_thread_ids: bool,

    /// Directives in `EnvFilter` syntax, e.g. `info,weave_registry=debug`.
    #[serde(default = "default_filter")]
    filter: String,
}

impl Default for TracingConfiguration {
    fn default() -> Self {
        TracingConfiguration {
            log_level: default_log_level(),
            display_thread_names: default_display_thread_names(),
            display_thread_ids: default_display_thread_ids(),
            filter: default_filter(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_display_thread_names() -> bool {
    true
}

fn default_display_thread_ids() -> bool {
    false
}

fn default_filter() -> String {
    "info".to_string()
}

fn resolve_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

impl TracingConfiguration {
    pub fn with_log_level(self, log_level: impl Into<String>) -> Self {
        TracingConfiguration {
            log_level: log_level.into(),
            ..self
        }
    }

    pub fn with_display_thread_names(self, display_thread_names: bool) -> Self {
        TracingConfiguration {
            display_thread_names,
            ..self
        }
    }

    pub fn with_display_thread_ids(self, display_thread_ids: bool) -> Self {
        TracingConfiguration {
            display_thread_ids,
            ..self
        }
    }

    pub fn with_filter(self, filter: impl Into<String>) -> Self {
        TracingConfiguration {
            filter: filter.into(),
            ..self
        }
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    pub fn display_thread_names(&self) -> bool {
        self.display_thread_names
    }

    pub fn display_thread_ids(&self) -> bool {
        self.display_thread_ids
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Build the event filter. `RUST_LOG` takes precedence over the
    /// configured directives. A `filter` left empty or at its default
    /// defers to `log_level`, which also applies to targets no directive
    /// names.
    pub fn env_filter(&self) -> Result<EnvFilter, TracingError> {
        let max = LevelFilter::from_level(resolve_level(&self.log_level));
        let directives = std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_else(|_| {
            if self.filter.trim().is_empty() || self.filter == default_filter() {
                max.to_string()
            } else {
                self.filter.clone()
            }
        });

        EnvFilter::builder()
            .with_default_directive(max.into())
            .parse(&directives)
            .map_err(|e| TracingError::InvalidFilter {
                filter: directives.clone(),
                reason: e.to_string(),
            })
    }

    /// Install a subscriber that logs to stdout.
    pub fn setup_tracing_subscriber(&self) -> Result<(), TracingError> {
        let filter = self.env_filter()?;

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_thread_names(self.display_thread_names)
            .with_thread_ids(self.display_thread_ids)
            .try_init()
            .map_err(|e| TracingError::AlreadyInstalled(e.to_string()))
    }
}
