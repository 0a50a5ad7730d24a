// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use std::time;

use duration_str::deserialize_duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::runtime::{Builder, Runtime};
use tracing::{info, warn};

use weave_config::configuration::{Configuration, ConfigurationError};

#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("invalid runtime configuration: {0}")]
    Config(#[from] ConfigurationError),
    #[error("failed to build runtime: {0}")]
    Build(#[from] std::io::Error),
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RuntimeConfiguration {
    /// the number of cores to use for this runtime
    #[serde(default = "default_n_cores")]
    n_cores: usize,

    /// the thread name for the runtime
    #[serde(default = "default_thread_name")]
    thread_name: String,

    /// the time allowed for tearing down the registries at shutdown
    #[serde(
        default = "default_drain_timeout",
        deserialize_with = "deserialize_duration"
    )]
    drain_timeout: time::Duration,
}

impl Default for RuntimeConfiguration {
    fn default() -> Self {
        RuntimeConfiguration {
            n_cores: default_n_cores(),
            thread_name: default_thread_name(),
            drain_timeout: default_drain_timeout(),
        }
    }
}

fn default_n_cores() -> usize {
    // 0 means use all available cores
    0
}

fn default_thread_name() -> String {
    "weave".to_string()
}

fn default_drain_timeout() -> time::Duration {
    time::Duration::from_secs(10)
}

impl RuntimeConfiguration {
    pub fn new() -> Self {
        RuntimeConfiguration::default()
    }

    pub fn with_cores(self, n_cores: usize) -> Self {
        RuntimeConfiguration { n_cores, ..self }
    }

    pub fn with_thread_name(self, thread_name: &str) -> Self {
        RuntimeConfiguration {
            thread_name: thread_name.to_string(),
            ..self
        }
    }

    pub fn with_drain_timeout(self, drain_timeout: time::Duration) -> Self {
        RuntimeConfiguration {
            drain_timeout,
            ..self
        }
    }

    pub fn n_cores(&self) -> usize {
        self.n_cores
    }

    pub fn thread_name(&self) -> &str {
        &self.thread_name
    }

    pub fn drain_timeout(&self) -> time::Duration {
        self.drain_timeout
    }
}

impl Configuration for RuntimeConfiguration {
    type Error = ConfigurationError;

    fn validate(&self) -> Result<(), Self::Error> {
        if self.thread_name.is_empty() {
            return Err(ConfigurationError::MissingField("thread_name".to_string()));
        }
        if self.drain_timeout.is_zero() {
            return Err(ConfigurationError::InvalidValue {
                field: "drain_timeout".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

pub struct WeaveRuntime {
    pub config: RuntimeConfiguration,
    pub runtime: Runtime,
}

pub fn build(config: &RuntimeConfiguration) -> Result<WeaveRuntime, RuntimeError> {
    config.validate()?;

    let n_cpu = num_cpus::get();
    let cores = if config.n_cores > n_cpu {
        warn!(
            requested = config.n_cores,
            available = n_cpu,
            "requested more cores than available, using all available cores"
        );
        n_cpu
    } else if config.n_cores == 0 {
        info!(%n_cpu, "using all available cores");
        n_cpu
    } else {
        config.n_cores
    };

    let runtime = match cores {
        1 => {
            info!("using single-threaded runtime");
            Builder::new_current_thread()
                .enable_all()
                .thread_name(config.thread_name.as_str())
                .build()?
        }
        _ => {
            info!(%cores, "using multi-threaded runtime");
            Builder::new_multi_thread()
                .enable_all()
                .thread_name(config.thread_name.as_str())
                .worker_threads(cores)
                .build()?
        }
    };

    Ok(WeaveRuntime {
        config: config.clone(),
        runtime,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_configuration() {
        let config = RuntimeConfiguration::default();
        assert_eq!(config.n_cores(), 0);
        assert_eq!(config.thread_name(), "weave");
        assert_eq!(config.drain_timeout(), time::Duration::from_secs(10));

        let config: RuntimeConfiguration =
            serde_yaml::from_str("n_cores: 2\ndrain_timeout: 90s\n").unwrap();
        assert_eq!(config.n_cores(), 2);
        assert_eq!(config.thread_name(), "weave");
        assert_eq!(config.drain_timeout(), time::Duration::from_secs(90));
    }

    #[test]
    fn test_runtime_configuration_validation() {
        assert!(RuntimeConfiguration::new().validate().is_ok());

        let config = RuntimeConfiguration::new().with_thread_name("");
        assert_eq!(
            config.validate(),
            Err(ConfigurationError::MissingField("thread_name".to_string()))
        );

        let config = RuntimeConfiguration::new().with_drain_timeout(time::Duration::ZERO);
        assert!(matches!(
            build(&config),
            Err(RuntimeError::Config(ConfigurationError::InvalidValue { .. }))
        ));
    }

    #[test]
    fn test_runtime_builder() {
        let runtime = build(&RuntimeConfiguration::default()).unwrap();
        assert_eq!(runtime.config.n_cores(), 0);

        let config = RuntimeConfiguration::new().with_cores(1).with_thread_name("test");
        let runtime = build(&config).unwrap();
        assert_eq!(runtime.runtime.block_on(async { 7 }), 7);

        // more cores than the host has falls back to all of them
        let runtime = build(&RuntimeConfiguration::new().with_cores(10_000)).unwrap();
        assert_eq!(runtime.config.n_cores(), 10_000);
    }
}
