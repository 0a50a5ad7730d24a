// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use std::env;

use super::ConfigProvider;
use super::ProviderError;

// Environment based config provider: `${env:NAME}`
pub struct EnvConfigProvider;

impl ConfigProvider for EnvConfigProvider {
    fn load(&self, name: &str) -> Result<String, ProviderError> {
        env::var(name).map_err(|e| ProviderError::EnvError(name.to_string(), e))
    }
}
