// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;
use weave_url::UrlError;

#[derive(Error, Debug, PartialEq)]
pub enum RegistryError {
    #[error("registry could not be created: {0}")]
    CreationFailed(String),
    #[error("registry destroyed: {0}")]
    Destroyed(String),
    #[error("registry backend error: {0}")]
    Backend(String),
    #[error("invalid registry url: {0}")]
    Url(#[from] UrlError),
}
