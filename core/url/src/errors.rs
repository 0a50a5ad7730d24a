// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UrlError {
    #[error("invalid descriptor: {0}")]
    Parse(#[from] url::ParseError),
    #[error("descriptor has no authority (expected scheme://host[:port]): {0}")]
    MissingAuthority(String),
    #[error("empty protocol in descriptor: {0}")]
    EmptyProtocol(String),
}
