// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure reported by the remote service itself. It travels inside a
/// [`crate::RpcResult`] and is never produced by the framework.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct ServiceException {
    kind: String,
    message: String,
}

impl ServiceException {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        ServiceException {
            kind: kind.into(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtensionError {
    #[error("extension {name} already registered for {capability}")]
    Duplicate { capability: String, name: String },
    #[error("no extension named {name} for {capability}")]
    Unknown { capability: String, name: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RpcError {
    // Transport
    #[error("network error: {0}")]
    Network(String),
    #[error("timeout: {0}")]
    Timeout(String),
    #[error("serialization error: {0}")]
    Serialization(String),

    // Access
    #[error("forbidden: {0}")]
    Forbidden(String),

    // Invoker lifecycle
    #[error("invoker for {0} is destroyed")]
    Destroyed(String),
    #[error("invoker for {0} is not available")]
    Unavailable(String),
    #[error("no exporter for service {0}")]
    NoExporter(String),

    // Chain assembly
    #[error("extension error: {0}")]
    Extension(#[from] ExtensionError),

    // A filter wrapping the failure of the rest of the chain
    #[error("filter {name} failed: {source}")]
    Filter { name: String, source: Box<RpcError> },

    // Business failure of the remote service, recreated for the caller
    #[error("service error: {0}")]
    Biz(#[from] ServiceException),

    #[error("unknown error: {0}")]
    Unknown(String),
}

impl RpcError {
    /// Wrap an error raised further down the chain, keeping its category.
    pub fn in_filter(name: impl Into<String>, source: RpcError) -> Self {
        RpcError::Filter {
            name: name.into(),
            source: Box::new(source),
        }
    }

    /// True for failures reported by the remote service itself.
    pub fn is_biz(&self) -> bool {
        match self {
            RpcError::Biz(_) => true,
            RpcError::Filter { source, .. } => source.is_biz(),
            _ => false,
        }
    }

    /// True for failures raised by the chain or the transport.
    pub fn is_framework(&self) -> bool {
        !self.is_biz()
    }

    /// The innermost error, looking through filter wrappers.
    pub fn root(&self) -> &RpcError {
        match self {
            RpcError::Filter { source, .. } => source.root(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_survives_wrapping() {
        let biz = RpcError::from(ServiceException::new("IllegalArgument", "bad name"));
        let wrapped = RpcError::in_filter("outer", RpcError::in_filter("inner", biz.clone()));

        assert!(wrapped.is_biz());
        assert_eq!(wrapped.root(), &biz);
        assert!(wrapped.to_string().contains("filter outer failed"));

        let timeout = RpcError::in_filter("outer", RpcError::Timeout("3s".to_string()));
        assert!(timeout.is_framework());
        assert!(!timeout.is_biz());
    }

    #[test]
    fn test_extension_error_is_framework() {
        let err = RpcError::from(ExtensionError::Unknown {
            capability: "filter".to_string(),
            name: "nope".to_string(),
        });
        assert!(err.is_framework());
        assert_eq!(
            err.to_string(),
            "extension error: no extension named nope for filter"
        );
    }
}
