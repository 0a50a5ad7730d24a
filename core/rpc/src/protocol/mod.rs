// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

pub mod filter_wrapper;
pub mod local;

use std::sync::Arc;

use weave_url::Url;

use crate::errors::RpcError;
use crate::invoker::Invoker;

/// Handle of an exported service.
pub trait Exporter: Send + Sync {
    /// The invoker serving the export, including any filter chain.
    fn invoker(&self) -> Arc<dyn Invoker>;

    /// Stop serving. Calling it more than once is harmless.
    fn unexport(&self);
}

/// Transport able to publish invokers and to build invokers for remote
/// services.
pub trait Protocol: Send + Sync {
    fn default_port(&self) -> u16;

    fn export(&self, invoker: Arc<dyn Invoker>) -> Result<Arc<dyn Exporter>, RpcError>;

    fn refer(&self, interface: &str, url: &Url) -> Result<Arc<dyn Invoker>, RpcError>;

    /// Unexport every service and destroy every invoker created by `refer`.
    fn destroy(&self);
}
