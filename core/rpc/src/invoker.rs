// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::Value;
use tracing::debug;
use weave_url::Url;

use crate::errors::{RpcError, ServiceException};
use crate::invocation::{Invocation, RpcResult};

/// A callable reference bound to one service interface and one descriptor.
///
/// `invoke` runs on the caller's thread and may be called concurrently by
/// many callers sharing the same invoker. Once `destroy` has been called,
/// `invoke` must fail with [`RpcError::Destroyed`].
pub trait Invoker: Send + Sync {
    /// Name of the service interface this invoker serves.
    fn interface(&self) -> &str;

    fn url(&self) -> &Url;

    fn is_available(&self) -> bool;

    fn invoke(&self, invocation: &mut Invocation) -> Result<RpcResult, RpcError>;

    /// Release resources. Calling it more than once is harmless.
    fn destroy(&self);
}

type Handler = dyn Fn(&Invocation) -> Result<Value, ServiceException> + Send + Sync;

/// Terminal invoker backed by a local handler function.
pub struct ServiceInvoker {
    interface: String,
    url: Url,
    handler: Box<Handler>,
    destroyed: AtomicBool,
}

impl ServiceInvoker {
    pub fn new<F>(interface: impl Into<String>, url: Url, handler: F) -> Self
    where
        F: Fn(&Invocation) -> Result<Value, ServiceException> + Send + Sync + 'static,
    {
        ServiceInvoker {
            interface: interface.into(),
            url,
            handler: Box::new(handler),
            destroyed: AtomicBool::new(false),
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::Acquire)
    }
}

impl Invoker for ServiceInvoker {
    fn interface(&self) -> &str {
        &self.interface
    }

    fn url(&self) -> &Url {
        &self.url
    }

    fn is_available(&self) -> bool {
        !self.is_destroyed()
    }

    fn invoke(&self, invocation: &mut Invocation) -> Result<RpcResult, RpcError> {
        if self.is_destroyed() {
            return Err(RpcError::Destroyed(self.url.to_identity_string()));
        }

        let result = match (self.handler)(invocation) {
            Ok(value) => RpcResult::new(value),
            Err(e) => {
                debug!(interface = %self.interface, method = invocation.method_name(), error = %e, "service raised an exception");
                RpcResult::from_exception(e)
            }
        };
        Ok(result)
    }

    fn destroy(&self) {
        if !self.destroyed.swap(true, Ordering::AcqRel) {
            debug!(url = %self.url.to_identity_string(), "invoker destroyed");
        }
    }
}

impl fmt::Debug for ServiceInvoker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceInvoker")
            .field("interface", &self.interface)
            .field("url", &self.url.to_identity_string())
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}
