// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use crate::errors::RpcError;
use crate::invocation::{Invocation, RpcResult};
use crate::invoker::Invoker;

/// Interceptor placed around an invoker.
///
/// A filter receives the rest of the chain as `next` and decides whether and
/// how to forward the invocation. One chain instance is shared by all callers
/// of an exported or referenced service, so filters must be stateless or
/// synchronize internally. Filters that wrap an error coming from `next`
/// must keep its category (see [`RpcError::in_filter`]).
pub trait Filter: Send + Sync {
    fn invoke(&self, next: &dyn Invoker, invocation: &mut Invocation)
    -> Result<RpcResult, RpcError>;
}
