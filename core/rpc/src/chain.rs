// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::sync::Arc;

use tracing::debug;
use weave_url::Url;

use crate::errors::RpcError;
use crate::extension::ExtensionSelector;
use crate::filter::Filter;
use crate::invocation::{Invocation, RpcResult};
use crate::invoker::Invoker;

/// One link of a filter chain: runs `filter` with `next` as the rest of the
/// chain. Identity and lifecycle calls go to `origin`, the invoker the chain
/// was built around, whatever the depth of the link.
pub struct FilterChainNode {
    origin: Arc<dyn Invoker>,
    filter: Arc<dyn Filter>,
    next: Arc<dyn Invoker>,
}

impl FilterChainNode {
    pub fn new(origin: Arc<dyn Invoker>, filter: Arc<dyn Filter>, next: Arc<dyn Invoker>) -> Self {
        FilterChainNode {
            origin,
            filter,
            next,
        }
    }
}

impl Invoker for FilterChainNode {
    fn interface(&self) -> &str {
        self.origin.interface()
    }

    fn url(&self) -> &Url {
        self.origin.url()
    }

    fn is_available(&self) -> bool {
        self.origin.is_available()
    }

    fn invoke(&self, invocation: &mut Invocation) -> Result<RpcResult, RpcError> {
        self.filter.invoke(self.next.as_ref(), invocation)
    }

    fn destroy(&self) {
        self.origin.destroy()
    }
}

impl fmt::Debug for FilterChainNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterChainNode")
            .field("interface", &self.origin.interface())
            .field("url", &self.origin.url().to_identity_string())
            .finish()
    }
}

/// Wrap `invoker` so that a call goes through `filters` in order, the first
/// filter being the outermost, before reaching `invoker`.
pub fn build_chain(invoker: Arc<dyn Invoker>, filters: Vec<Arc<dyn Filter>>) -> Arc<dyn Invoker> {
    filters
        .into_iter()
        .rev()
        .fold(invoker.clone(), |next, filter| -> Arc<dyn Invoker> {
            Arc::new(FilterChainNode::new(invoker.clone(), filter, next))
        })
}

/// Select the filters for `invoker`'s descriptor and wrap it with them.
pub fn build_invoker_chain(
    invoker: Arc<dyn Invoker>,
    selector: &dyn ExtensionSelector<dyn Filter>,
    key: &str,
    group: &str,
) -> Result<Arc<dyn Invoker>, RpcError> {
    let filters = selector.select(invoker.url(), key, group)?;
    debug!(
        interface = invoker.interface(),
        group,
        filters = filters.len(),
        "building filter chain"
    );

    Ok(build_chain(invoker, filters))
}
