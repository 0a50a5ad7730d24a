// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use tracing::debug;
use weave_url::Url;

use crate::chain::build_invoker_chain;
use crate::constants::{CONSUMER, PROVIDER, REFERENCE_FILTER_KEY, REGISTRY_PROTOCOL, SERVICE_FILTER_KEY};
use crate::errors::RpcError;
use crate::extension::ExtensionSelector;
use crate::filter::Filter;
use crate::invoker::Invoker;
use crate::protocol::{Exporter, Protocol};

/// Protocol decorator that puts every exported and referenced invoker behind
/// the filters selected for it.
///
/// Invokers addressed with the registry meta-protocol pass through untouched:
/// the registry protocol exports and refers through this same decorator, so
/// wrapping them here as well would run each filter twice.
pub struct ProtocolFilterWrapper {
    protocol: Arc<dyn Protocol>,
    selector: Arc<dyn ExtensionSelector<dyn Filter>>,
}

impl ProtocolFilterWrapper {
    pub fn new(protocol: Arc<dyn Protocol>, selector: Arc<dyn ExtensionSelector<dyn Filter>>) -> Self {
        ProtocolFilterWrapper { protocol, selector }
    }

    pub fn inner(&self) -> &Arc<dyn Protocol> {
        &self.protocol
    }
}

fn is_registry(url: &Url) -> bool {
    url.protocol() == REGISTRY_PROTOCOL
}

impl Protocol for ProtocolFilterWrapper {
    fn default_port(&self) -> u16 {
        self.protocol.default_port()
    }

    fn export(&self, invoker: Arc<dyn Invoker>) -> Result<Arc<dyn Exporter>, RpcError> {
        if is_registry(invoker.url()) {
            debug!(url = %invoker.url().to_identity_string(), "registry export, skipping filter chain");
            return self.protocol.export(invoker);
        }

        let chain = build_invoker_chain(invoker, self.selector.as_ref(), SERVICE_FILTER_KEY, PROVIDER)?;
        self.protocol.export(chain)
    }

    fn refer(&self, interface: &str, url: &Url) -> Result<Arc<dyn Invoker>, RpcError> {
        if is_registry(url) {
            debug!(url = %url.to_identity_string(), "registry refer, skipping filter chain");
            return self.protocol.refer(interface, url);
        }

        let invoker = self.protocol.refer(interface, url)?;
        build_invoker_chain(invoker, self.selector.as_ref(), REFERENCE_FILTER_KEY, CONSUMER)
    }

    fn destroy(&self) {
        self.protocol.destroy()
    }
}
