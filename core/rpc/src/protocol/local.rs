// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};
use weave_url::Url;

use crate::errors::RpcError;
use crate::invocation::{Invocation, RpcResult};
use crate::invoker::Invoker;
use crate::protocol::{Exporter, Protocol};

pub const LOCAL_PROTOCOL: &str = "local";

type ExporterMap = RwLock<HashMap<String, Arc<LocalExporter>>>;

fn service_key(url: &Url, interface: &str) -> String {
    url.service_key().unwrap_or_else(|| interface.to_string())
}

/// In-process transport: references dispatch directly to the invoker
/// exported under the same service key.
#[derive(Default)]
pub struct LocalProtocol {
    exporters: Arc<ExporterMap>,
    references: Mutex<Vec<Weak<LocalInvoker>>>,
}

impl LocalProtocol {
    pub fn new() -> Self {
        LocalProtocol::default()
    }

    pub fn is_exported(&self, key: &str) -> bool {
        self.exporters.read().contains_key(key)
    }
}

impl Protocol for LocalProtocol {
    fn default_port(&self) -> u16 {
        0
    }

    fn export(&self, invoker: Arc<dyn Invoker>) -> Result<Arc<dyn Exporter>, RpcError> {
        let key = service_key(invoker.url(), invoker.interface());
        let exporter = Arc::new(LocalExporter {
            key: key.clone(),
            invoker,
            exporters: Arc::downgrade(&self.exporters),
            unexported: AtomicBool::new(false),
        });

        if self
            .exporters
            .write()
            .insert(key.clone(), exporter.clone())
            .is_some()
        {
            warn!(%key, "service exported twice, replacing previous export");
        }
        debug!(%key, "service exported");

        Ok(exporter)
    }

    fn refer(&self, interface: &str, url: &Url) -> Result<Arc<dyn Invoker>, RpcError> {
        let invoker = Arc::new(LocalInvoker {
            interface: interface.to_string(),
            key: service_key(url, interface),
            url: url.clone(),
            exporters: self.exporters.clone(),
            destroyed: AtomicBool::new(false),
        });
        {
            let mut references = self.references.lock();
            // forget references that were dropped or destroyed
            references.retain(|r| r.upgrade().is_some_and(|i| !i.destroyed.load(Ordering::Acquire)));
            references.push(Arc::downgrade(&invoker));
        }
        debug!(key = %invoker.key, "service referred");

        Ok(invoker)
    }

    fn destroy(&self) {
        let exporters: Vec<_> = self.exporters.read().values().cloned().collect();
        for exporter in exporters {
            exporter.unexport();
        }

        let references: Vec<_> = self.references.lock().drain(..).collect();
        for invoker in references.iter().filter_map(Weak::upgrade) {
            invoker.destroy();
        }
    }
}

pub struct LocalExporter {
    key: String,
    invoker: Arc<dyn Invoker>,
    exporters: Weak<ExporterMap>,
    unexported: AtomicBool,
}

impl Exporter for LocalExporter {
    fn invoker(&self) -> Arc<dyn Invoker> {
        self.invoker.clone()
    }

    fn unexport(&self) {
        if self.unexported.swap(true, Ordering::AcqRel) {
            return;
        }

        if let Some(exporters) = self.exporters.upgrade() {
            let mut exporters = exporters.write();
            // a later export of the same key may have replaced this one
            if exporters
                .get(&self.key)
                .is_some_and(|current| std::ptr::eq(current.as_ref(), self))
            {
                exporters.remove(&self.key);
            }
        }

        self.invoker.destroy();
        debug!(key = %self.key, "service unexported");
    }
}

pub struct LocalInvoker {
    interface: String,
    key: String,
    url: Url,
    exporters: Arc<ExporterMap>,
    destroyed: AtomicBool,
}

impl Invoker for LocalInvoker {
    fn interface(&self) -> &str {
        &self.interface
    }

    fn url(&self) -> &Url {
        &self.url
    }

    fn is_available(&self) -> bool {
        !self.destroyed.load(Ordering::Acquire) && self.exporters.read().contains_key(&self.key)
    }

    fn invoke(&self, invocation: &mut Invocation) -> Result<RpcResult, RpcError> {
        if self.destroyed.load(Ordering::Acquire) {
            return Err(RpcError::Destroyed(self.url.to_identity_string()));
        }

        // release the map before calling into the service
        let exporter = self.exporters.read().get(&self.key).cloned();
        match exporter {
            Some(exporter) => exporter.invoker.invoke(invocation),
            None => Err(RpcError::NoExporter(self.key.clone())),
        }
    }

    fn destroy(&self) {
        self.destroyed.store(true, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoker::ServiceInvoker;
    use serde_json::json;

    fn url() -> Url {
        "local://127.0.0.1/demo.Greeter?version=1.0".parse().unwrap()
    }

    fn exported(protocol: &LocalProtocol) -> Arc<dyn Exporter> {
        let invoker = ServiceInvoker::new("demo.Greeter", url(), |_| Ok(json!("hi")));
        protocol.export(Arc::new(invoker)).unwrap()
    }

    #[test]
    fn test_refer_dispatches_to_export() {
        let protocol = LocalProtocol::new();
        let reference = protocol.refer("demo.Greeter", &url()).unwrap();
        assert!(!reference.is_available());

        let err = reference.invoke(&mut Invocation::new("hello", vec![])).unwrap_err();
        assert_eq!(err, RpcError::NoExporter("demo.Greeter:1.0".to_string()));

        let exporter = exported(&protocol);
        assert!(protocol.is_exported("demo.Greeter:1.0"));
        assert!(reference.is_available());
        let res = reference.invoke(&mut Invocation::new("hello", vec![])).unwrap();
        assert_eq!(res.value(), &json!("hi"));

        exporter.unexport();
        exporter.unexport();
        assert!(!protocol.is_exported("demo.Greeter:1.0"));
        assert!(!exporter.invoker().is_available());
    }

    #[test]
    fn test_replaced_export_survives_old_unexport() {
        let protocol = LocalProtocol::new();
        let first = exported(&protocol);
        let second = exported(&protocol);

        first.unexport();
        assert!(protocol.is_exported("demo.Greeter:1.0"));

        second.unexport();
        assert!(!protocol.is_exported("demo.Greeter:1.0"));
    }

    #[test]
    fn test_destroy() {
        let protocol = LocalProtocol::new();
        let exporter = exported(&protocol);
        let reference = protocol.refer("demo.Greeter", &url()).unwrap();

        protocol.destroy();

        assert!(!protocol.is_exported("demo.Greeter:1.0"));
        assert!(!exporter.invoker().is_available());
        let err = reference.invoke(&mut Invocation::new("hello", vec![])).unwrap_err();
        assert!(matches!(err, RpcError::Destroyed(_)));
    }

    #[test]
    fn test_dropped_references_are_forgotten() {
        let protocol = LocalProtocol::new();
        for _ in 0..100 {
            let reference = protocol.refer("demo.Greeter", &url()).unwrap();
            drop(reference);
        }
        assert_eq!(protocol.references.lock().len(), 1);

        let kept = protocol.refer("demo.Greeter", &url()).unwrap();
        kept.destroy();
        let live = protocol.refer("demo.Greeter", &url()).unwrap();
        assert_eq!(protocol.references.lock().len(), 1);

        protocol.destroy();
        assert!(protocol.references.lock().is_empty());
        assert!(matches!(
            live.invoke(&mut Invocation::new("hello", vec![])),
            Err(RpcError::Destroyed(_))
        ));
    }
}
