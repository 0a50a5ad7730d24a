// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};
use weave_url::Url;

use crate::registry::{Registry, RegistryCreator};

/// Creator that picks the backend from the descriptor scheme.
#[derive(Default)]
pub struct RegistryCreators {
    creators: RwLock<HashMap<String, Arc<dyn RegistryCreator>>>,
}

impl RegistryCreators {
    pub fn new() -> Self {
        RegistryCreators::default()
    }

    /// Register `creator` for `scheme`, returning the creator it replaces.
    pub fn insert(
        &self,
        scheme: impl Into<String>,
        creator: Arc<dyn RegistryCreator>,
    ) -> Option<Arc<dyn RegistryCreator>> {
        let scheme = scheme.into();
        debug!(%scheme, "registry creator registered");
        self.creators.write().insert(scheme, creator)
    }

    pub fn schemes(&self) -> Vec<String> {
        let mut schemes: Vec<_> = self.creators.read().keys().cloned().collect();
        schemes.sort();
        schemes
    }
}

impl RegistryCreator for RegistryCreators {
    fn create_registry(&self, url: &Url) -> Option<Arc<dyn Registry>> {
        let creator = self.creators.read().get(url.protocol()).cloned();
        match creator {
            Some(creator) => creator.create_registry(url),
            None => {
                warn!(scheme = url.protocol(), "no registry creator for scheme");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MEMORY_PROTOCOL, MemoryRegistryCreator};

    #[test]
    fn test_dispatch_by_scheme() {
        let creators = RegistryCreators::new();
        creators.insert(MEMORY_PROTOCOL, Arc::new(MemoryRegistryCreator));
        assert_eq!(creators.schemes(), vec!["memory".to_string()]);

        let url: Url = "memory://127.0.0.1:2181/weave.registry.RegistryService".parse().unwrap();
        let registry = creators.create_registry(&url).unwrap();
        assert_eq!(registry.url(), &url);

        let url: Url = "zookeeper://127.0.0.1:2181/weave.registry.RegistryService".parse().unwrap();
        assert!(creators.create_registry(&url).is_none());
    }

    #[test]
    fn test_closure_creator() {
        let creators = RegistryCreators::new();
        let previous = creators.insert("none", Arc::new(|_: &Url| -> Option<Arc<dyn Registry>> { None }));
        assert!(previous.is_none());

        let url: Url = "none://127.0.0.1".parse().unwrap();
        assert!(creators.create_registry(&url).is_none());
    }
}
