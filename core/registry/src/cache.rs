// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, error, info};
use weave_url::Url;
use weave_url::constants::{EXPORT_KEY, INTERFACE_KEY, REFER_KEY};

use crate::errors::RegistryError;
use crate::registry::{REGISTRY_SERVICE, Registry, RegistryCreator, RegistryFactory};

/// Normalize a descriptor for registry lookup: the path and the `interface`
/// parameter become the registry service type and the `export`/`refer`
/// parameters are dropped.
pub fn normalize(url: &Url) -> Url {
    url.set_path(REGISTRY_SERVICE)
        .add_parameter(INTERFACE_KEY, REGISTRY_SERVICE)
        .remove_parameters(&[EXPORT_KEY, REFER_KEY])
}

/// Key under which the registry for `url` is cached.
pub fn cache_key(url: &Url) -> String {
    normalize(url).to_service_string()
}

/// Keeps one registry per normalized descriptor.
///
/// Creation and teardown are serialized by a single lock, so at most one
/// registry is ever created for a key. Reading the set of live registries
/// does not take that lock.
pub struct RegistryCache {
    creator: Arc<dyn RegistryCreator>,
    lock: Mutex<()>,
    registries: RwLock<HashMap<String, Arc<dyn Registry>>>,
}

impl RegistryCache {
    pub fn new(creator: Arc<dyn RegistryCreator>) -> Self {
        RegistryCache {
            creator,
            lock: Mutex::new(()),
            registries: RwLock::new(HashMap::new()),
        }
    }

    /// Snapshot of the cached registries.
    pub fn get_registries(&self) -> Vec<Arc<dyn Registry>> {
        self.registries.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.registries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.registries.read().is_empty()
    }

    /// Destroy every cached registry and empty the cache.
    ///
    /// A registry failing to destroy is logged and does not prevent the
    /// others from being destroyed.
    pub fn destroy_all(&self) {
        let _guard = self.lock.lock();

        let registries: Vec<_> = self.registries.read().values().cloned().collect();
        info!(
            registries = ?registries
                .iter()
                .map(|r| r.url().to_identity_string())
                .collect::<Vec<_>>(),
            "closing all registries"
        );

        for registry in registries {
            if let Err(e) = registry.destroy() {
                error!(url = %registry.url().to_identity_string(), error = %e, "failed to destroy registry");
            }
        }

        self.registries.write().clear();
    }
}

impl RegistryFactory for RegistryCache {
    fn get_registry(&self, url: &Url) -> Result<Arc<dyn Registry>, RegistryError> {
        let url = normalize(url);
        let key = url.to_service_string();

        let _guard = self.lock.lock();

        if let Some(registry) = self.registries.read().get(&key) {
            debug!(%key, "registry reused");
            return Ok(registry.clone());
        }

        let registry = match self.creator.create_registry(&url) {
            Some(registry) => registry,
            None => {
                error!(%key, "registry could not be created");
                return Err(RegistryError::CreationFailed(key));
            }
        };

        info!(%key, "registry created");
        self.registries.write().insert(key, registry.clone());

        Ok(registry)
    }
}
