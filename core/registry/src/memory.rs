// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use tracing::{debug, info};
use weave_url::Url;

use crate::errors::RegistryError;
use crate::registry::{Registry, RegistryCreator};

pub const MEMORY_PROTOCOL: &str = "memory";

/// Registry backend living in the process memory.
pub struct MemoryRegistry {
    url: Url,
    registered: RwLock<Vec<Url>>,
    destroyed: AtomicBool,
}

impl MemoryRegistry {
    pub fn new(url: Url) -> Self {
        MemoryRegistry {
            url,
            registered: RwLock::new(Vec::new()),
            destroyed: AtomicBool::new(false),
        }
    }

    pub fn registered(&self) -> Vec<Url> {
        self.registered.read().clone()
    }

    fn check_alive(&self) -> Result<(), RegistryError> {
        if self.destroyed.load(Ordering::Acquire) {
            return Err(RegistryError::Destroyed(self.url.to_identity_string()));
        }
        Ok(())
    }
}

impl Registry for MemoryRegistry {
    fn url(&self) -> &Url {
        &self.url
    }

    fn is_available(&self) -> bool {
        !self.destroyed.load(Ordering::Acquire)
    }

    fn register(&self, url: &Url) -> Result<(), RegistryError> {
        self.check_alive()?;

        let mut registered = self.registered.write();
        if !registered.contains(url) {
            debug!(url = %url.to_identity_string(), "url registered");
            registered.push(url.clone());
        }
        Ok(())
    }

    fn unregister(&self, url: &Url) -> Result<(), RegistryError> {
        self.check_alive()?;

        self.registered.write().retain(|u| u != url);
        debug!(url = %url.to_identity_string(), "url unregistered");
        Ok(())
    }

    fn lookup(&self, query: &Url) -> Result<Vec<Url>, RegistryError> {
        self.check_alive()?;

        let key = query.service_key();
        Ok(self
            .registered
            .read()
            .iter()
            .filter(|u| u.service_key() == key)
            .cloned()
            .collect())
    }

    fn destroy(&self) -> Result<(), RegistryError> {
        if self.destroyed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        let dropped = std::mem::take(&mut *self.registered.write());
        info!(
            url = %self.url.to_identity_string(),
            unregistered = dropped.len(),
            "memory registry destroyed"
        );
        Ok(())
    }
}

pub struct MemoryRegistryCreator;

impl RegistryCreator for MemoryRegistryCreator {
    fn create_registry(&self, url: &Url) -> Option<Arc<dyn Registry>> {
        Some(Arc::new(MemoryRegistry::new(url.clone())))
    }
}
