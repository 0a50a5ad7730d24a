// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use weave_url::Url;

use crate::errors::RegistryError;

/// Service type every registry descriptor is normalized to before caching.
pub const REGISTRY_SERVICE: &str = "weave.registry.RegistryService";

/// Connection to a coordination backend.
pub trait Registry: Send + Sync {
    /// Normalized descriptor this registry was created for.
    fn url(&self) -> &Url;

    fn is_available(&self) -> bool;

    fn register(&self, url: &Url) -> Result<(), RegistryError>;

    fn unregister(&self, url: &Url) -> Result<(), RegistryError>;

    /// Registered descriptors whose service key matches the one of `query`.
    fn lookup(&self, query: &Url) -> Result<Vec<Url>, RegistryError>;

    /// Release the connection. Calling it again is harmless.
    fn destroy(&self) -> Result<(), RegistryError>;
}

/// Hands out the shared registry for a descriptor.
pub trait RegistryFactory: Send + Sync {
    fn get_registry(&self, url: &Url) -> Result<Arc<dyn Registry>, RegistryError>;
}

/// Backend specific creation hook. Receives the normalized descriptor and
/// returns `None` when no registry can be created for it.
pub trait RegistryCreator: Send + Sync {
    fn create_registry(&self, url: &Url) -> Option<Arc<dyn Registry>>;
}

impl<F> RegistryCreator for F
where
    F: Fn(&Url) -> Option<Arc<dyn Registry>> + Send + Sync,
{
    fn create_registry(&self, url: &Url) -> Option<Arc<dyn Registry>> {
        self(url)
    }
}
