// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

pub mod cache;
pub mod creators;
pub mod errors;
pub mod memory;
pub mod registry;

pub use cache::RegistryCache;
pub use creators::RegistryCreators;
pub use errors::RegistryError;
pub use memory::{MEMORY_PROTOCOL, MemoryRegistry, MemoryRegistryCreator};
pub use registry::{REGISTRY_SERVICE, Registry, RegistryCreator, RegistryFactory};
