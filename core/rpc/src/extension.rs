// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

//! Extension catalog.
//!
//! An [`ExtensionLoader`] holds the providers registered for one capability
//! (for instance `filter`). Providers are registered explicitly at process
//! start, each with a factory that is called at most once; the produced
//! instance is shared afterwards.
//!
//! Providers registered with [`Activate`] metadata are picked up
//! automatically by [`ExtensionLoader::activate`] when their group matches
//! and the descriptor carries one of their trigger parameters. A descriptor
//! can further tune the selection through a list parameter, e.g.
//! `service-filter=audit,-trace`:
//!
//! - `name` appends the named provider after the automatic ones
//! - `-name` removes a provider
//! - `-default` disables every automatically activated provider
//! - `default` positions the automatic providers relative to named ones

use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use tracing::debug;
use weave_url::Url;

use crate::constants::{DEFAULT_KEY, REMOVE_VALUE_PREFIX};
use crate::errors::ExtensionError;

/// Activation metadata of an extension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Activate {
    groups: Vec<String>,
    keys: Vec<String>,
    order: i32,
}

impl Activate {
    pub fn new() -> Self {
        Activate::default()
    }

    /// Activate for the given group (`provider` or `consumer`). An extension
    /// with no group is only activated when no group is requested.
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.groups.push(group.into());
        self
    }

    /// Activate only when the descriptor has a non-empty value for `key`.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.keys.push(key.into());
        self
    }

    /// Lower orders run first. Equal orders keep registration order.
    pub fn order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn priority(&self) -> i32 {
        self.order
    }

    fn matches_group(&self, group: &str) -> bool {
        group.is_empty() || self.groups.iter().any(|g| g == group)
    }

    fn is_active(&self, url: &Url) -> bool {
        if self.keys.is_empty() {
            return true;
        }

        self.keys.iter().any(|key| {
            url.parameters().iter().any(|(k, v)| {
                !v.is_empty()
                    && (k == key
                        || k.strip_suffix(key.as_str())
                            .is_some_and(|prefix| prefix.ends_with('.')))
            })
        })
    }
}

type Factory<T> = Box<dyn Fn() -> Arc<T> + Send + Sync>;

struct Registration<T: ?Sized> {
    name: String,
    activate: Option<Activate>,
    factory: Factory<T>,
    instance: OnceCell<Arc<T>>,
}

impl<T: ?Sized> Registration<T> {
    fn instance(&self) -> Arc<T> {
        self.instance.get_or_init(|| (self.factory)()).clone()
    }
}

/// Resolves, for a descriptor and a role, the ordered list of extensions to
/// apply. Implementations must be deterministic: the same descriptor, key
/// and group against the same catalog always yield the same list.
pub trait ExtensionSelector<T: ?Sized>: Send + Sync {
    fn select(&self, url: &Url, key: &str, group: &str) -> Result<Vec<Arc<T>>, ExtensionError>;
}

/// Catalog of the providers of one capability.
pub struct ExtensionLoader<T: ?Sized> {
    capability: String,
    registrations: RwLock<Vec<Arc<Registration<T>>>>,
}

impl<T: ?Sized + Send + Sync + 'static> ExtensionLoader<T> {
    pub fn new(capability: impl Into<String>) -> Self {
        ExtensionLoader {
            capability: capability.into(),
            registrations: RwLock::new(Vec::new()),
        }
    }

    pub fn capability(&self) -> &str {
        &self.capability
    }

    /// Register a provider that is only used when requested by name.
    pub fn register<F>(&self, name: impl Into<String>, factory: F) -> Result<(), ExtensionError>
    where
        F: Fn() -> Arc<T> + Send + Sync + 'static,
    {
        self.insert(name.into(), None, Box::new(factory))
    }

    /// Register a provider that is activated automatically per `activate`.
    pub fn register_activate<F>(
        &self,
        name: impl Into<String>,
        activate: Activate,
        factory: F,
    ) -> Result<(), ExtensionError>
    where
        F: Fn() -> Arc<T> + Send + Sync + 'static,
    {
        self.insert(name.into(), Some(activate), Box::new(factory))
    }

    fn insert(
        &self,
        name: String,
        activate: Option<Activate>,
        factory: Factory<T>,
    ) -> Result<(), ExtensionError> {
        let mut registrations = self.registrations.write();
        if registrations.iter().any(|r| r.name == name) {
            return Err(ExtensionError::Duplicate {
                capability: self.capability.clone(),
                name,
            });
        }

        debug!(capability = %self.capability, %name, ?activate, "extension registered");
        registrations.push(Arc::new(Registration {
            name,
            activate,
            factory,
            instance: OnceCell::new(),
        }));
        Ok(())
    }

    pub fn has_extension(&self, name: &str) -> bool {
        self.registrations.read().iter().any(|r| r.name == name)
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> Vec<String> {
        self.registrations
            .read()
            .iter()
            .map(|r| r.name.clone())
            .collect()
    }

    /// Instances are created after the registrations lock is released, so a
    /// factory may use the loader it is registered in.
    pub fn get_extension(&self, name: &str) -> Result<Arc<T>, ExtensionError> {
        let registration = self.lookup(&self.registrations.read(), name)?;
        Ok(registration.instance())
    }

    fn lookup(
        &self,
        registrations: &[Arc<Registration<T>>],
        name: &str,
    ) -> Result<Arc<Registration<T>>, ExtensionError> {
        registrations
            .iter()
            .find(|r| r.name == name)
            .cloned()
            .ok_or_else(|| ExtensionError::Unknown {
                capability: self.capability.clone(),
                name: name.to_string(),
            })
    }

    /// Extensions active for `url` in `group`, honoring the list parameter
    /// `key` of the descriptor (see the module documentation).
    pub fn activate(&self, url: &Url, key: &str, group: &str) -> Result<Vec<Arc<T>>, ExtensionError> {
        let names = if key.is_empty() {
            Vec::new()
        } else {
            url.parameter_list(key)
        };
        let disable_defaults = names.iter().any(|n| is_removal_of(n, DEFAULT_KEY));

        let registrations = self.registrations.read();

        let mut selected = Vec::new();
        if !disable_defaults {
            let mut candidates: Vec<(&Arc<Registration<T>>, i32)> = registrations
                .iter()
                .filter_map(|r| r.activate.as_ref().map(|a| (r, a)))
                .filter(|(r, a)| {
                    a.matches_group(group)
                        && !names.iter().any(|n| *n == r.name.as_str())
                        && !is_removed(&names, &r.name)
                        && a.is_active(url)
                })
                .map(|(r, a)| (r, a.priority()))
                .collect();
            // stable: equal orders keep registration order
            candidates.sort_by_key(|(_, order)| *order);
            selected = candidates.into_iter().map(|(r, _)| r.clone()).collect();
        }

        let mut named = Vec::new();
        for name in &names {
            if name.starts_with(REMOVE_VALUE_PREFIX) || is_removed(&names, name) {
                continue;
            }
            if *name == DEFAULT_KEY {
                let automatic = std::mem::take(&mut selected);
                selected.append(&mut named);
                selected.extend(automatic);
                continue;
            }
            named.push(self.lookup(&registrations, name)?);
        }
        selected.extend(named);
        drop(registrations);

        let activated: Vec<Arc<T>> = selected.iter().map(|r| r.instance()).collect();

        debug!(
            capability = %self.capability,
            key,
            group,
            count = activated.len(),
            "extensions activated"
        );
        Ok(activated)
    }
}

impl<T: ?Sized + Send + Sync + 'static> ExtensionSelector<T> for ExtensionLoader<T> {
    fn select(&self, url: &Url, key: &str, group: &str) -> Result<Vec<Arc<T>>, ExtensionError> {
        self.activate(url, key, group)
    }
}

impl<T: ?Sized> fmt::Debug for ExtensionLoader<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self
            .registrations
            .read()
            .iter()
            .map(|r| r.name.clone())
            .collect();
        f.debug_struct("ExtensionLoader")
            .field("capability", &self.capability)
            .field("extensions", &names)
            .finish()
    }
}

fn is_removal_of(entry: &str, name: &str) -> bool {
    entry.strip_prefix(REMOVE_VALUE_PREFIX) == Some(name)
}

fn is_removed(names: &[&str], name: &str) -> bool {
    names.iter().any(|n| is_removal_of(n, name))
}
