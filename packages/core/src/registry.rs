//! The central registry.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use depot_observe::{Reactive, Scope};
use depot_value::Value;

use crate::builder;
use crate::config::RegistryConfig;
use crate::definition::StoreDefinition;
use crate::error::{Error, Result};
use crate::plugin::Plugin;
use crate::store::Store;

thread_local! {
    static ACTIVE: RefCell<Option<Registry>> = const { RefCell::new(None) };
}

/// Make `registry` the thread's fallback for [`StoreDefinition::use_active`].
///
/// Returns the previously active registry. Pass `None` to clear it.
pub fn set_active_registry(registry: Option<Registry>) -> Option<Registry> {
    ACTIVE.with(|active| active.replace(registry))
}

pub fn active_registry() -> Option<Registry> {
    ACTIVE.with(|active| active.borrow().clone())
}

/// Something a registry can be handed to, e.g. an application context.
pub trait Host {
    fn provide(&mut self, registry: Registry);
}

/// Owner of every store built against it.
///
/// Holds the central state tree (one slice per store id), the store map,
/// the plugin list and a root scope that every store scope is a child of.
/// Dropping the last handle stops that root scope.
#[derive(Clone)]
pub struct Registry {
    inner: Rc<RegistryInner>,
}

#[derive(Clone)]
pub(crate) struct WeakRegistry {
    inner: Weak<RegistryInner>,
}

impl WeakRegistry {
    pub(crate) fn upgrade(&self) -> Option<Registry> {
        self.inner.upgrade().map(|inner| Registry { inner })
    }
}

struct RegistryInner {
    config: RegistryConfig,
    scope: Scope,
    state: RefCell<BTreeMap<String, Reactive>>,
    stores: RefCell<BTreeMap<String, Store>>,
    plugins: RefCell<Vec<Rc<dyn Plugin>>>,
}

impl Drop for RegistryInner {
    fn drop(&mut self) {
        self.scope.stop();
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            inner: Rc::new(RegistryInner {
                config,
                scope: Scope::detached(),
                state: RefCell::new(BTreeMap::new()),
                stores: RefCell::new(BTreeMap::new()),
                plugins: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> RegistryConfig {
        self.inner.config
    }

    /// Append a plugin. It applies to stores built from now on; stores that
    /// already exist are not revisited.
    pub fn use_plugin(&self, plugin: impl Plugin + 'static) -> &Self {
        tracing::debug!(plugin = plugin.name(), "plugin registered");
        self.inner.plugins.borrow_mut().push(Rc::new(plugin));
        self
    }

    pub fn plugin_count(&self) -> usize {
        self.inner.plugins.borrow().len()
    }

    pub(crate) fn plugins(&self) -> Vec<Rc<dyn Plugin>> {
        self.inner.plugins.borrow().clone()
    }

    /// Hand this registry to `host`.
    pub fn install(&self, host: &mut impl Host) {
        host.provide(self.clone());
    }

    /// Make this the thread's active registry.
    pub fn activate(&self) -> Option<Registry> {
        set_active_registry(Some(self.clone()))
    }

    pub fn scope(&self) -> &Scope {
        &self.inner.scope
    }

    /// The central state tree: every slice keyed by store id.
    pub fn state(&self) -> Value {
        let slices: Vec<(String, Reactive)> = self
            .inner
            .state
            .borrow()
            .iter()
            .map(|(id, slice)| (id.clone(), slice.clone()))
            .collect();
        Value::Map(
            slices
                .into_iter()
                .map(|(id, slice)| (id, slice.snapshot()))
                .collect(),
        )
    }

    pub fn slice(&self, id: &str) -> Option<Reactive> {
        self.inner.state.borrow().get(id).cloned()
    }

    pub fn has_store(&self, id: &str) -> bool {
        self.inner.stores.borrow().contains_key(id)
    }

    pub fn store(&self, id: &str) -> Option<Store> {
        self.inner.stores.borrow().get(id).cloned()
    }

    pub fn store_ids(&self) -> Vec<String> {
        self.inner.stores.borrow().keys().cloned().collect()
    }

    pub fn is_disposed(&self) -> bool {
        !self.inner.scope.is_active()
    }

    /// Dispose every store and stop the root scope. A disposed registry
    /// refuses to build new stores.
    pub fn dispose(&self) {
        if self.is_disposed() {
            return;
        }
        self.inner.scope.stop();
        let stores = std::mem::take(&mut *self.inner.stores.borrow_mut());
        for store in stores.values() {
            store.teardown();
        }
        self.inner.state.borrow_mut().clear();
        tracing::debug!(stores = stores.len(), "registry disposed");
    }

    pub fn ptr_eq(&self, other: &Registry) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn downgrade(&self) -> WeakRegistry {
        WeakRegistry {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// The cached store for `definition`, built on first use.
    pub(crate) fn resolve(&self, definition: &StoreDefinition) -> Result<Store> {
        if let Some(store) = self.store(definition.id()) {
            return Ok(store);
        }
        if self.is_disposed() {
            return Err(Error::RegistryDisposed);
        }
        builder::build(self, definition)
    }

    pub(crate) fn insert_slice(&self, id: &str, slice: Reactive) {
        self.inner.state.borrow_mut().insert(id.to_string(), slice);
    }

    pub(crate) fn remove_slice(&self, id: &str, slice: &Reactive) {
        let mut state = self.inner.state.borrow_mut();
        if state.get(id).is_some_and(|current| current.ptr_eq(slice)) {
            state.remove(id);
        }
    }

    pub(crate) fn insert_store(&self, store: Store) {
        self.inner
            .stores
            .borrow_mut()
            .insert(store.id().to_string(), store);
    }

    /// Drop `store` and its slice, unless the id has since been rebuilt.
    pub(crate) fn forget(&self, store: &Store) {
        let removed = {
            let mut stores = self.inner.stores.borrow_mut();
            match stores.get(store.id()) {
                Some(current) if current.ptr_eq(store) => stores.remove(store.id()),
                _ => None,
            }
        };
        if removed.is_some() {
            self.remove_slice(store.id(), store.slice());
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("stores", &self.store_ids())
            .field("plugins", &self.plugin_count())
            .field("config", &self.inner.config)
            .finish()
    }
}
