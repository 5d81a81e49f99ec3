//! Store definitions and accessors.

use std::rc::Rc;

use depot_value::Value;

use crate::error::{Error, Result};
use crate::members::Members;
use crate::options::Options;
use crate::registry::{active_registry, Registry};
use crate::store::Store;

/// Produces a fresh initial state slice.
pub type StateFactory = Rc<dyn Fn() -> Value>;

/// Produces a store's member bundle. Runs inside the store's scope.
pub(crate) type SetupFn = Rc<dyn Fn(&Store) -> Members>;

/// A normalized store definition.
///
/// Every `define_*` form ends up here. The definition is an accessor: the
/// first [`use_store`](StoreDefinition::use_store) against a registry builds
/// the store, later calls return the same instance.
#[derive(Clone)]
pub struct StoreDefinition {
    id: String,
    setup: SetupFn,
    state_factory: Option<StateFactory>,
}

/// Define a store from declarative [`Options`].
///
/// An id set on the options is overridden by `id`.
pub fn define_store(id: impl Into<String>, options: Options) -> StoreDefinition {
    let (_, state_factory, setup) = options.into_parts();
    StoreDefinition {
        id: id.into(),
        setup,
        state_factory: Some(state_factory),
    }
}

/// Define a store from [`Options`] that carry their own id.
pub fn define_store_with(options: Options) -> Result<StoreDefinition> {
    let (id, state_factory, setup) = options.into_parts();
    let id = id.ok_or(Error::MissingId)?;
    Ok(StoreDefinition {
        id,
        setup,
        state_factory: Some(state_factory),
    })
}

/// Define a store from a setup function.
///
/// State cells the bundle returns become the store's state slice.
///
/// ```rust
/// use depot_core::{define_setup_store, Members, Registry};
///
/// let use_settings = define_setup_store("settings", || Members::new().state("theme", "dark"));
/// let registry = Registry::new();
/// let settings = use_settings.use_store(&registry).unwrap();
/// assert_eq!(settings.get("theme").unwrap().as_str(), Some("dark"));
/// assert!(settings.ptr_eq(&use_settings.use_store(&registry).unwrap()));
/// ```
pub fn define_setup_store<F>(id: impl Into<String>, setup: F) -> StoreDefinition
where
    F: Fn() -> Members + 'static,
{
    StoreDefinition {
        id: id.into(),
        setup: Rc::new(move |_: &Store| setup()),
        state_factory: None,
    }
}

impl StoreDefinition {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_declarative(&self) -> bool {
        self.state_factory.is_some()
    }

    /// The store for this definition in `registry`, built on first use.
    pub fn use_store(&self, registry: &Registry) -> Result<Store> {
        registry.resolve(self)
    }

    /// Like [`use_store`](StoreDefinition::use_store), against the thread's
    /// active registry.
    pub fn use_active(&self) -> Result<Store> {
        let registry = active_registry().ok_or(Error::NoActiveRegistry)?;
        self.use_store(&registry)
    }

    pub(crate) fn setup(&self) -> SetupFn {
        self.setup.clone()
    }

    pub(crate) fn state_factory(&self) -> Option<StateFactory> {
        self.state_factory.clone()
    }
}

impl std::fmt::Debug for StoreDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreDefinition")
            .field("id", &self.id)
            .field("declarative", &self.is_declarative())
            .finish()
    }
}
