//! Depot store registry.
//!
//! A [`Registry`] owns named stores. Each store bundles reactive state,
//! derived values and actions, and is built lazily the first time its
//! [`StoreDefinition`] is used against a registry:
//!
//! - [`define_store`] / [`define_store_with`]: declarative [`Options`]
//! - [`define_setup_store`]: a setup function returning [`Members`]
//! - [`Store`]: patching, state and action subscriptions, disposal
//! - [`Plugin`]: construction-time extension of every store
//! - [`store_to_refs`]: pull reactive members out of a store
//!
//! # Example
//!
//! ```rust
//! use depot_core::{define_setup_store, Members, Outcome, Registry, SubscribeOptions};
//! use depot_observe::{Cell, Value};
//! use std::rc::Rc;
//!
//! let use_todos = define_setup_store("todos", || {
//!     let items = Cell::new(Value::Array(vec![]));
//!     let list = items.clone();
//!     Members::new()
//!         .cell("items", items)
//!         .action("add", move |_, args| {
//!             list.update(|v| {
//!                 if let Value::Array(items) = v {
//!                     items.extend(args.iter().cloned());
//!                 }
//!             });
//!             Ok(Outcome::ready(Value::Null))
//!         })
//! });
//!
//! let registry = Registry::new();
//! let todos = use_todos.use_store(&registry).unwrap();
//!
//! let changes = Rc::new(std::cell::Cell::new(0));
//! let seen = changes.clone();
//! todos.subscribe(move |_| seen.set(seen.get() + 1), SubscribeOptions::default());
//!
//! todos.call("add", &[Value::from("write docs")]).unwrap();
//! assert_eq!(changes.get(), 1);
//! assert_eq!(registry.state().field("todos").and_then(|s| s.field("items")),
//!            Some(&Value::Array(vec![Value::from("write docs")])));
//! ```

mod action;
mod builder;
mod config;
mod definition;
mod error;
mod members;
mod options;
mod plugin;
mod refs;
mod registry;
mod store;
mod subscription;

pub use action::{
    ActionContext, ActionFn, ActionFuture, ActionResult, ActionReturn, ActionSubscriber, Outcome,
};
pub use config::{PendingAfterPolicy, RegistryConfig, SyncErrorPolicy};
pub use definition::{define_setup_store, define_store, define_store_with, StateFactory, StoreDefinition};
pub use error::{ActionError, Error, Result};
pub use members::{Member, Members};
pub use options::{GetterFn, Options};
pub use plugin::{plugin_fn, Plugin, PluginContext};
pub use refs::{store_to_refs, StoreRef};
pub use registry::{active_registry, set_active_registry, Host, Registry};
pub use store::{StateChange, Store, SubscribeOptions, WeakStore};
pub use subscription::{Subscriptions, Unsubscribe};
