//! Depot: named reactive stores.
//!
//! This crate re-exports the layered stack:
//!
//! - [`value`]: the `Value` state tree, paths and the structural merge
//! - [`observe`]: cells, computed values, watchers, batches and scopes
//! - the registry and store API from `depot-core`, at the crate root
//! - [`persist`]: the snapshot persistence plugin
//!
//! # Example
//!
//! ```rust
//! use depot::{define_store, Options, Outcome, Registry, Value};
//! use serde_json::json;
//!
//! let use_counter = define_store(
//!     "counter",
//!     Options::new()
//!         .state(|| json!({"count": 0}))
//!         .action("increment", |s, _| {
//!             s.update("count", |v| *v = Value::from(v.as_i64().unwrap_or(0) + 1))?;
//!             Ok(Outcome::ready(Value::Null))
//!         }),
//! );
//!
//! let registry = Registry::new();
//! let counter = use_counter.use_store(&registry).unwrap();
//! counter.call("increment", &[]).unwrap();
//! assert_eq!(counter.get("count"), Some(Value::Integer(1)));
//! ```

pub use depot_core::*;
pub use depot_value::{path, Path, Value};

pub use depot_observe as observe;
pub use depot_persist as persist;
pub use depot_value as value;
