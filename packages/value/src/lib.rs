//! Depot state trees.
//!
//! Every store slice in depot is a tree of [`Value`]s:
//! - `Value`: dynamically-typed tree (the state itself)
//! - `Path`: validated key path used to address nested state
//! - [`merge`]/[`assign`]: the structural patch operations applied to slices
//!
//! # Example
//!
//! ```rust
//! use depot_value::{merge, path, Value};
//! use serde_json::json;
//!
//! let mut state = Value::from(json!({"a": {"b": 0, "c": 1}}));
//! merge(&mut state, &Value::from(json!({"a": {"b": 5}})));
//!
//! assert_eq!(state.get(&path!("a/b")), Some(&Value::Integer(5)));
//! assert_eq!(state.get(&path!("a/c")), Some(&Value::Integer(1)));
//! ```

mod convert;
mod error;
mod merge;
mod path;
mod value;

pub use convert::{from_value, json_to_value, to_value, value_to_json};
pub use error::{Error, Result};
pub use merge::{assign, merge};
pub use path::{Path, PathError};
pub use value::Value;
