//! Snapshot persistence for depot stores.
//!
//! - [`KvStore`]: flat byte store under string keys
//! - [`MemoryKv`] / [`DiskKv`]: in-memory and one-file-per-key stores
//! - [`PersistPlugin`]: restores each store from its snapshot when it is
//!   built and saves a new snapshot on every change

mod disk;
mod error;
mod kv;
mod plugin;

pub use bytes::Bytes;
pub use disk::DiskKv;
pub use error::{PersistError, Result};
pub use kv::{KvStore, MemoryKv};
pub use plugin::PersistPlugin;
