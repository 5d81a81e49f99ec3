//! The persistence plugin.

use std::cell::RefCell;
use std::rc::Rc;

use bytes::Bytes;
use depot_core::{Members, Plugin, PluginContext, SubscribeOptions};
use depot_value::{json_to_value, value_to_json, Value};

use crate::error::Result;
use crate::kv::KvStore;

/// Saves every store's state to a [`KvStore`] and restores it on build.
///
/// When a store is built the plugin reads the snapshot saved under the
/// store's key, if any, and assigns it onto the state. It then subscribes
/// to the store and writes a fresh snapshot after every change. Snapshots
/// are JSON. A snapshot that cannot be read or written is logged and
/// skipped; it never fails the store.
///
/// ```rust
/// use depot_core::{define_store, Options, Registry};
/// use depot_persist::{MemoryKv, PersistPlugin};
/// use serde_json::json;
///
/// let kv = MemoryKv::new();
/// let registry = Registry::new();
/// registry.use_plugin(PersistPlugin::new(kv.clone()));
///
/// let counter = define_store("counter", Options::new().state(|| json!({"count": 0})))
///     .use_store(&registry)
///     .unwrap();
/// counter.patch(json!({"count": 3})).unwrap();
/// assert_eq!(kv.keys(), vec!["counter".to_string()]);
/// ```
pub struct PersistPlugin<K> {
    kv: Rc<RefCell<K>>,
    prefix: String,
}

impl<K: KvStore + 'static> PersistPlugin<K> {
    pub fn new(kv: K) -> Self {
        Self {
            kv: Rc::new(RefCell::new(kv)),
            prefix: String::new(),
        }
    }

    /// Prepend `prefix` to every key.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// The key the snapshot of store `id` lives under.
    pub fn key_for(&self, id: &str) -> String {
        format!("{}{}", self.prefix, id)
    }

    /// Read the saved snapshot of store `id`.
    pub fn load(&self, id: &str) -> Result<Option<Value>> {
        load(&self.kv, &self.key_for(id))
    }

    /// Write a snapshot of store `id`.
    pub fn save(&self, id: &str, state: &Value) -> Result<()> {
        save(&self.kv, &self.key_for(id), state)
    }
}

fn load<K: KvStore>(kv: &RefCell<K>, key: &str) -> Result<Option<Value>> {
    let Some(data) = kv.borrow_mut().get(key)? else {
        return Ok(None);
    };
    let json: serde_json::Value = serde_json::from_slice(&data)?;
    Ok(Some(json_to_value(json)))
}

fn save<K: KvStore>(kv: &RefCell<K>, key: &str, state: &Value) -> Result<()> {
    let data = serde_json::to_vec(&value_to_json(state.clone()))?;
    kv.borrow_mut().set(key, Bytes::from(data))
}

impl<K: KvStore + 'static> Plugin for PersistPlugin<K> {
    fn name(&self) -> &str {
        "persist"
    }

    fn apply(&self, context: &PluginContext<'_>) -> depot_core::Result<Option<Members>> {
        let store = context.store;
        let key = self.key_for(store.id());

        match load(&self.kv, &key) {
            Ok(Some(snapshot)) => {
                tracing::debug!(store = store.id(), key = %key, "restoring snapshot");
                store.set_state(snapshot);
            }
            Ok(None) => {}
            Err(error) => {
                tracing::warn!(store = store.id(), key = %key, %error, "could not load snapshot");
            }
        }

        let kv = self.kv.clone();
        store.subscribe(
            move |change| {
                if let Err(error) = save(&kv, &key, change.state) {
                    tracing::warn!(store = change.store_id, key = %key, %error, "could not save snapshot");
                }
            },
            SubscribeOptions::default(),
        );
        Ok(None)
    }
}

impl<K> std::fmt::Debug for PersistPlugin<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistPlugin")
            .field("prefix", &self.prefix)
            .finish()
    }
}
