//! Key-value byte stores.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use bytes::Bytes;

use crate::error::Result;

/// A flat store of opaque bytes under string keys.
///
/// Nothing here interprets the bytes; encoding is the caller's business.
pub trait KvStore {
    /// `Ok(None)` when the key has never been written.
    fn get(&mut self, key: &str) -> Result<Option<Bytes>>;

    fn set(&mut self, key: &str, data: Bytes) -> Result<()>;
}

impl<T: KvStore + ?Sized> KvStore for &mut T {
    fn get(&mut self, key: &str) -> Result<Option<Bytes>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, data: Bytes) -> Result<()> {
        (**self).set(key, data)
    }
}

impl<T: KvStore + ?Sized> KvStore for Box<T> {
    fn get(&mut self, key: &str) -> Result<Option<Bytes>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, data: Bytes) -> Result<()> {
        (**self).set(key, data)
    }
}

/// An in-memory store. Clones share their entries.
#[derive(Clone, Default, Debug)]
pub struct MemoryKv {
    entries: Rc<RefCell<BTreeMap<String, Bytes>>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries.borrow().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KvStore for MemoryKv {
    fn get(&mut self, key: &str) -> Result<Option<Bytes>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&mut self, key: &str, data: Bytes) -> Result<()> {
        self.entries.borrow_mut().insert(key.to_string(), data);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_is_none() {
        let mut kv = MemoryKv::new();
        assert_eq!(kv.get("nope").unwrap(), None);
    }

    #[test]
    fn clones_share_entries() {
        let mut writer = MemoryKv::new();
        let mut reader = writer.clone();
        writer.set("k", Bytes::from_static(b"v")).unwrap();
        assert_eq!(reader.get("k").unwrap(), Some(Bytes::from_static(b"v")));
        assert_eq!(reader.keys(), vec!["k".to_string()]);
    }

    #[test]
    fn boxed_store_delegates() {
        let shared = MemoryKv::new();
        let mut boxed: Box<dyn KvStore> = Box::new(shared.clone());
        boxed.set("k", Bytes::from_static(b"1")).unwrap();
        assert_eq!(shared.len(), 1);
    }
}
