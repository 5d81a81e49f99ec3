//! Keyed reactive objects.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use depot_value::Value;

use crate::cell::Cell;
use crate::runtime;
use crate::signal::Signal;

/// A map of individually tracked cells.
///
/// Each top-level field is its own [`Cell`], so a reader of one field does
/// not depend on the others. Adding a field emits the shape signal, which
/// [`snapshot`](Reactive::snapshot) tracks, so deep watchers pick up fields
/// linked after they started.
#[derive(Clone, Default)]
pub struct Reactive {
    inner: Rc<ReactiveInner>,
}

#[derive(Default)]
struct ReactiveInner {
    fields: RefCell<BTreeMap<String, Cell>>,
    shape: Signal,
}

impl Reactive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a map value, one cell per top-level entry.
    ///
    /// A non-map value yields an empty object.
    pub fn from_value(value: Value) -> Self {
        let reactive = Self::new();
        if let Value::Map(map) = value {
            let mut fields = reactive.inner.fields.borrow_mut();
            for (key, value) in map {
                fields.insert(key, Cell::new(value));
            }
        }
        reactive
    }

    /// Adopt `cell` as the field `key`.
    ///
    /// The object and the caller share the cell afterwards: writes through
    /// either are seen by both.
    pub fn link(&self, key: impl Into<String>, cell: Cell) {
        let key = key.into();
        let replaced = self
            .inner
            .fields
            .borrow_mut()
            .insert(key, cell.clone());
        match replaced {
            Some(old) if old.ptr_eq(&cell) => {}
            _ => self.inner.shape.emit(),
        }
    }

    /// Write a field, creating it when missing. Returns whether anything
    /// changed.
    pub fn insert(&self, key: &str, value: Value) -> bool {
        let existing = self.inner.fields.borrow().get(key).cloned();
        match existing {
            Some(cell) => cell.set(value),
            None => {
                self.link(key, Cell::new(value));
                true
            }
        }
    }

    /// The cell behind `key`, tracking the object's shape.
    pub fn field(&self, key: &str) -> Option<Cell> {
        self.inner.shape.track();
        self.inner.fields.borrow().get(key).cloned()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.fields.borrow().contains_key(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.inner.fields.borrow().keys().cloned().collect()
    }

    /// Every field with its cell, in key order. Untracked.
    pub fn entries(&self) -> Vec<(String, Cell)> {
        self.inner
            .fields
            .borrow()
            .iter()
            .map(|(k, c)| (k.clone(), c.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.fields.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.fields.borrow().is_empty()
    }

    /// The whole object as a map value, tracking its shape and every field.
    pub fn snapshot(&self) -> Value {
        self.inner.shape.track();
        Value::Map(
            self.entries()
                .into_iter()
                .map(|(key, cell)| (key, cell.get()))
                .collect(),
        )
    }

    /// The whole object as a map value, untracked.
    pub fn peek(&self) -> Value {
        runtime::untracked(|| self.snapshot())
    }

    pub fn shape(&self) -> &Signal {
        &self.inner.shape
    }

    pub fn ptr_eq(&self, other: &Reactive) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl std::fmt::Debug for Reactive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Reactive").field(&self.peek()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::collect;
    use serde_json::json;

    #[test]
    fn from_value_splits_fields() {
        let obj = Reactive::from_value(Value::from(json!({"count": 0, "name": "x"})));
        assert_eq!(obj.keys(), vec!["count".to_string(), "name".to_string()]);
        assert_eq!(obj.peek(), Value::from(json!({"count": 0, "name": "x"})));
    }

    #[test]
    fn linked_cells_are_shared() {
        let obj = Reactive::new();
        let count = Cell::new(1);
        obj.link("count", count.clone());

        count.set(5);
        assert_eq!(obj.peek().field("count"), Some(&Value::Integer(5)));
        obj.field("count").unwrap().set(6);
        assert_eq!(count.peek(), Value::Integer(6));
    }

    #[test]
    fn snapshot_tracks_shape_and_fields() {
        let obj = Reactive::from_value(Value::from(json!({"a": 1, "b": 2})));
        let (_, deps) = collect(|| obj.snapshot());
        assert_eq!(deps.len(), 3);
    }

    #[test]
    fn insert_creates_or_updates() {
        let obj = Reactive::new();
        assert!(obj.insert("a", Value::from(1)));
        assert!(!obj.insert("a", Value::from(1)));
        assert!(obj.insert("a", Value::from(2)));
        assert_eq!(obj.len(), 1);
    }

    #[test]
    fn relinking_same_cell_keeps_shape_quiet() {
        let obj = Reactive::new();
        let cell = Cell::new(0);
        obj.link("a", cell.clone());
        let (_, deps) = collect(|| obj.snapshot());
        assert_eq!(deps.len(), 2);

        // Same cell again: the shape signal must not fire.
        let fired = std::rc::Rc::new(std::cell::Cell::new(false));
        let flag = fired.clone();
        let source = obj.clone();
        let _handle = crate::watch(
            move || source.snapshot(),
            move |_, _| flag.set(true),
            crate::WatchOptions::default(),
        );
        obj.link("a", cell);
        assert!(!fired.get());
    }
}
