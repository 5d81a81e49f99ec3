//! Mutable reactive cells.

use std::cell::RefCell;
use std::rc::Rc;

use depot_value::Value;

use crate::signal::Signal;

/// A mutable reactive cell.
///
/// Cloning a `Cell` clones the handle: both clones read and write the same
/// value. Writes emit only when the stored value actually changes, and a
/// change anywhere inside a nested map or array counts.
#[derive(Clone)]
pub struct Cell {
    inner: Rc<CellInner>,
}

struct CellInner {
    value: RefCell<Value>,
    signal: Signal,
}

impl Cell {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            inner: Rc::new(CellInner {
                value: RefCell::new(value.into()),
                signal: Signal::new(),
            }),
        }
    }

    /// Read the value, tracking the cell as a dependency.
    pub fn get(&self) -> Value {
        self.inner.signal.track();
        self.inner.value.borrow().clone()
    }

    /// Read the value without tracking.
    pub fn peek(&self) -> Value {
        self.inner.value.borrow().clone()
    }

    /// Borrow the value for reading, tracking the cell as a dependency.
    pub fn with<R>(&self, f: impl FnOnce(&Value) -> R) -> R {
        self.inner.signal.track();
        f(&self.inner.value.borrow())
    }

    /// Replace the value. Returns whether it changed.
    pub fn set(&self, value: impl Into<Value>) -> bool {
        let value = value.into();
        let changed = {
            let mut slot = self.inner.value.borrow_mut();
            if *slot == value {
                false
            } else {
                *slot = value;
                true
            }
        };
        if changed {
            self.inner.signal.emit();
        }
        changed
    }

    /// Mutate the value in place. Returns whether it changed.
    ///
    /// `f` must not read this cell.
    pub fn update(&self, f: impl FnOnce(&mut Value)) -> bool {
        self.update_if(|value| {
            let before = value.clone();
            f(value);
            *value != before
        })
    }

    /// Mutate the value in place; `f` reports whether it changed anything.
    ///
    /// Used when the mutation already knows (e.g. a merge), sparing the
    /// before/after comparison of [`update`](Cell::update).
    pub fn update_if(&self, f: impl FnOnce(&mut Value) -> bool) -> bool {
        let changed = f(&mut self.inner.value.borrow_mut());
        if changed {
            self.inner.signal.emit();
        }
        changed
    }

    pub fn signal(&self) -> &Signal {
        &self.inner.signal
    }

    pub fn ptr_eq(&self, other: &Cell) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl std::fmt::Debug for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Cell").field(&*self.inner.value.borrow()).finish()
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::new(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::collect;
    use depot_value::path;
    use serde_json::json;

    #[test]
    fn clones_share_the_value() {
        let a = Cell::new(1);
        let b = a.clone();
        b.set(2);
        assert_eq!(a.get(), Value::Integer(2));
        assert!(a.ptr_eq(&b));
    }

    #[test]
    fn set_reports_change() {
        let cell = Cell::new("x");
        assert!(!cell.set("x"));
        assert!(cell.set("y"));
    }

    #[test]
    fn nested_update() {
        let cell = Cell::new(Value::from(json!({"a": {"b": 1}})));
        assert!(cell.update(|v| {
            v.set(&path!("a/b"), Value::from(2)).unwrap();
        }));
        assert!(!cell.update(|_| {}));
        assert_eq!(cell.peek().get(&path!("a/b")), Some(&Value::Integer(2)));
    }

    #[test]
    fn get_tracks_but_peek_does_not() {
        let cell = Cell::new(0);
        let (_, deps) = collect(|| cell.get());
        assert_eq!(deps.len(), 1);
        let (_, deps) = collect(|| cell.peek());
        assert!(deps.is_empty());
    }
}
