//! Ordered callback lists.

use std::cell::{Cell as StdCell, RefCell};
use std::rc::{Rc, Weak};

/// An ordered list of callbacks.
///
/// Callbacks run in registration order. Triggering iterates a snapshot, so a
/// callback added or removed while a trigger is in flight only affects later
/// triggers. Clones share the same list.
pub struct Subscriptions<F: ?Sized> {
    inner: Rc<ListInner<F>>,
}

struct ListInner<F: ?Sized> {
    entries: RefCell<Vec<(u64, Rc<F>)>>,
    next_id: StdCell<u64>,
}

trait Detach {
    fn detach(&self, id: u64) -> bool;
}

impl<F: ?Sized> Detach for ListInner<F> {
    fn detach(&self, id: u64) -> bool {
        let mut entries = self.entries.borrow_mut();
        match entries.iter().position(|(entry, _)| *entry == id) {
            Some(index) => {
                entries.remove(index);
                true
            }
            None => false,
        }
    }
}

/// Removes one registration from its list.
///
/// Dropping the handle does not unsubscribe.
pub struct Unsubscribe {
    list: Weak<dyn Detach>,
    id: u64,
}

impl Unsubscribe {
    /// Remove the registration this handle was returned for. Returns whether
    /// it was still registered.
    pub fn unsubscribe(&self) -> bool {
        self.list
            .upgrade()
            .is_some_and(|list| list.detach(self.id))
    }
}

impl std::fmt::Debug for Unsubscribe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Unsubscribe").field("id", &self.id).finish()
    }
}

impl<F: ?Sized + 'static> Subscriptions<F> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(ListInner {
                entries: RefCell::new(Vec::new()),
                next_id: StdCell::new(0),
            }),
        }
    }

    /// Append `callback`. The returned handle removes exactly this
    /// registration, even if the same callback was added more than once.
    pub fn add(&self, callback: Rc<F>) -> Unsubscribe {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner.entries.borrow_mut().push((id, callback));
        let list: Rc<dyn Detach> = self.inner.clone();
        Unsubscribe {
            list: Rc::downgrade(&list),
            id,
        }
    }

    /// The callbacks currently registered, in order.
    pub fn snapshot(&self) -> Vec<Rc<F>> {
        self.inner
            .entries
            .borrow()
            .iter()
            .map(|(_, callback)| callback.clone())
            .collect()
    }

    /// Call `f` with each callback registered at the time of the call.
    pub fn for_each(&self, mut f: impl FnMut(&F)) {
        for callback in self.snapshot() {
            f(&callback);
        }
    }

    pub fn clear(&self) {
        self.inner.entries.borrow_mut().clear();
    }

    pub fn len(&self) -> usize {
        self.inner.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.borrow().is_empty()
    }
}

impl<A: ?Sized + 'static> Subscriptions<dyn Fn(&A)> {
    /// Call every callback with `arg`.
    pub fn trigger(&self, arg: &A) {
        self.for_each(|callback| callback(arg));
    }
}

impl<F: ?Sized + 'static> Default for Subscriptions<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: ?Sized> Clone for Subscriptions<F> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<F: ?Sized> std::fmt::Debug for Subscriptions<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscriptions")
            .field("len", &self.inner.entries.borrow().len())
            .finish()
    }
}
