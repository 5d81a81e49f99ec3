//! Derived cells.

use std::cell::{Cell as StdCell, RefCell};
use std::rc::{Rc, Weak};

use depot_value::Value;

use crate::runtime;
use crate::scope::{Effect, Scope};
use crate::signal::{resubscribe, Observer, Signal};

/// A cached value derived from other cells.
///
/// The getter runs lazily on first read and again only after one of the
/// signals it read has emitted. Readers of a `Computed` track it like any
/// other cell. When created inside a [`Scope`], stopping the scope detaches
/// it from its dependencies; a stopped `Computed` evaluates its getter on
/// every read.
#[derive(Clone)]
pub struct Computed {
    inner: Rc<ComputedInner>,
}

pub(crate) struct ComputedInner {
    getter: Box<dyn Fn() -> Value>,
    cached: RefCell<Option<Value>>,
    dirty: StdCell<bool>,
    stopped: StdCell<bool>,
    deps: RefCell<Vec<Signal>>,
    signal: Signal,
}

impl Computed {
    pub fn new(getter: impl Fn() -> Value + 'static) -> Self {
        let inner = Rc::new(ComputedInner {
            getter: Box::new(getter),
            cached: RefCell::new(None),
            dirty: StdCell::new(true),
            stopped: StdCell::new(false),
            deps: RefCell::new(Vec::new()),
            signal: Signal::new(),
        });
        if let Some(scope) = Scope::current() {
            scope.own(Effect::Computed(Rc::downgrade(&inner)));
        }
        Self { inner }
    }

    /// Read the derived value, tracking this cell as a dependency.
    pub fn get(&self) -> Value {
        self.inner.signal.track();
        if self.inner.stopped.get() {
            return runtime::untracked(|| (self.inner.getter)());
        }
        if self.inner.dirty.get() {
            self.inner.refresh();
        }
        self.inner.cached.borrow().clone().unwrap_or_default()
    }

    /// Whether the next read re-runs the getter.
    pub fn is_dirty(&self) -> bool {
        self.inner.dirty.get()
    }

    pub fn signal(&self) -> &Signal {
        &self.inner.signal
    }

    pub fn ptr_eq(&self, other: &Computed) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Detach from every dependency.
    pub fn stop(&self) {
        self.inner.stop();
    }
}

impl ComputedInner {
    fn as_observer(self: &Rc<Self>) -> Weak<dyn Observer> {
        let observer: Rc<dyn Observer> = self.clone();
        Rc::downgrade(&observer)
    }

    fn refresh(self: &Rc<Self>) {
        let (value, deps) = runtime::collect(|| (self.getter)());
        let old = self.deps.replace(Vec::new());
        resubscribe(&self.as_observer(), &old, &deps);
        *self.deps.borrow_mut() = deps;
        *self.cached.borrow_mut() = Some(value);
        self.dirty.set(false);
    }

    pub(crate) fn stop(self: &Rc<Self>) {
        if self.stopped.replace(true) {
            return;
        }
        let observer = self.as_observer();
        for dep in self.deps.take() {
            dep.unsubscribe(&observer);
        }
    }
}

impl Observer for ComputedInner {
    fn notify(self: Rc<Self>) {
        if !self.dirty.replace(true) {
            self.signal.emit();
        }
    }
}

impl std::fmt::Debug for Computed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Computed")
            .field("cached", &*self.inner.cached.borrow())
            .field("dirty", &self.inner.dirty.get())
            .finish()
    }
}
