//! Watchers.

use std::cell::{Cell as StdCell, RefCell};
use std::rc::{Rc, Weak};

use depot_value::Value;

use crate::runtime;
use crate::scope::{Effect, Scope};
use crate::signal::{resubscribe, Observer, Signal};

/// Options for [`watch`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatchOptions {
    /// Invoke the callback once right away, with no previous value.
    pub immediate: bool,
}

impl WatchOptions {
    pub fn immediate() -> Self {
        Self { immediate: true }
    }
}

type WatchCallback = Box<dyn FnMut(&Value, Option<&Value>)>;

pub(crate) struct WatcherInner {
    source: Box<dyn Fn() -> Value>,
    callback: RefCell<WatchCallback>,
    last: RefCell<Option<Value>>,
    deps: RefCell<Vec<Signal>>,
    active: StdCell<bool>,
    queued: StdCell<bool>,
}

/// Handle to a running watcher.
///
/// Inside a [`Scope`] the scope keeps the watcher alive and the handle is
/// only needed for stopping it early. Outside any scope the handle is the
/// owner: dropping it stops the watcher.
pub struct WatchHandle {
    inner: Rc<WatcherInner>,
}

impl WatchHandle {
    pub fn stop(&self) {
        self.inner.stop();
    }

    pub fn is_active(&self) -> bool {
        self.inner.active.get()
    }
}

/// Watch `source`, calling `callback(new, old)` whenever a cell it read
/// emits.
///
/// The source is re-run on every dispatch, so dependencies follow whatever
/// it reads. Reads are deep: a source that snapshots a map depends on every
/// cell it touched. Inside a [`batch`](crate::batch) the callback fires at
/// most once, after the batch. The callback itself runs batched, so writes
/// it makes to watched cells re-dispatch after it returns rather than
/// recursing; a callback that keeps changing its own source never settles.
pub fn watch<S, C>(source: S, callback: C, options: WatchOptions) -> WatchHandle
where
    S: Fn() -> Value + 'static,
    C: FnMut(&Value, Option<&Value>) + 'static,
{
    let inner = Rc::new(WatcherInner {
        source: Box::new(source),
        callback: RefCell::new(Box::new(callback)),
        last: RefCell::new(None),
        deps: RefCell::new(Vec::new()),
        active: StdCell::new(true),
        queued: StdCell::new(false),
    });

    let scope = Scope::current();
    if let Some(scope) = &scope {
        scope.own(Effect::Watcher(inner.clone()));
    }

    if inner.active.get() {
        let value = inner.evaluate();
        if options.immediate {
            inner.dispatch(&value, None);
        }
        *inner.last.borrow_mut() = Some(value);
    }

    WatchHandle { inner }
}

impl WatcherInner {
    fn as_observer(self: &Rc<Self>) -> Weak<dyn Observer> {
        let observer: Rc<dyn Observer> = self.clone();
        Rc::downgrade(&observer)
    }

    fn evaluate(self: &Rc<Self>) -> Value {
        let (value, deps) = runtime::collect(|| (self.source)());
        let old = self.deps.replace(Vec::new());
        resubscribe(&self.as_observer(), &old, &deps);
        *self.deps.borrow_mut() = deps;
        value
    }

    fn dispatch(&self, value: &Value, old: Option<&Value>) {
        runtime::batch(|| {
            runtime::untracked(|| {
                let mut callback = self.callback.borrow_mut();
                (&mut **callback)(value, old)
            })
        });
    }

    pub(crate) fn run(self: &Rc<Self>) {
        self.queued.set(false);
        if !self.active.get() {
            return;
        }
        let value = self.evaluate();
        let old = self.last.replace(Some(value.clone()));
        self.dispatch(&value, old.as_ref());
    }

    pub(crate) fn stop(self: &Rc<Self>) {
        if !self.active.replace(false) {
            return;
        }
        let observer = self.as_observer();
        for dep in self.deps.take() {
            dep.unsubscribe(&observer);
        }
    }
}

impl Observer for WatcherInner {
    fn notify(self: Rc<Self>) {
        if !self.active.get() || self.queued.replace(true) {
            return;
        }
        runtime::schedule(self);
    }
}
