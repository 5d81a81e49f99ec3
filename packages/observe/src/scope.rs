//! Disposable scopes.

use std::cell::{Cell as StdCell, RefCell};
use std::rc::{Rc, Weak};

use crate::computed::ComputedInner;
use crate::watch::WatcherInner;

thread_local! {
    static CURRENT: RefCell<Vec<Scope>> = const { RefCell::new(Vec::new()) };
}

/// Something a scope tears down when it stops.
pub(crate) enum Effect {
    Watcher(Rc<WatcherInner>),
    Computed(Weak<ComputedInner>),
    Cleanup(Box<dyn FnOnce()>),
}

/// A disposable grouping of reactive effects.
///
/// Watchers and derived cells created while a scope is running (see
/// [`run`](Scope::run)) belong to it. [`stop`](Scope::stop) tears them all
/// down and cascades into child scopes. A stopped scope stays stopped.
#[derive(Clone)]
pub struct Scope {
    inner: Rc<ScopeInner>,
}

struct ScopeInner {
    active: StdCell<bool>,
    effects: RefCell<Vec<Effect>>,
    children: RefCell<Vec<Scope>>,
    parent: Weak<ScopeInner>,
}

struct CurrentGuard;

impl Drop for CurrentGuard {
    fn drop(&mut self) {
        CURRENT.with(|current| current.borrow_mut().pop());
    }
}

impl Scope {
    /// A root scope with no parent.
    pub fn detached() -> Self {
        Self::with_parent(Weak::new())
    }

    fn with_parent(parent: Weak<ScopeInner>) -> Self {
        Self {
            inner: Rc::new(ScopeInner {
                active: StdCell::new(true),
                effects: RefCell::new(Vec::new()),
                children: RefCell::new(Vec::new()),
                parent,
            }),
        }
    }

    /// A child scope, stopped whenever this one stops.
    ///
    /// A child of a stopped scope starts out stopped.
    pub fn child(&self) -> Scope {
        let child = Self::with_parent(Rc::downgrade(&self.inner));
        if self.is_active() {
            self.inner.children.borrow_mut().push(child.clone());
        } else {
            child.inner.active.set(false);
        }
        child
    }

    /// The innermost scope currently running, if any.
    pub fn current() -> Option<Scope> {
        CURRENT.with(|current| current.borrow().last().cloned())
    }

    /// Run `f` with this scope current, so effects it creates belong here.
    ///
    /// Returns `None` without running `f` when the scope has been stopped.
    pub fn run<T>(&self, f: impl FnOnce() -> T) -> Option<T> {
        if !self.is_active() {
            return None;
        }
        CURRENT.with(|current| current.borrow_mut().push(self.clone()));
        let _guard = CurrentGuard;
        Some(f())
    }

    pub fn is_active(&self) -> bool {
        self.inner.active.get()
    }

    /// Register a callback to run when the scope stops.
    ///
    /// Runs immediately if the scope is already stopped.
    pub fn on_stop(&self, cleanup: impl FnOnce() + 'static) {
        if self.is_active() {
            self.own(Effect::Cleanup(Box::new(cleanup)));
        } else {
            cleanup();
        }
    }

    /// Number of effects currently owned by this scope (children excluded).
    pub fn effect_count(&self) -> usize {
        self.inner.effects.borrow().len()
    }

    pub(crate) fn own(&self, effect: Effect) {
        if self.is_active() {
            self.inner.effects.borrow_mut().push(effect);
        } else {
            stop_effect(effect);
        }
    }

    /// Stop every child scope, then every owned effect.
    pub fn stop(&self) {
        if !self.inner.active.replace(false) {
            return;
        }

        let children = self.inner.children.take();
        for child in &children {
            child.stop();
        }

        let effects = self.inner.effects.take();
        tracing::trace!(effects = effects.len(), children = children.len(), "scope stopped");
        for effect in effects {
            stop_effect(effect);
        }

        if let Some(parent) = self.inner.parent.upgrade() {
            parent
                .children
                .borrow_mut()
                .retain(|c| !Rc::ptr_eq(&c.inner, &self.inner));
        }
    }

    pub fn ptr_eq(&self, other: &Scope) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

fn stop_effect(effect: Effect) {
    match effect {
        Effect::Watcher(watcher) => watcher.stop(),
        Effect::Computed(computed) => {
            if let Some(computed) = computed.upgrade() {
                computed.stop();
            }
        }
        Effect::Cleanup(cleanup) => cleanup(),
    }
}

impl std::fmt::Debug for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("active", &self.is_active())
            .field("effects", &self.effect_count())
            .field("children", &self.inner.children.borrow().len())
            .finish()
    }
}
