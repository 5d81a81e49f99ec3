//! Store instances.

use std::cell::{Cell as StdCell, RefCell};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use depot_observe::{batch, watch, Cell, Computed, Reactive, Scope, WatchOptions};
use depot_value::{assign, merge, Path, Value};

use crate::action::{ActionContext, ActionSubscriber, Outcome, WrappedAction};
use crate::config::RegistryConfig;
use crate::definition::StateFactory;
use crate::error::{Error, Result};
use crate::members::{Member, Members};
use crate::registry::{Registry, WeakRegistry};
use crate::subscription::{Subscriptions, Unsubscribe};

/// Options for [`Store::subscribe`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubscribeOptions {
    /// Call the subscriber once right away with the current state.
    pub immediate: bool,
}

impl SubscribeOptions {
    pub fn immediate() -> Self {
        Self { immediate: true }
    }
}

/// What state subscribers receive.
#[derive(Debug, Clone, Copy)]
pub struct StateChange<'a> {
    pub store_id: &'a str,
    pub state: &'a Value,
}

/// A member after installation on a store.
#[derive(Clone)]
pub(crate) enum Slot {
    Action(Rc<WrappedAction>),
    State(Cell),
    Computed(Computed),
    Plain(Value),
}

/// A constructed store.
///
/// `Store` is a cheap handle; clones refer to the same instance, and
/// [`ptr_eq`](Store::ptr_eq) tells instances apart. Its state slice lives in
/// the owning [`Registry`], its watchers and derived cells in its own
/// [`Scope`].
#[derive(Clone)]
pub struct Store {
    inner: Rc<StoreInner>,
}

/// A non-owning reference to a [`Store`].
#[derive(Clone)]
pub struct WeakStore {
    inner: Weak<StoreInner>,
}

impl WeakStore {
    pub fn upgrade(&self) -> Option<Store> {
        self.inner.upgrade().map(|inner| Store { inner })
    }
}

struct StoreInner {
    id: String,
    registry: WeakRegistry,
    config: RegistryConfig,
    slice: Reactive,
    scope: Scope,
    state_factory: Option<StateFactory>,
    members: RefCell<BTreeMap<String, Slot>>,
    action_subscribers: Subscriptions<ActionSubscriber>,
    disposed: StdCell<bool>,
}

impl Store {
    pub(crate) fn new(
        id: &str,
        registry: &Registry,
        scope: Scope,
        slice: Reactive,
        state_factory: Option<StateFactory>,
    ) -> Self {
        Self {
            inner: Rc::new(StoreInner {
                id: id.to_string(),
                registry: registry.downgrade(),
                config: registry.config(),
                slice,
                scope,
                state_factory,
                members: RefCell::new(BTreeMap::new()),
                action_subscribers: Subscriptions::new(),
                disposed: StdCell::new(false),
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// The owning registry, while it is alive.
    pub fn registry(&self) -> Option<Registry> {
        self.inner.registry.upgrade()
    }

    /// Whether the store came from declarative [`Options`](crate::Options).
    pub fn is_declarative(&self) -> bool {
        self.inner.state_factory.is_some()
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }

    pub fn scope(&self) -> &Scope {
        &self.inner.scope
    }

    /// The reactive state slice.
    pub fn slice(&self) -> &Reactive {
        &self.inner.slice
    }

    pub fn downgrade(&self) -> WeakStore {
        WeakStore {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn ptr_eq(&self, other: &Store) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// The whole state slice. Tracked when read inside a watcher or
    /// computed.
    pub fn state(&self) -> Value {
        self.inner.slice.snapshot()
    }

    /// Assign every top-level entry of `state` onto the slice, as one patch.
    ///
    /// Existing fields keep their cells; entries `state` lacks are kept.
    pub fn set_state(&self, state: impl Into<Value>) {
        let state = state.into();
        self.patch_with(|draft| {
            assign(draft, &state);
        });
    }

    /// Merge `partial` into the state slice.
    ///
    /// Only fields the slice already has are visited, recursively; keys
    /// that exist only in `partial` are ignored. Subscribers see a single
    /// notification however many fields change.
    pub fn patch(&self, partial: impl Into<Value>) -> Result<()> {
        let partial = partial.into();
        let Some(fields) = partial.as_map() else {
            return Err(Error::InvalidPatch {
                id: self.inner.id.clone(),
            });
        };

        let changed = batch(|| {
            let mut changed = 0usize;
            for (key, cell) in self.inner.slice.entries() {
                if let Some(incoming) = fields.get(&key) {
                    if cell.update_if(|current| merge(current, incoming)) {
                        changed += 1;
                    }
                }
            }
            changed
        });
        tracing::trace!(store = %self.inner.id, changed, "patched");
        Ok(())
    }

    /// Mutate a copy of the state slice, then write every top-level entry of
    /// the result back, as one patch.
    ///
    /// Entries the mutator adds become new fields. Entries it removes are
    /// kept, since the slice never drops a field while the store lives.
    pub fn patch_with(&self, mutate: impl FnOnce(&mut Value)) {
        let changed = batch(|| {
            let mut draft = self.inner.slice.peek();
            mutate(&mut draft);
            let Value::Map(fields) = draft else {
                return 0usize;
            };
            let mut changed = 0usize;
            for (key, value) in fields {
                if self.inner.slice.insert(&key, value) {
                    changed += 1;
                }
            }
            changed
        });
        tracing::trace!(store = %self.inner.id, changed, "patched with mutator");
    }

    /// Call `callback` whenever anything in the state slice changes.
    ///
    /// The watcher belongs to the store's scope and stops with it. On a
    /// disposed store this does nothing.
    pub fn subscribe<F>(&self, callback: F, options: SubscribeOptions)
    where
        F: Fn(&StateChange<'_>) + 'static,
    {
        let slice = self.inner.slice.clone();
        let id = self.inner.id.clone();
        let registered = self.inner.scope.run(move || {
            watch(
                move || slice.snapshot(),
                move |state, _| {
                    callback(&StateChange {
                        store_id: &id,
                        state,
                    })
                },
                WatchOptions {
                    immediate: options.immediate,
                },
            );
        });
        if registered.is_none() {
            tracing::debug!(store = %self.inner.id, "subscribe on disposed store ignored");
        }
    }

    /// Register `callback` to hear about every action call on this store.
    pub fn on_action<F>(&self, callback: F) -> Unsubscribe
    where
        F: Fn(&ActionContext<'_>) + 'static,
    {
        let callback: Rc<ActionSubscriber> = Rc::new(callback);
        self.inner.action_subscribers.add(callback)
    }

    /// Tear the store down.
    ///
    /// Stops every watcher and derived cell it owns, removes it and its state
    /// slice from the registry and drops its action subscribers. The next
    /// accessor call builds a fresh store. Idempotent.
    pub fn dispose(&self) {
        if self.teardown() {
            if let Some(registry) = self.registry() {
                registry.forget(self);
            }
            tracing::debug!(store = %self.inner.id, "store disposed");
        }
    }

    pub(crate) fn teardown(&self) -> bool {
        if self.inner.disposed.replace(true) {
            return false;
        }
        self.inner.scope.stop();
        self.inner.action_subscribers.clear();
        true
    }

    /// Re-run the state factory and assign the result onto the slice.
    ///
    /// Only stores built from [`Options`](crate::Options) can be reset.
    pub fn reset(&self) -> Result<()> {
        let factory = self
            .inner
            .state_factory
            .clone()
            .ok_or_else(|| Error::ResetUnsupported {
                id: self.inner.id.clone(),
            })?;
        self.set_state(factory());
        Ok(())
    }

    fn slot(&self, name: &str) -> Option<Slot> {
        self.inner.members.borrow().get(name).cloned()
    }

    /// Read a state, computed or plain member. Actions have no value.
    pub fn get(&self, name: &str) -> Option<Value> {
        match self.slot(name)? {
            Slot::State(cell) => Some(cell.get()),
            Slot::Computed(computed) => Some(computed.get()),
            Slot::Plain(value) => Some(value),
            Slot::Action(_) => None,
        }
    }

    /// Read below a member: the first component names the member, the rest
    /// walk into its value.
    pub fn read(&self, path: &Path) -> Option<Value> {
        let (head, rest) = path.components.split_first()?;
        let value = self.get(head)?;
        let rest = Path {
            components: rest.to_vec(),
        };
        value.get(&rest).cloned()
    }

    /// Write a state member. Returns whether the value changed.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<bool> {
        Ok(self.state_cell(name)?.set(value))
    }

    /// Mutate a state member in place. Returns whether the value changed.
    pub fn update(&self, name: &str, f: impl FnOnce(&mut Value)) -> Result<bool> {
        Ok(self.state_cell(name)?.update(f))
    }

    fn state_cell(&self, name: &str) -> Result<Cell> {
        self.cell(name).ok_or_else(|| Error::NotState {
            id: self.inner.id.clone(),
            name: name.to_string(),
        })
    }

    pub fn cell(&self, name: &str) -> Option<Cell> {
        match self.slot(name)? {
            Slot::State(cell) => Some(cell),
            _ => None,
        }
    }

    pub fn computed(&self, name: &str) -> Option<Computed> {
        match self.slot(name)? {
            Slot::Computed(computed) => Some(computed),
            _ => None,
        }
    }

    pub fn has_action(&self, name: &str) -> bool {
        matches!(self.slot(name), Some(Slot::Action(_)))
    }

    /// Invoke the action `name` through its interceptor.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Outcome> {
        let Some(Slot::Action(action)) = self.slot(name) else {
            return Err(Error::UnknownAction {
                id: self.inner.id.clone(),
                name: name.to_string(),
            });
        };
        action.invoke(
            self,
            &self.inner.action_subscribers,
            args,
            self.inner.config,
        )
    }

    pub fn member_names(&self) -> Vec<String> {
        self.inner.members.borrow().keys().cloned().collect()
    }

    pub(crate) fn slots(&self) -> Vec<(String, Slot)> {
        self.inner
            .members
            .borrow()
            .iter()
            .map(|(name, slot)| (name.clone(), slot.clone()))
            .collect()
    }

    /// Sort a member bundle into slots, linking state cells into the slice
    /// when `link_state` is set.
    pub(crate) fn classify(&self, members: Members, link_state: bool) -> Vec<(String, Slot)> {
        batch(|| {
            members
                .into_iter()
                .map(|(name, member)| {
                    let slot = match member {
                        Member::Action(raw) => Slot::Action(Rc::new(WrappedAction::new(&name, raw))),
                        Member::State(cell) => {
                            if link_state {
                                self.inner.slice.link(name.clone(), cell.clone());
                            }
                            Slot::State(cell)
                        }
                        Member::Computed(computed) => Slot::Computed(computed),
                        Member::Plain(value) => Slot::Plain(value),
                    };
                    (name, slot)
                })
                .collect()
        })
    }

    pub(crate) fn merge_slots(&self, slots: Vec<(String, Slot)>) {
        let mut members = self.inner.members.borrow_mut();
        for (name, slot) in slots {
            members.insert(name, slot);
        }
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("id", &self.inner.id)
            .field("state", &self.inner.slice.peek())
            .field("members", &self.member_names())
            .field("disposed", &self.inner.disposed.get())
            .finish()
    }
}
