//! Declarative store options.

use std::rc::Rc;

use depot_observe::Computed;
use depot_value::Value;

use crate::action::{ActionFn, ActionResult};
use crate::definition::{SetupFn, StateFactory};
use crate::members::{Member, Members};
use crate::store::Store;

/// A getter: derives a value from the assembled store.
pub type GetterFn = Rc<dyn Fn(&Store) -> Value>;

/// State, getters and actions, declared separately.
///
/// The state factory runs once per build to fill the slice, and again on
/// [`Store::reset`]. Each top-level state field becomes its own cell.
/// Actions and getters receive the finished store, plugin members included.
///
/// ```rust
/// use depot_core::{define_store, Options, Outcome, Registry};
/// use depot_value::Value;
/// use serde_json::json;
///
/// let use_counter = define_store(
///     "counter",
///     Options::new()
///         .state(|| json!({"count": 0}))
///         .getter("double", |s| Value::from(s.get("count").and_then(|v| v.as_i64()).unwrap_or(0) * 2))
///         .action("increment", |s, _| {
///             s.update("count", |v| *v = Value::from(v.as_i64().unwrap_or(0) + 1))?;
///             Ok(Outcome::ready(Value::Null))
///         }),
/// );
///
/// let registry = Registry::new();
/// let counter = use_counter.use_store(&registry).unwrap();
/// counter.call("increment", &[]).unwrap();
/// assert_eq!(counter.get("double"), Some(Value::Integer(2)));
/// ```
#[derive(Clone, Default)]
pub struct Options {
    id: Option<String>,
    state: Option<StateFactory>,
    getters: Vec<(String, GetterFn)>,
    actions: Vec<(String, ActionFn)>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn state<F, V>(mut self, factory: F) -> Self
    where
        F: Fn() -> V + 'static,
        V: Into<Value>,
    {
        self.state = Some(Rc::new(move || factory().into()));
        self
    }

    pub fn getter<F, V>(mut self, name: impl Into<String>, getter: F) -> Self
    where
        F: Fn(&Store) -> V + 'static,
        V: Into<Value>,
    {
        self.getters
            .push((name.into(), Rc::new(move |store: &Store| getter(store).into())));
        self
    }

    pub fn action<F>(mut self, name: impl Into<String>, action: F) -> Self
    where
        F: Fn(&Store, &[Value]) -> ActionResult + 'static,
    {
        self.actions.push((name.into(), Rc::new(action)));
        self
    }

    /// Split into id, state factory and a setup function that fills the
    /// slice and exposes its cells, actions and getters.
    pub(crate) fn into_parts(self) -> (Option<String>, StateFactory, SetupFn) {
        let Options {
            id,
            state,
            getters,
            actions,
        } = self;
        let state: StateFactory = match state {
            Some(state) => state,
            None => Rc::new(Value::map),
        };

        let factory = state.clone();
        let setup: SetupFn = Rc::new(move |store: &Store| {
            let slice = store.slice();
            match factory() {
                Value::Map(fields) => {
                    for (key, value) in fields {
                        slice.insert(&key, value);
                    }
                }
                other => {
                    tracing::debug!(store = store.id(), state = ?other, "non-map initial state ignored");
                }
            }

            let mut members = Members::new();
            for (key, cell) in slice.entries() {
                members.insert(key, Member::State(cell));
            }
            for (name, action) in &actions {
                members.insert(name.clone(), Member::Action(action.clone()));
            }
            for (name, getter) in &getters {
                let store = store.downgrade();
                let getter = getter.clone();
                let computed = Computed::new(move || {
                    store
                        .upgrade()
                        .map_or(Value::Null, |store| getter(&store))
                });
                members.insert(name.clone(), Member::Computed(computed));
            }
            members
        });

        (id, state, setup)
    }
}

impl std::fmt::Debug for Options {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Options")
            .field("id", &self.id)
            .field("state", &self.state.is_some())
            .field("getters", &self.getters.iter().map(|(n, _)| n).collect::<Vec<_>>())
            .field("actions", &self.actions.iter().map(|(n, _)| n).collect::<Vec<_>>())
            .finish()
    }
}
