//! Action interception.
//!
//! Every action a store exposes is wrapped so that, per call, the store's
//! action subscribers are told about it first and may hook the outcome with
//! [`ActionContext::after`] and [`ActionContext::on_error`].

use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use depot_observe::batch;
use depot_value::Value;

use crate::config::{PendingAfterPolicy, RegistryConfig, SyncErrorPolicy};
use crate::error::{ActionError, Error, Result};
use crate::store::Store;
use crate::subscription::Subscriptions;

/// A pending action result.
///
/// Futures are driven by whoever holds the [`Outcome`]; dropping one cancels
/// the action and neither after nor error callbacks fire for it.
pub type ActionFuture = Pin<Box<dyn Future<Output = std::result::Result<Value, ActionError>>>>;

/// What a raw action returns.
pub type ActionResult = std::result::Result<Outcome, ActionError>;

/// A raw action: receives the assembled store and the call arguments.
pub type ActionFn = Rc<dyn Fn(&Store, &[Value]) -> ActionResult>;

/// The result of an action call.
pub enum Outcome {
    /// Finished synchronously.
    Ready(Value),
    /// Still running; await [`settle`](Outcome::settle) for the result.
    Pending(ActionFuture),
}

impl Outcome {
    pub fn ready(value: impl Into<Value>) -> Self {
        Outcome::Ready(value.into())
    }

    pub fn pending<F>(future: F) -> Self
    where
        F: Future<Output = std::result::Result<Value, ActionError>> + 'static,
    {
        Outcome::Pending(Box::pin(future))
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Outcome::Pending(_))
    }

    /// The synchronous value, if there is one.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Outcome::Ready(value) => Some(value),
            Outcome::Pending(_) => None,
        }
    }

    /// Wait for the final value.
    pub async fn settle(self) -> std::result::Result<Value, ActionError> {
        match self {
            Outcome::Ready(value) => Ok(value),
            Outcome::Pending(future) => future.await,
        }
    }
}

impl std::fmt::Debug for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Ready(value) => f.debug_tuple("Ready").field(value).finish(),
            Outcome::Pending(_) => f.write_str("Pending"),
        }
    }
}

/// What after callbacks receive.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionReturn {
    Value(Value),
    /// The action returned a pending outcome that has not settled yet.
    Pending,
}

impl ActionReturn {
    pub fn value(&self) -> Option<&Value> {
        match self {
            ActionReturn::Value(value) => Some(value),
            ActionReturn::Pending => None,
        }
    }
}

type AfterCallback = dyn Fn(&ActionReturn);
type ErrorCallback = dyn Fn(&ActionError);

/// An action subscriber, see [`Store::on_action`].
pub type ActionSubscriber = dyn for<'a> Fn(&ActionContext<'a>);

#[derive(Default)]
struct CallHooks {
    after: Subscriptions<AfterCallback>,
    error: Subscriptions<ErrorCallback>,
}

/// One action call, as seen by action subscribers.
pub struct ActionContext<'a> {
    pub name: &'a str,
    pub store: &'a Store,
    pub args: &'a [Value],
    hooks: &'a CallHooks,
}

impl ActionContext<'_> {
    /// Run `callback` with the action's return value once it is known.
    pub fn after(&self, callback: impl Fn(&ActionReturn) + 'static) {
        self.hooks.after.add(Rc::new(callback));
    }

    /// Run `callback` if this call fails.
    pub fn on_error(&self, callback: impl Fn(&ActionError) + 'static) {
        self.hooks.error.add(Rc::new(callback));
    }
}

impl std::fmt::Debug for ActionContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionContext")
            .field("name", &self.name)
            .field("store", &self.store.id())
            .field("args", &self.args)
            .finish()
    }
}

/// A raw action plus the name it is exposed under.
pub(crate) struct WrappedAction {
    name: String,
    raw: ActionFn,
}

impl WrappedAction {
    pub(crate) fn new(name: impl Into<String>, raw: ActionFn) -> Self {
        Self {
            name: name.into(),
            raw,
        }
    }

    pub(crate) fn invoke(
        &self,
        store: &Store,
        subscribers: &Subscriptions<ActionSubscriber>,
        args: &[Value],
        config: RegistryConfig,
    ) -> Result<Outcome> {
        let hooks = Rc::new(CallHooks::default());
        let context = ActionContext {
            name: &self.name,
            store,
            args,
            hooks: &hooks,
        };
        subscribers.for_each(|subscriber| subscriber(&context));

        tracing::trace!(store = store.id(), action = %self.name, "action invoked");
        // Cell writes made by the action reach subscribers once, after it returns.
        match batch(|| (self.raw)(store, args)) {
            Ok(Outcome::Ready(value)) => {
                hooks.after.trigger(&ActionReturn::Value(value.clone()));
                Ok(Outcome::Ready(value))
            }
            Ok(Outcome::Pending(future)) => {
                if config.pending_after == PendingAfterPolicy::FireTwice {
                    hooks.after.trigger(&ActionReturn::Pending);
                }
                let hooks = hooks.clone();
                Ok(Outcome::pending(async move {
                    match future.await {
                        Ok(value) => {
                            hooks.after.trigger(&ActionReturn::Value(value.clone()));
                            Ok(value)
                        }
                        Err(error) => {
                            hooks.error.trigger(&error);
                            Err(error)
                        }
                    }
                }))
            }
            Err(error) => {
                tracing::trace!(store = store.id(), action = %self.name, %error, "action failed");
                hooks.error.trigger(&error);
                match config.sync_errors {
                    SyncErrorPolicy::Swallow => {
                        hooks.after.trigger(&ActionReturn::Value(Value::Null));
                        Ok(Outcome::Ready(Value::Null))
                    }
                    SyncErrorPolicy::Propagate => Err(Error::Action {
                        name: self.name.clone(),
                        source: error,
                    }),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ready_outcome_exposes_value() {
        let outcome = Outcome::ready(3);
        assert!(!outcome.is_pending());
        assert_eq!(outcome.value(), Some(&Value::Integer(3)));
    }

    #[test]
    fn pending_outcome_has_no_value_yet() {
        let outcome = Outcome::pending(async { Ok(Value::Null) });
        assert!(outcome.is_pending());
        assert!(outcome.value().is_none());
        assert_eq!(format!("{outcome:?}"), "Pending");
    }

    #[test]
    fn action_return_value() {
        assert_eq!(ActionReturn::Value(Value::from(1)).value(), Some(&Value::Integer(1)));
        assert_eq!(ActionReturn::Pending.value(), None);
    }
}
