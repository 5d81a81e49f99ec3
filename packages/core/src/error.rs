//! Error types for the store registry.

use depot_value::Value;
use thiserror::Error;

/// Errors raised by the registry, store construction and store members.
#[derive(Debug, Error)]
pub enum Error {
    /// An options-only definition did not name its store.
    #[error("store definition has no id")]
    MissingId,

    /// `use_active` was called with no active registry set.
    #[error("no active registry; call set_active_registry first")]
    NoActiveRegistry,

    /// The registry was disposed; it no longer builds stores.
    #[error("registry has been disposed")]
    RegistryDisposed,

    /// `call` named something that is not an action.
    #[error("store '{id}' has no action '{name}'")]
    UnknownAction { id: String, name: String },

    /// `set` named something that is not a state member.
    #[error("store '{id}' has no state member '{name}'")]
    NotState { id: String, name: String },

    /// `reset` on a store built from a setup function.
    #[error("store '{id}' was defined with a setup function and cannot be reset")]
    ResetUnsupported { id: String },

    /// A mapping patch that was not a map.
    #[error("patch for store '{id}' must be a map")]
    InvalidPatch { id: String },

    /// A synchronous action failure under the propagate policy.
    #[error("action '{name}' failed: {source}")]
    Action {
        name: String,
        #[source]
        source: ActionError,
    },

    /// A plugin failed while a store was being built.
    #[error("plugin '{plugin}' failed on store '{id}': {source}")]
    Plugin {
        plugin: String,
        id: String,
        #[source]
        source: Box<Error>,
    },

    /// Registry configuration could not be parsed.
    #[error("invalid registry config: {message}")]
    Config { message: String },

    /// Error from the value layer.
    #[error(transparent)]
    Value(#[from] depot_value::Error),

    /// Generic error with message, for plugins.
    #[error("{message}")]
    Other { message: String },
}

impl Error {
    pub fn other(message: impl Into<String>) -> Self {
        Error::Other {
            message: message.into(),
        }
    }
}

/// Result alias for registry operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The value an action failed with.
///
/// This is what error callbacks registered through
/// [`ActionContext::on_error`](crate::ActionContext::on_error) receive, and
/// what a rejected pending action resolves to.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ActionError {
    pub message: String,
    /// Structured detail attached by the action, `Null` when there is none.
    pub payload: Value,
}

impl ActionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            payload: Value::Null,
        }
    }

    pub fn with_payload(message: impl Into<String>, payload: impl Into<Value>) -> Self {
        Self {
            message: message.into(),
            payload: payload.into(),
        }
    }
}

impl From<Error> for ActionError {
    fn from(e: Error) -> Self {
        ActionError::new(e.to_string())
    }
}

impl From<depot_value::Error> for ActionError {
    fn from(e: depot_value::Error) -> Self {
        ActionError::new(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;

    #[test]
    fn unknown_action_display() {
        let err = Error::UnknownAction {
            id: "counter".into(),
            name: "bump".into(),
        };
        assert_eq!(err.to_string(), "store 'counter' has no action 'bump'");
    }

    #[test]
    fn plugin_error_keeps_source() {
        let err = Error::Plugin {
            plugin: "persist".into(),
            id: "counter".into(),
            source: Box::new(Error::other("disk full")),
        };
        assert!(err.to_string().contains("disk full"));
        assert!(err.source().is_some());
    }

    #[test]
    fn action_error_from_core_error() {
        let err: ActionError = Error::ResetUnsupported { id: "s".into() }.into();
        assert!(err.message.contains("cannot be reset"));
        assert_eq!(err.payload, Value::Null);
    }
}
