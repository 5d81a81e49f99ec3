//! Registry configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// What a wrapped action does when the raw action fails synchronously.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncErrorPolicy {
    /// Error callbacks fire, then the call returns `Null` as if it had
    /// succeeded. After callbacks still fire, with `Null`.
    #[default]
    Swallow,
    /// Error callbacks fire, then the call returns [`Error::Action`].
    Propagate,
}

/// When after callbacks fire for an action that returned a pending outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingAfterPolicy {
    /// Once right away with [`ActionReturn::Pending`](crate::ActionReturn),
    /// and once more with the resolved value.
    #[default]
    FireTwice,
    /// Only once, with the resolved value.
    AfterSettlement,
}

/// Behaviour switches for a [`Registry`](crate::Registry).
///
/// The defaults keep the historical behaviour of both open policies.
///
/// ```rust
/// use depot_core::{PendingAfterPolicy, RegistryConfig, SyncErrorPolicy};
///
/// let config = RegistryConfig::from_json(r#"{"sync_errors": "propagate"}"#).unwrap();
/// assert_eq!(config.sync_errors, SyncErrorPolicy::Propagate);
/// assert_eq!(config.pending_after, PendingAfterPolicy::FireTwice);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub sync_errors: SyncErrorPolicy,
    pub pending_after: PendingAfterPolicy,
}

impl RegistryConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::Config {
            message: e.to_string(),
        })
    }

    pub fn sync_errors(mut self, policy: SyncErrorPolicy) -> Self {
        self.sync_errors = policy;
        self
    }

    pub fn pending_after(mut self, policy: PendingAfterPolicy) -> Self {
        self.pending_after = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_is_default() {
        assert_eq!(RegistryConfig::from_json("{}").unwrap(), RegistryConfig::default());
    }

    #[test]
    fn parses_both_policies() {
        let config = RegistryConfig::from_json(
            r#"{"sync_errors": "propagate", "pending_after": "after_settlement"}"#,
        )
        .unwrap();
        assert_eq!(config.sync_errors, SyncErrorPolicy::Propagate);
        assert_eq!(config.pending_after, PendingAfterPolicy::AfterSettlement);
    }

    #[test]
    fn rejects_unknown_policy() {
        let err = RegistryConfig::from_json(r#"{"sync_errors": "explode"}"#).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }
}
