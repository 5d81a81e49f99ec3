//! Plugins: per-store extension hooks run at construction time.

use crate::error::Result;
use crate::members::Members;
use crate::registry::Registry;
use crate::store::Store;

/// What a plugin sees while a store is being built.
pub struct PluginContext<'a> {
    pub store: &'a Store,
    pub registry: &'a Registry,
}

/// A construction-time extension.
///
/// `apply` runs once per store, inside the store's scope, after setup state
/// has been linked into the slice. Members it returns are installed like
/// setup members: actions get intercepted and state cells are linked into
/// the slice. Subscriptions it registers live as long as the store.
///
/// Closures implement `Plugin`; [`plugin_fn`] helps the compiler infer their
/// signature.
pub trait Plugin {
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    fn apply(&self, context: &PluginContext<'_>) -> Result<Option<Members>>;
}

impl<F> Plugin for F
where
    F: Fn(&PluginContext<'_>) -> Result<Option<Members>>,
{
    fn apply(&self, context: &PluginContext<'_>) -> Result<Option<Members>> {
        self(context)
    }
}

/// Pin a closure to the plugin signature.
pub fn plugin_fn<F>(f: F) -> F
where
    F: Fn(&PluginContext<'_>) -> Result<Option<Members>>,
{
    f
}
