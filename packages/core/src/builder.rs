//! Store construction.

use depot_observe::Reactive;

use crate::definition::StoreDefinition;
use crate::error::{Error, Result};
use crate::plugin::PluginContext;
use crate::registry::Registry;
use crate::store::Store;

/// Build the store for `definition` and cache it in `registry`.
///
/// Order matters here:
/// 1. a fresh state slice is registered and a child scope is opened;
/// 2. setup runs inside that scope and its state cells are linked into the
///    slice (declarative setups fill the slice themselves);
/// 3. plugins run in registration order, inside the scope, and their
///    members are installed right away;
/// 4. setup members are installed last, so they win name clashes with
///    plugin members.
///
/// A failing plugin rolls everything back: the scope is stopped, the slice
/// removed and nothing is cached.
pub(crate) fn build(registry: &Registry, definition: &StoreDefinition) -> Result<Store> {
    let id = definition.id();
    let scope = registry.scope().child();
    let slice = Reactive::new();
    registry.insert_slice(id, slice.clone());

    let store = Store::new(
        id,
        registry,
        scope.clone(),
        slice.clone(),
        definition.state_factory(),
    );

    let setup = definition.setup();
    let bundle = scope.run(|| setup(&store)).unwrap_or_default();
    let setup_slots = store.classify(bundle, !definition.is_declarative());

    for plugin in registry.plugins() {
        let context = PluginContext {
            store: &store,
            registry,
        };
        match scope.run(|| plugin.apply(&context)).unwrap_or(Ok(None)) {
            Ok(Some(extension)) => {
                tracing::debug!(store = id, plugin = plugin.name(), members = extension.len(), "plugin extended store");
                let slots = store.classify(extension, true);
                store.merge_slots(slots);
            }
            Ok(None) => {
                tracing::debug!(store = id, plugin = plugin.name(), "plugin applied");
            }
            Err(source) => {
                store.teardown();
                registry.remove_slice(id, &slice);
                tracing::debug!(store = id, plugin = plugin.name(), error = %source, "store construction rolled back");
                return Err(Error::Plugin {
                    plugin: plugin.name().to_string(),
                    id: id.to_string(),
                    source: Box::new(source),
                });
            }
        }
    }

    store.merge_slots(setup_slots);
    registry.insert_store(store.clone());
    tracing::debug!(
        store = id,
        declarative = definition.is_declarative(),
        members = store.member_names().len(),
        "store built"
    );
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{define_setup_store, plugin_fn, Members, Outcome};
    use depot_value::Value;

    #[test]
    fn setup_state_is_linked_into_slice() {
        let registry = Registry::new();
        let store = define_setup_store("s", || {
            Members::new()
                .state("count", 1)
                .plain("label", "not state")
        })
        .use_store(&registry)
        .unwrap();

        assert_eq!(store.slice().keys(), vec!["count".to_string()]);
        assert!(store.cell("count").unwrap().ptr_eq(&store.slice().field("count").unwrap()));
    }

    #[test]
    fn setup_members_win_over_plugin_members() {
        let registry = Registry::new();
        registry.use_plugin(plugin_fn(|_| {
            Ok(Some(Members::new().plain("label", "plugin").plain("extra", 1)))
        }));
        let store = define_setup_store("s", || Members::new().plain("label", "setup"))
            .use_store(&registry)
            .unwrap();

        assert_eq!(store.get("label"), Some(Value::from("setup")));
        assert_eq!(store.get("extra"), Some(Value::Integer(1)));
    }

    #[test]
    fn plugin_state_is_linked_even_for_declarative_stores() {
        let registry = Registry::new();
        registry.use_plugin(plugin_fn(|_| Ok(Some(Members::new().state("hydrated", false)))));
        let store = crate::define_store("opts", crate::Options::new())
            .use_store(&registry)
            .unwrap();
        assert!(store.slice().contains_key("hydrated"));
    }

    #[test]
    fn failing_plugin_rolls_back() {
        let registry = Registry::new();
        registry.use_plugin(plugin_fn(|_| Err(Error::other("nope"))));
        let definition = define_setup_store("s", || {
            Members::new()
                .state("count", 0)
                .action("noop", |_, _| Ok(Outcome::ready(Value::Null)))
        });

        let err = definition.use_store(&registry).unwrap_err();
        assert!(matches!(err, Error::Plugin { .. }));
        assert!(!registry.has_store("s"));
        assert!(registry.slice("s").is_none());
    }

    #[test]
    fn plugin_sees_slice_but_not_setup_members() {
        let registry = Registry::new();
        let seen = std::rc::Rc::new(std::cell::RefCell::new(None));
        let log = seen.clone();
        registry.use_plugin(plugin_fn(move |ctx| {
            *log.borrow_mut() = Some((ctx.store.state(), ctx.store.has_action("bump")));
            Ok(None)
        }));
        define_setup_store("s", || {
            Members::new()
                .state("count", 3)
                .action("bump", |_, _| Ok(Outcome::ready(Value::Null)))
        })
        .use_store(&registry)
        .unwrap();

        let (state, has_bump) = seen.borrow_mut().take().unwrap();
        assert_eq!(state.field("count"), Some(&Value::Integer(3)));
        assert!(!has_bump);
    }
}
