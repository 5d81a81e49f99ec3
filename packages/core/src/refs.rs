//! Destructuring a store into its reactive members.

use std::collections::BTreeMap;

use depot_observe::{Cell, Computed};
use depot_value::Value;

use crate::store::{Slot, Store};

/// A reactive member pulled out of a store.
#[derive(Clone, Debug)]
pub enum StoreRef {
    State(Cell),
    Computed(Computed),
}

impl StoreRef {
    /// Read the current value, tracking it.
    pub fn get(&self) -> Value {
        match self {
            StoreRef::State(cell) => cell.get(),
            StoreRef::Computed(computed) => computed.get(),
        }
    }

    /// The writable cell, for state members.
    pub fn as_cell(&self) -> Option<&Cell> {
        match self {
            StoreRef::State(cell) => Some(cell),
            StoreRef::Computed(_) => None,
        }
    }
}

/// Every state and computed member of `store`, by name.
///
/// Actions and plain values are left out. The returned handles share their
/// cells with the store, so reads stay tracked and writes to state refs
/// reach the slice.
pub fn store_to_refs(store: &Store) -> BTreeMap<String, StoreRef> {
    store
        .slots()
        .into_iter()
        .filter_map(|(name, slot)| match slot {
            Slot::State(cell) => Some((name, StoreRef::State(cell))),
            Slot::Computed(computed) => Some((name, StoreRef::Computed(computed))),
            Slot::Action(_) | Slot::Plain(_) => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{define_setup_store, Members, Outcome, Registry};

    #[test]
    fn keeps_only_reactive_members() {
        let registry = Registry::new();
        let store = define_setup_store("s", || {
            let count = Cell::new(2);
            let double = {
                let count = count.clone();
                Computed::new(move || Value::from(count.get().as_i64().unwrap_or(0) * 2))
            };
            Members::new()
                .cell("count", count)
                .computed("double", double)
                .plain("label", "x")
                .action("noop", |_, _| Ok(Outcome::ready(Value::Null)))
        })
        .use_store(&registry)
        .unwrap();

        let refs = store_to_refs(&store);
        assert_eq!(refs.keys().collect::<Vec<_>>(), vec!["count", "double"]);

        refs["count"].as_cell().unwrap().set(5);
        assert_eq!(store.get("count"), Some(Value::Integer(5)));
        assert_eq!(refs["double"].get(), Value::Integer(10));
        assert!(refs["double"].as_cell().is_none());
    }
}
