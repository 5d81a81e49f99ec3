//! Store members as returned by setup functions and plugins.

use std::rc::Rc;

use depot_observe::{Cell, Computed};
use depot_value::Value;

use crate::action::{ActionFn, ActionResult};
use crate::store::Store;

/// One named member of a store, tagged by kind.
#[derive(Clone)]
pub enum Member {
    /// Wrapped with action interception when installed.
    Action(ActionFn),
    /// Linked into the store's state slice under the member's name.
    State(Cell),
    /// Exposed as-is.
    Computed(Computed),
    /// Exposed as-is; not reactive.
    Plain(Value),
}

impl Member {
    pub fn kind(&self) -> &'static str {
        match self {
            Member::Action(_) => "action",
            Member::State(_) => "state",
            Member::Computed(_) => "computed",
            Member::Plain(_) => "plain",
        }
    }
}

impl std::fmt::Debug for Member {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Member::Action(_) => f.write_str("Action"),
            Member::State(cell) => f.debug_tuple("State").field(cell).finish(),
            Member::Computed(computed) => f.debug_tuple("Computed").field(computed).finish(),
            Member::Plain(value) => f.debug_tuple("Plain").field(value).finish(),
        }
    }
}

/// An ordered bundle of named members.
///
/// A later member with the same name replaces an earlier one.
///
/// ```rust
/// use depot_core::{Members, Outcome};
/// use depot_observe::{Cell, Computed, Value};
///
/// let count = Cell::new(0);
/// let double = {
///     let count = count.clone();
///     Computed::new(move || Value::from(count.get().as_i64().unwrap_or(0) * 2))
/// };
/// let members = Members::new()
///     .cell("count", count.clone())
///     .computed("double", double)
///     .action("increment", move |_, _| {
///         count.update(|v| *v = Value::from(v.as_i64().unwrap_or(0) + 1));
///         Ok(Outcome::ready(Value::Null))
///     });
/// assert_eq!(members.len(), 3);
/// ```
#[derive(Clone, Default, Debug)]
pub struct Members {
    entries: Vec<(String, Member)>,
}

impl Members {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh state cell holding `initial`.
    pub fn state(self, name: impl Into<String>, initial: impl Into<Value>) -> Self {
        self.cell(name, Cell::new(initial))
    }

    pub fn cell(self, name: impl Into<String>, cell: Cell) -> Self {
        self.with(name, Member::State(cell))
    }

    pub fn computed(self, name: impl Into<String>, computed: Computed) -> Self {
        self.with(name, Member::Computed(computed))
    }

    pub fn action<F>(self, name: impl Into<String>, action: F) -> Self
    where
        F: Fn(&Store, &[Value]) -> ActionResult + 'static,
    {
        self.with(name, Member::Action(Rc::new(action)))
    }

    pub fn plain(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(name, Member::Plain(value.into()))
    }

    pub fn with(mut self, name: impl Into<String>, member: Member) -> Self {
        self.insert(name, member);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, member: Member) {
        let name = name.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = member,
            None => self.entries.push((name, member)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Member> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, member)| member)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for Members {
    type Item = (String, Member);
    type IntoIter = std::vec::IntoIter<(String, Member)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Outcome;

    #[test]
    fn later_member_replaces_earlier() {
        let members = Members::new()
            .state("count", 0)
            .plain("count", "shadowed")
            .plain("label", "x");
        assert_eq!(members.len(), 2);
        assert_eq!(members.get("count").map(Member::kind), Some("plain"));
        assert_eq!(members.names().collect::<Vec<_>>(), vec!["count", "label"]);
    }

    #[test]
    fn kinds_are_tagged() {
        let members = Members::new()
            .state("a", 1)
            .computed("b", Computed::new(|| Value::Null))
            .action("c", |_, _| Ok(Outcome::ready(Value::Null)))
            .plain("d", true);
        let kinds: Vec<_> = members.into_iter().map(|(_, m)| m.kind()).collect();
        assert_eq!(kinds, vec!["state", "computed", "action", "plain"]);
    }
}
