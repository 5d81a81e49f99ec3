//! The Value type - the tree every store slice is made of.

use std::collections::BTreeMap;

use crate::{Error, Path};

/// A dynamically-typed state tree.
///
/// Maps directly onto JSON.
///
/// # Design Notes
///
/// - Uses `BTreeMap` for deterministic key order (snapshots compare and
///   serialize stably)
/// - `Map` and `Array` are the "structured" variants; the merge recurses
///   into them and overwrites everything else
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    /// Absence of a value.
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Create an empty map.
    pub fn map() -> Self {
        Value::Map(BTreeMap::new())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut BTreeMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Look up a direct child of a map.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.as_map()?.get(key)
    }

    /// Get a reference to a nested value by path.
    ///
    /// Returns `None` if the path doesn't exist or runs through a leaf.
    pub fn get(&self, path: &Path) -> Option<&Value> {
        path.iter().try_fold(self, |current, component| match current {
            Value::Map(map) => map.get(component),
            Value::Array(arr) => arr.get(component.parse::<usize>().ok()?),
            _ => None,
        })
    }

    /// Get a mutable reference to a nested value by path.
    pub fn get_mut(&mut self, path: &Path) -> Option<&mut Value> {
        let mut current = self;
        for component in path.iter() {
            current = match current {
                Value::Map(map) => map.get_mut(component)?,
                Value::Array(arr) => arr.get_mut(component.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Set a value at a path, creating intermediate maps as needed.
    ///
    /// # Errors
    ///
    /// Fails when the path runs through a leaf or an array index is out of
    /// bounds.
    pub fn set(&mut self, path: &Path, value: Value) -> Result<(), Error> {
        let Some((parent_path, last)) = path.split_last() else {
            *self = value;
            return Ok(());
        };

        let mut current = self;
        for component in parent_path.iter() {
            if current.is_null() {
                *current = Value::map();
            }
            current = match current {
                Value::Map(map) => map.entry(component.clone()).or_insert(Value::Null),
                Value::Array(arr) => {
                    let index = parse_index(component)?;
                    arr.get_mut(index).ok_or_else(|| Error::InvalidPath {
                        message: format!("array index {} out of bounds", index),
                    })?
                }
                _ => {
                    return Err(Error::InvalidPath {
                        message: format!("cannot navigate through leaf at '{}'", component),
                    })
                }
            };
        }

        if current.is_null() {
            *current = Value::map();
        }
        match current {
            Value::Map(map) => {
                map.insert(last.to_string(), value);
                Ok(())
            }
            Value::Array(arr) => {
                let index = parse_index(last)?;
                if index < arr.len() {
                    arr[index] = value;
                } else if index == arr.len() {
                    arr.push(value);
                } else {
                    return Err(Error::InvalidPath {
                        message: format!("array index {} out of bounds", index),
                    });
                }
                Ok(())
            }
            _ => Err(Error::InvalidPath {
                message: format!("cannot set child '{}' on a leaf", last),
            }),
        }
    }

    /// Remove a value at a path, returning it if it existed.
    pub fn remove(&mut self, path: &Path) -> Option<Value> {
        let Some((parent_path, last)) = path.split_last() else {
            return Some(std::mem::take(self));
        };

        match self.get_mut(&parent_path)? {
            Value::Map(map) => map.remove(last),
            Value::Array(arr) => {
                let index = last.parse::<usize>().ok()?;
                (index < arr.len()).then(|| arr.remove(index))
            }
            _ => None,
        }
    }
}

fn parse_index(component: &str) -> Result<usize, Error> {
    component.parse().map_err(|_| Error::InvalidPath {
        message: format!("invalid array index: {}", component),
    })
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(v: BTreeMap<String, Value>) -> Self {
        Value::Map(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path;

    #[test]
    fn get_nested_value() {
        let mut value = Value::map();
        value.set(&path!("foo/bar"), Value::from("hello")).unwrap();

        assert_eq!(value.get(&path!("foo/bar")), Some(&Value::from("hello")));
        assert!(value.get(&path!("foo")).unwrap().is_map());
        assert_eq!(value.get(&path!("nonexistent")), None);
    }

    #[test]
    fn set_creates_intermediate_maps() {
        let mut value = Value::Null;
        value.set(&path!("a/b/c"), Value::from(42i64)).unwrap();

        assert_eq!(value.get(&path!("a/b/c")), Some(&Value::from(42i64)));
        assert!(value.get(&path!("a/b")).unwrap().is_map());
    }

    #[test]
    fn set_through_leaf_fails() {
        let mut value = Value::map();
        value.set(&path!("leaf"), Value::from(1)).unwrap();
        assert!(value.set(&path!("leaf/child"), Value::from(2)).is_err());
    }

    #[test]
    fn array_access_and_append() {
        let mut value = Value::map();
        value
            .set(&path!("items"), Value::from(vec![Value::from("a")]))
            .unwrap();
        value.set(&path!("items/1"), Value::from("b")).unwrap();

        assert_eq!(value.get(&path!("items/1")), Some(&Value::from("b")));
        assert!(value.set(&path!("items/5"), Value::from("x")).is_err());
    }

    #[test]
    fn remove_works() {
        let mut value = Value::map();
        value.set(&path!("foo/bar"), Value::from("hello")).unwrap();

        assert_eq!(value.remove(&path!("foo/bar")), Some(Value::from("hello")));
        assert_eq!(value.get(&path!("foo/bar")), None);
        assert!(value.get(&path!("foo")).is_some());
        assert_eq!(value.remove(&path!("missing/key")), None);
    }

    #[test]
    fn numeric_views() {
        assert_eq!(Value::from(2.5).as_i64(), None);
        assert_eq!(Value::from(Some("x")), Value::from("x"));
        assert_eq!(Value::from(None::<i64>), Value::Null);
    }
}
