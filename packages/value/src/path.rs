//! Key paths into a state tree.

use std::fmt;

use thiserror::Error;

/// Errors related to path parsing and validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// A path component is not a valid key.
    #[error("invalid path component '{component}' at position {position}: {message}")]
    InvalidComponent {
        component: String,
        position: usize,
        message: String,
    },
    /// The path string is invalid.
    #[error("invalid path: {message}")]
    InvalidPath { message: String },
}

/// A validated path into a [`Value`](crate::Value) tree.
///
/// Components are Unicode identifiers (per UAX#31) or numeric strings, which
/// address array elements. `a/b/0` names the first element of `b` inside `a`.
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Path {
    pub components: Vec<String>,
}

impl Path {
    /// Parse a slash-separated path, validating each component.
    ///
    /// Empty components are ignored, so `a//b/` and `a/b` are the same path.
    ///
    /// ```rust
    /// use depot_value::Path;
    ///
    /// let path = Path::parse("users/0/name").unwrap();
    /// assert_eq!(path.len(), 3);
    /// assert!(Path::parse("bad-key").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, PathError> {
        let components: Vec<String> = s
            .split('/')
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect();

        for (i, component) in components.iter().enumerate() {
            validate_component(component, i)?;
        }

        Ok(Path { components })
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.components.iter()
    }

    /// Split off the last component.
    pub(crate) fn split_last(&self) -> Option<(Path, &str)> {
        let (last, parent) = self.components.split_last()?;
        Some((
            Path {
                components: parent.to_vec(),
            },
            last.as_str(),
        ))
    }
}

/// Check that `component` is usable as a key: numeric, or an identifier.
pub(crate) fn validate_component(component: &str, position: usize) -> Result<(), PathError> {
    let invalid = |message: String| PathError::InvalidComponent {
        component: component.to_string(),
        position,
        message,
    };

    let mut chars = component.chars();
    let Some(first) = chars.next() else {
        return Err(invalid("empty component".to_string()));
    };

    if component.chars().all(|c| c.is_ascii_digit()) {
        return Ok(());
    }

    let valid_start = unicode_ident::is_xid_start(first)
        || (first == '_' && chars.clone().next().is_some_and(unicode_ident::is_xid_continue));
    if !valid_start {
        return Err(invalid(
            "must start with a letter or underscore followed by letter/digit".to_string(),
        ));
    }

    match chars.find(|c| !unicode_ident::is_xid_continue(*c)) {
        Some(c) => Err(invalid(format!("invalid character '{}' in identifier", c))),
        None => Ok(()),
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.components.join("/"))
    }
}

impl std::str::FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Path::parse(s)
    }
}

/// Build a [`Path`] from a literal, panicking on invalid input.
///
/// ```rust
/// use depot_value::path;
///
/// assert_eq!(path!("a/b").len(), 2);
/// ```
#[macro_export]
macro_rules! path {
    ($s:expr) => {
        $crate::Path::parse($s).expect("invalid path literal")
    };
}
