//! Structured key/value context attached to errors.

use std::fmt;
use std::ops::Deref;

use serde::Serialize;
use serde_json::Value;

use crate::node::{Error, Handle, Node};
use crate::traverse;

/// A single key/value pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attr {
    pub key: String,
    pub value: Value,
}

impl Attr {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Attr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Value::String(text) => write!(f, "{}={}", self.key, text),
            other => write!(f, "{}={}", self.key, other),
        }
    }
}

/// Ordered attribute list. Duplicate keys are kept as they are.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AttrList(Vec<Attr>);

impl AttrList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of the first attribute named `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0
            .iter()
            .find(|attr| attr.key == key)
            .map(|attr| &attr.value)
    }

    /// Collapse into a map; for repeated keys the last value wins.
    pub fn to_map(&self) -> serde_json::Map<String, Value> {
        self.0
            .iter()
            .map(|attr| (attr.key.clone(), attr.value.clone()))
            .collect()
    }

    pub fn into_vec(self) -> Vec<Attr> {
        self.0
    }

    /// Record the list as one `tracing` field rendered as `k=v k2=v2`.
    ///
    /// ```
    /// use errx_core::{attrs, extract_attrs, Error};
    ///
    /// let err = Error::msg("denied").wrap("delete failed", [attrs!("user_id" => 7)]);
    /// tracing::error!(attrs = extract_attrs(&err).as_field(), "{err}");
    /// ```
    pub fn as_field(&self) -> tracing::field::DisplayValue<&Self> {
        tracing::field::display(self)
    }
}

impl Deref for AttrList {
    type Target = [Attr];

    fn deref(&self) -> &[Attr] {
        &self.0
    }
}

impl fmt::Display for AttrList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, attr) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{attr}")?;
        }
        Ok(())
    }
}

impl From<Vec<Attr>> for AttrList {
    fn from(attrs: Vec<Attr>) -> Self {
        Self(attrs)
    }
}

impl FromIterator<Attr> for AttrList {
    fn from_iter<I: IntoIterator<Item = Attr>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<Attr> for AttrList {
    fn extend<I: IntoIterator<Item = Attr>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl IntoIterator for AttrList {
    type Item = Attr;
    type IntoIter = std::vec::IntoIter<Attr>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a AttrList {
    type Item = &'a Attr;
    type IntoIter = std::slice::Iter<'a, Attr>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Classification marker carrying structured attributes.
///
/// Usually attached through [`Error::wrap`] or [`Error::classify`]; on its own
/// its message is just the rendered attribute list.
///
/// ```
/// use errx_core::{attrs, extract_attrs, Error};
///
/// let err = Error::msg("permission denied").wrap("failed to delete user", [attrs!("user_id" => 123, "action" => "delete")]);
/// assert_eq!(err.to_string(), "failed to delete user: permission denied");
/// assert_eq!(extract_attrs(&err).to_string(), "user_id=123 action=delete");
/// ```
#[derive(Debug, Clone)]
pub struct Attributed(Handle<AttributedNode>);

#[derive(Debug)]
pub(crate) struct AttributedNode {
    attrs: AttrList,
}

impl Attributed {
    pub fn new(attrs: impl IntoIterator<Item = Attr>) -> Self {
        Self(Handle::new(AttributedNode {
            attrs: attrs.into_iter().collect(),
        }))
    }

    /// Build from key/value pairs, in the iteration order of `map`.
    ///
    /// A `HashMap` therefore yields an unspecified order; use a `BTreeMap`
    /// or [`Attributed::new`] when the order matters.
    pub fn from_map<K, V>(map: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Self::new(map.into_iter().map(|(key, value)| Attr::new(key, value)))
    }

    pub fn attrs(&self) -> &AttrList {
        &self.0.node().attrs
    }

    pub fn as_error(&self) -> &Error {
        self.0.error()
    }
}

impl fmt::Display for AttributedNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.attrs.is_empty() {
            return f.write_str("(empty attribute list)");
        }
        fmt::Display::fmt(&self.attrs, f)
    }
}

impl Node for AttributedNode {
    fn is_classified(&self) -> bool {
        true
    }
}

impl fmt::Display for Attributed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.0.node(), f)
    }
}

impl AsRef<Error> for Attributed {
    fn as_ref(&self) -> &Error {
        self.as_error()
    }
}

impl From<Attributed> for Error {
    fn from(attributed: Attributed) -> Self {
        attributed.as_error().clone()
    }
}

/// Build an [`Attributed`] from `key => value` pairs.
///
/// ```
/// use errx_core::attrs;
///
/// let attributed = attrs!("user_id" => 42, "retry" => true);
/// assert_eq!(attributed.to_string(), "user_id=42 retry=true");
/// ```
#[macro_export]
macro_rules! attrs {
    ($($key:expr => $value:expr),* $(,)?) => {
        $crate::Attributed::new([$($crate::Attr::new($key, $value)),*])
    };
}

/// Whether an attributed node is reachable along the unwrap chain.
pub fn has_attrs<'a>(err: impl Into<Option<&'a Error>>) -> bool {
    err.into()
        .and_then(|err| err.find::<AttributedNode>())
        .is_some()
}

/// Every attribute reachable from `err`, in breadth-first discovery order.
///
/// Each attributed node contributes once even if it is reachable along
/// several paths; distinct nodes with equal content all contribute. The order
/// is stable for a given graph but carries no precedence meaning.
pub fn extract_attrs<'a>(err: impl Into<Option<&'a Error>>) -> AttrList {
    let mut all = AttrList::new();
    let Some(err) = err.into() else {
        return all;
    };
    traverse::walk(err, |node| {
        if let Some(attributed) = node.downcast_ref::<AttributedNode>() {
            all.extend(attributed.attrs.iter().cloned());
        }
    });
    all
}
