//! Classification sentinels and their hierarchy.

use std::any::TypeId;
use std::fmt;

use crate::node::{Cause, Error, ErrorId, Handle, Node};

/// Immutable classification marker, optionally parented by other sentinels.
///
/// A sentinel matches itself and, transitively, all of its ancestors. Its text
/// never shows up in the message of an error it classifies.
///
/// # Hierarchies must be acyclic
///
/// Matching recurses through the parents without cycle detection. A sentinel
/// graph that reaches itself through its parents makes [`Error::is`] recurse
/// without bound. Keeping the hierarchy a DAG is the caller's job.
///
/// ```
/// use errx_core::{Error, Sentinel};
///
/// let database = Sentinel::new("database error");
/// let timeout = Sentinel::with_parents("timeout", [&database]);
///
/// let err = Error::msg("deadline exceeded").classify([&timeout]);
/// assert!(err.is(&timeout));
/// assert!(err.is(&database));
/// assert_eq!(err.to_string(), "deadline exceeded");
/// ```
#[derive(Debug, Clone)]
pub struct Sentinel(Handle<SentinelNode>);

#[derive(Debug)]
pub(crate) struct SentinelNode {
    text: String,
    parents: Vec<Sentinel>,
}

impl Sentinel {
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_parents(text, Vec::<Sentinel>::new())
    }

    /// A sentinel matching itself and every sentinel in `parents` (in
    /// declaration order).
    pub fn with_parents<P>(text: impl Into<String>, parents: impl IntoIterator<Item = P>) -> Self
    where
        P: Into<Sentinel>,
    {
        Self(Handle::new(SentinelNode {
            text: text.into(),
            parents: parents.into_iter().map(Into::into).collect(),
        }))
    }

    pub fn text(&self) -> &str {
        &self.0.node().text
    }

    pub fn parents(&self) -> &[Sentinel] {
        &self.0.node().parents
    }

    pub fn as_error(&self) -> &Error {
        self.0.error()
    }

    /// Whether `target` is this sentinel or one of its ancestors.
    pub fn matches(&self, target: impl AsRef<Error>) -> bool {
        let target = target.as_ref();
        self.as_error().id() == target.id() || self.0.node().matches(target)
    }

    /// Typed search over the parents only; the sentinel itself is not a
    /// candidate here.
    pub fn unwrap_as<T: Node>(&self) -> Option<&T> {
        let any: &dyn std::any::Any = self.0.node().unwrap_as(TypeId::of::<T>())?;
        any.downcast_ref::<T>()
    }
}

impl SentinelNode {
    fn is_self(&self, target: &Error) -> bool {
        ErrorId::of(self) == target.id()
    }
}

impl fmt::Display for SentinelNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl Node for SentinelNode {
    fn cause(&self) -> Cause<'_> {
        match self.parents.first() {
            Some(parent) => Cause::Single(parent.as_error()),
            None => Cause::None,
        }
    }

    fn matches(&self, target: &Error) -> bool {
        self.is_self(target)
            || self
                .parents
                .iter()
                .any(|parent| parent.as_error().is(target))
    }

    fn unwrap_as(&self, target: TypeId) -> Option<&(dyn Node + 'static)> {
        self.parents
            .iter()
            .find_map(|parent| parent.as_error().find_by_type(target))
    }

    fn is_classified(&self) -> bool {
        true
    }
}

impl fmt::Display for Sentinel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

impl PartialEq for Sentinel {
    fn eq(&self, other: &Self) -> bool {
        self.as_error().id() == other.as_error().id()
    }
}

impl Eq for Sentinel {}

impl AsRef<Error> for Sentinel {
    fn as_ref(&self) -> &Error {
        self.as_error()
    }
}

impl From<&Sentinel> for Sentinel {
    fn from(sentinel: &Sentinel) -> Self {
        sentinel.clone()
    }
}

impl From<Sentinel> for Error {
    fn from(sentinel: Sentinel) -> Self {
        sentinel.as_error().clone()
    }
}
