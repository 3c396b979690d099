//! The error graph: the [`Error`] handle and the [`Node`] capability every
//! vertex of the graph implements.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use crate::carrier::Carrier;
use crate::traverse::Visited;

/// How a node unwraps to the next layer(s) of the graph.
#[derive(Debug, Clone, Copy)]
pub enum Cause<'a> {
    /// Leaf node, nothing underneath.
    None,
    /// Linear chain: exactly one wrapped error.
    Single(&'a Error),
    /// Aggregate ("multi-error") node: an ordered list of wrapped errors.
    Multi(&'a [Error]),
}

/// Capability implemented by every value that can sit in an error graph.
///
/// `Display` renders the node's message. Everything else has a default, so a
/// leaf error only needs `Display + Debug`:
///
/// ```
/// use std::fmt;
/// use errx_core::{Error, Node};
///
/// #[derive(Debug)]
/// struct Timeout;
///
/// impl fmt::Display for Timeout {
///     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
///         f.write_str("timeout")
///     }
/// }
///
/// impl Node for Timeout {}
///
/// let err = Error::new(Timeout);
/// assert_eq!(err.to_string(), "timeout");
/// assert!(err.find::<Timeout>().is_some());
/// ```
pub trait Node: fmt::Display + fmt::Debug + Send + Sync + Any {
    /// The wrapped error(s).
    fn cause(&self) -> Cause<'_> {
        Cause::None
    }

    /// Extra identity delegation consulted by [`Error::is`] after the plain
    /// identity check failed.
    fn matches(&self, _target: &Error) -> bool {
        false
    }

    /// Extra typed-search delegation consulted by [`Error::find`] after the
    /// node's own type did not match.
    fn unwrap_as(&self, _target: TypeId) -> Option<&(dyn Node + 'static)> {
        None
    }

    /// Marker for classification nodes (sentinels, displayables, attributes,
    /// traces and external enrichments). Plain errors keep the default.
    fn is_classified(&self) -> bool {
        false
    }
}

/// Identity of a node: the address of its shared allocation.
///
/// Two handles have the same id iff they point at the same node, regardless of
/// what the node contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ErrorId(usize);

impl ErrorId {
    pub(crate) fn of<T: ?Sized>(value: &T) -> Self {
        Self(value as *const T as *const () as usize)
    }
}

/// Shared, immutable handle to a node of the error graph.
///
/// Cloning is cheap and preserves identity.
#[derive(Clone)]
pub struct Error {
    node: Arc<dyn Node>,
}

impl Error {
    /// Wrap a custom node.
    pub fn new<N: Node>(node: N) -> Self {
        Self {
            node: Arc::new(node),
        }
    }

    pub(crate) fn from_arc(node: Arc<dyn Node>) -> Self {
        Self { node }
    }

    /// A leaf error carrying only a message.
    pub fn msg(text: impl Into<String>) -> Self {
        Self::new(Message(text.into()))
    }

    /// Adopt any standard error as an opaque leaf.
    pub fn from_std<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::new(Foreign(Box::new(err)))
    }

    /// Combine several errors into one aggregate node.
    ///
    /// Returns `None` when there is nothing to join.
    pub fn join(errors: impl IntoIterator<Item = Error>) -> Option<Self> {
        let members: Vec<Error> = errors.into_iter().collect();
        if members.is_empty() {
            return None;
        }
        Some(Self::new(Join(members)))
    }

    /// Prefix the message with `text`, as in `"text: cause"`.
    pub fn context(self, text: impl Into<String>) -> Self {
        Self::new(Context {
            text: text.into(),
            cause: self,
        })
    }

    pub fn id(&self) -> ErrorId {
        ErrorId::of(&*self.node)
    }

    pub fn node(&self) -> &(dyn Node + 'static) {
        &*self.node
    }

    pub fn cause(&self) -> Cause<'_> {
        self.node.cause()
    }

    pub fn is_classified(&self) -> bool {
        self.node.is_classified()
    }

    /// Whether `target` occurs anywhere along this error's identity chain.
    ///
    /// At every node the identity is compared first, then the node's
    /// [`Node::matches`] hook, then the walk follows [`Node::cause`]: a single
    /// cause continues the chain, an aggregate matches if any member does.
    /// A node already seen in this walk ends that branch, so cyclic unwrap
    /// chains terminate.
    pub fn is(&self, target: impl AsRef<Error>) -> bool {
        let mut visited = Visited::new();
        is_in(self, target.as_ref(), &mut visited)
    }

    /// First node of concrete type `T` along the chain, honouring
    /// [`Node::unwrap_as`] delegation.
    pub fn find<T: Node>(&self) -> Option<&T> {
        self.find_by_type(TypeId::of::<T>()).and_then(downcast::<T>)
    }

    /// Untyped form of [`Error::find`], for [`Node::unwrap_as`] implementations.
    pub fn find_by_type(&self, target: TypeId) -> Option<&(dyn Node + 'static)> {
        let mut visited = Visited::new();
        find_in(self, target, &mut visited)
    }

    /// This node itself as `T`, without walking.
    pub fn downcast_ref<T: Node>(&self) -> Option<&T> {
        downcast(self.node())
    }

    pub fn as_carrier(&self) -> Option<&Carrier> {
        self.downcast_ref()
    }
}

fn downcast<'a, T: Node>(node: &'a (dyn Node + 'static)) -> Option<&'a T> {
    let any: &dyn Any = node;
    any.downcast_ref::<T>()
}

fn is_in(err: &Error, target: &Error, visited: &mut Visited) -> bool {
    let mut current = err;
    loop {
        if !visited.insert(current) {
            return false;
        }
        if current.id() == target.id() {
            return true;
        }
        // carrier layers are expanded here so one visited set covers them
        if let Some(carrier) = current.as_carrier() {
            let classified = carrier
                .classifications()
                .iter()
                .any(|classification| is_in(classification.as_error(), target, visited));
            if classified {
                return true;
            }
        } else if current.node.matches(target) {
            return true;
        }
        match current.cause() {
            Cause::None => return false,
            Cause::Single(next) => current = next,
            Cause::Multi(members) => {
                return members.iter().any(|member| is_in(member, target, visited));
            }
        }
    }
}

fn find_in<'a>(
    err: &'a Error,
    target: TypeId,
    visited: &mut Visited,
) -> Option<&'a (dyn Node + 'static)> {
    let mut current = err;
    loop {
        if !visited.insert(current) {
            return None;
        }
        let node = current.node();
        let any: &dyn Any = node;
        if any.type_id() == target {
            return Some(node);
        }
        if let Some(carrier) = current.as_carrier() {
            return find_in(carrier.wrapped(), target, visited).or_else(|| {
                carrier
                    .classifications()
                    .iter()
                    .find_map(|classification| find_in(classification.as_error(), target, visited))
            });
        }
        if let Some(found) = node.unwrap_as(target) {
            return Some(found);
        }
        match current.cause() {
            Cause::None => return None,
            Cause::Single(next) => current = next,
            Cause::Multi(members) => {
                return members
                    .iter()
                    .find_map(|member| find_in(member, target, visited));
            }
        }
    }
}

impl AsRef<Error> for Error {
    fn as_ref(&self) -> &Error {
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.node, f)
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.node, f)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self.cause() {
            Cause::Single(next) => Some(next),
            Cause::None | Cause::Multi(_) => None,
        }
    }
}

/// Typed handle over a node whose concrete type the crate knows.
///
/// Keeps the typed `Arc` next to the erased [`Error`] so both views share one
/// allocation, and therefore one identity.
pub(crate) struct Handle<N: Node> {
    node: Arc<N>,
    error: Error,
}

impl<N: Node> Handle<N> {
    pub(crate) fn new(node: N) -> Self {
        let node = Arc::new(node);
        let error = Error::from_arc(node.clone());
        Self { node, error }
    }

    pub(crate) fn node(&self) -> &N {
        &self.node
    }

    pub(crate) fn error(&self) -> &Error {
        &self.error
    }
}

impl<N: Node> Clone for Handle<N> {
    fn clone(&self) -> Self {
        Self {
            node: self.node.clone(),
            error: self.error.clone(),
        }
    }
}

impl<N: Node> fmt::Debug for Handle<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.node, f)
    }
}

#[derive(Debug)]
struct Message(String);

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Node for Message {}

#[derive(Debug)]
struct Context {
    text: String,
    cause: Error,
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.text, self.cause)
    }
}

impl Node for Context {
    fn cause(&self) -> Cause<'_> {
        Cause::Single(&self.cause)
    }
}

#[derive(Debug)]
struct Join(Vec<Error>);

impl fmt::Display for Join {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, member) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{member}")?;
        }
        Ok(())
    }
}

impl Node for Join {
    fn cause(&self) -> Cause<'_> {
        Cause::Multi(&self.0)
    }
}

#[derive(Debug)]
struct Foreign(Box<dyn std::error::Error + Send + Sync>);

impl fmt::Display for Foreign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Node for Foreign {}
