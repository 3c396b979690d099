//! Captured call stacks.
//!
//! The core only stores frames; walking the stack is left to a
//! [`StackSource`] (see the `errx-stack` crate).

use std::fmt;
use std::sync::OnceLock;

use serde::Serialize;

use crate::node::{Error, Handle, Node};

/// One call-stack entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Frame {
    pub file: String,
    pub line: u32,
    pub function: String,
}

impl Frame {
    pub fn new(file: impl Into<String>, line: u32, function: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line,
            function: function.into(),
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} {}", self.file, self.line, self.function)
    }
}

/// Something that can turn a captured stack into frames on demand.
pub trait StackSource: fmt::Debug + Send + Sync + 'static {
    fn resolve(&self) -> Vec<Frame>;
}

/// Classification marker carrying a call stack.
///
/// Frames from a [`StackSource`] are resolved the first time they are read
/// and cached afterwards.
#[derive(Debug, Clone)]
pub struct Traced(Handle<TracedNode>);

#[derive(Debug)]
pub(crate) struct TracedNode {
    source: Option<Box<dyn StackSource>>,
    frames: OnceLock<Vec<Frame>>,
}

impl TracedNode {
    fn frames(&self) -> &[Frame] {
        self.frames.get_or_init(|| {
            self.source
                .as_ref()
                .map(|source| source.resolve())
                .unwrap_or_default()
        })
    }
}

impl Traced {
    /// A trace from frames that are already resolved.
    pub fn new(frames: Vec<Frame>) -> Self {
        Self(Handle::new(TracedNode {
            source: None,
            frames: OnceLock::from(frames),
        }))
    }

    /// A trace whose frames are produced by `source` when first needed.
    pub fn deferred(source: impl StackSource) -> Self {
        Self(Handle::new(TracedNode {
            source: Some(Box::new(source)),
            frames: OnceLock::new(),
        }))
    }

    pub fn frames(&self) -> &[Frame] {
        self.0.node().frames()
    }

    pub fn as_error(&self) -> &Error {
        self.0.error()
    }
}

impl fmt::Display for TracedNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.frames().len() {
            0 => f.write_str("(empty stack trace)"),
            n => write!(f, "stack trace: {n} frames"),
        }
    }
}

impl Node for TracedNode {
    fn is_classified(&self) -> bool {
        true
    }
}

impl fmt::Display for Traced {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.0.node(), f)
    }
}

impl AsRef<Error> for Traced {
    fn as_ref(&self) -> &Error {
        self.as_error()
    }
}

impl From<Traced> for Error {
    fn from(traced: Traced) -> Self {
        traced.as_error().clone()
    }
}

/// Frames of the first trace found along the unwrap chain.
///
/// `None` for a missing error, when no trace is attached, or when the first
/// trace found holds no frames.
pub fn frames<'a>(err: impl Into<Option<&'a Error>>) -> Option<&'a [Frame]> {
    let frames = err.into()?.find::<TracedNode>()?.frames();
    (!frames.is_empty()).then_some(frames)
}
