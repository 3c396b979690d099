//! User-facing messages.

use std::fmt;

use crate::node::{Error, Handle, Node};

/// Classification marker carrying text that is safe to show to end users.
///
/// ```
/// use errx_core::{display_text, Displayable, Error};
///
/// let err = Error::from(Displayable::new("Invalid email format")).context("validation failed");
/// assert_eq!(err.to_string(), "validation failed: Invalid email format");
/// assert_eq!(display_text(&err), "Invalid email format");
/// ```
#[derive(Debug, Clone)]
pub struct Displayable(Handle<DisplayableNode>);

#[derive(Debug)]
pub(crate) struct DisplayableNode {
    text: String,
}

impl Displayable {
    pub fn new(text: impl Into<String>) -> Self {
        Self(Handle::new(DisplayableNode { text: text.into() }))
    }

    pub fn text(&self) -> &str {
        &self.0.node().text
    }

    pub fn as_error(&self) -> &Error {
        self.0.error()
    }
}

impl fmt::Display for DisplayableNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl Node for DisplayableNode {
    fn is_classified(&self) -> bool {
        true
    }
}

impl fmt::Display for Displayable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

impl AsRef<Error> for Displayable {
    fn as_ref(&self) -> &Error {
        self.as_error()
    }
}

impl From<Displayable> for Error {
    fn from(displayable: Displayable) -> Self {
        displayable.as_error().clone()
    }
}

fn first_displayable(err: &Error) -> Option<&DisplayableNode> {
    err.find::<DisplayableNode>()
}

/// Whether a displayable message is reachable along the unwrap chain,
/// including through carrier classifications.
pub fn is_displayable<'a>(err: impl Into<Option<&'a Error>>) -> bool {
    err.into().and_then(first_displayable).is_some()
}

/// The first displayable message found along the chain, or the full message
/// of `err` when there is none. Empty for a missing error.
///
/// When several displayables are reachable, the first one in traversal order
/// wins; that order is not a precedence rule.
pub fn display_text<'a>(err: impl Into<Option<&'a Error>>) -> String {
    let Some(err) = err.into() else {
        return String::new();
    };
    match first_displayable(err) {
        Some(node) => node.text.clone(),
        None => err.to_string(),
    }
}

/// Like [`display_text`], but falls back to `fallback` instead of the full
/// message. A missing error still yields an empty string.
pub fn display_text_or<'a>(err: impl Into<Option<&'a Error>>, fallback: &str) -> String {
    let Some(err) = err.into() else {
        return String::new();
    };
    match first_displayable(err) {
        Some(node) => node.text.clone(),
        None => fallback.to_string(),
    }
}
