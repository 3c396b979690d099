//! Tree-shaped JSON view of an error graph.

use std::io;

use errx_core::traverse::Visited;
use errx_core::{
    display_text, extract_attrs, frames, has_attrs, is_displayable, Attr, Cause, Classification,
    Error, Frame,
};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use tracing::trace;

use crate::{Result, SerializeOptions};

/// Message of the node that replaces everything below the depth limit.
pub const MAX_DEPTH_REACHED: &str = "(max depth reached)";
/// Message of the node that replaces an error already serialized on this path.
pub const CIRCULAR_REFERENCE: &str = "(circular reference)";

/// Nested carriers below a node whose sentinels are reported on that node.
const CARRIER_LOOKAHEAD: usize = 2;

/// One node of the serialized tree.
///
/// `cause` and `causes` are never both set: aggregate errors list their
/// members in `causes`, everything else has at most one `cause`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SerializedError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sentinels: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<SerializedAttr>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stack_trace: Vec<SerializedFrame>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<Box<SerializedError>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub causes: Vec<SerializedError>,
}

impl SerializedError {
    fn marker(message: &str) -> Self {
        Self {
            message: message.to_string(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SerializedAttr {
    pub key: String,
    pub value: Value,
}

impl From<&Attr> for SerializedAttr {
    fn from(attr: &Attr) -> Self {
        Self {
            key: attr.key.clone(),
            value: attr.value.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SerializedFrame {
    pub file: String,
    pub line: u32,
    pub function: String,
}

impl From<&Frame> for SerializedFrame {
    fn from(frame: &Frame) -> Self {
        Self {
            file: frame.file.clone(),
            line: frame.line,
            function: frame.function.clone(),
        }
    }
}

struct TreeBuilder {
    options: SerializeOptions,
    visited: Visited,
}

impl TreeBuilder {
    fn new(options: SerializeOptions) -> Self {
        Self {
            options,
            visited: Visited::new(),
        }
    }

    fn build(&mut self, err: &Error, depth: usize) -> SerializedError {
        if depth >= self.options.max_depth {
            trace!(depth, max_depth = self.options.max_depth, "max depth reached");
            return SerializedError::marker(MAX_DEPTH_REACHED);
        }
        if !self.visited.insert(err) {
            trace!(depth, "circular reference");
            return SerializedError::marker(CIRCULAR_REFERENCE);
        }

        let mut node = SerializedError {
            message: err.to_string(),
            display_text: is_displayable(err)
                .then(|| display_text(err))
                .filter(|text| !text.is_empty()),
            sentinels: sentinels(err),
            attributes: extract_attrs(err).iter().map(SerializedAttr::from).collect(),
            stack_trace: self.stack_trace(err),
            ..SerializedError::default()
        };

        match err.cause() {
            Cause::None => {}
            Cause::Single(next) => {
                let next = match next.as_carrier() {
                    Some(carrier) => {
                        trace!(depth, "skipping carrier");
                        carrier.wrapped()
                    }
                    None => next,
                };
                if self.included(next) {
                    node.cause = Some(Box::new(self.build(next, depth + 1)));
                }
            }
            Cause::Multi(members) => {
                for member in members {
                    if self.included(member) {
                        let serialized = self.build(member, depth + 1);
                        node.causes.push(serialized);
                    }
                }
            }
        }

        node
    }

    fn included(&self, err: &Error) -> bool {
        self.options.include_standard_errors || err.is_classified()
    }

    fn stack_trace(&self, err: &Error) -> Vec<SerializedFrame> {
        let Some(frames) = frames(err) else {
            return Vec::new();
        };
        let limit = match self.options.max_stack_frames {
            0 => frames.len(),
            max => max.min(frames.len()),
        };
        frames[..limit].iter().map(SerializedFrame::from).collect()
    }
}

/// A classification with no payload: nothing to display, no attributes and
/// no stack trace.
fn is_pure(err: &Error) -> bool {
    !is_displayable(err) && !has_attrs(err) && frames(err).is_none()
}

fn push_unique(texts: &mut Vec<String>, text: String) {
    if !texts.contains(&text) {
        texts.push(text);
    }
}

fn push_pure(texts: &mut Vec<String>, classifications: &[Classification]) {
    for classification in classifications {
        if is_pure(classification.as_error()) {
            push_unique(texts, classification.to_string());
        }
    }
}

/// Sentinel texts reported for `err` itself.
///
/// Covers its own carrier layer, the carriers directly below it (which is
/// where `wrap` puts them) and `err` when it is a pure classification. The
/// rest of the chain reports its sentinels on its own nodes.
fn sentinels(err: &Error) -> Vec<String> {
    let mut texts = Vec::new();

    if let Some(carrier) = err.as_carrier() {
        push_pure(&mut texts, carrier.classifications());
    }

    let mut current = err;
    for _ in 0..CARRIER_LOOKAHEAD {
        let Cause::Single(next) = current.cause() else {
            break;
        };
        let Some(carrier) = next.as_carrier() else {
            break;
        };
        push_pure(&mut texts, carrier.classifications());
        current = next;
    }

    if err.is_classified() && is_pure(err) {
        push_unique(&mut texts, err.to_string());
    }

    texts
}

/// Build the serialized tree; `None` for a missing error.
pub fn to_serialized<'a>(
    err: impl Into<Option<&'a Error>>,
    options: SerializeOptions,
) -> Option<SerializedError> {
    let err = err.into()?;
    Some(TreeBuilder::new(options).build(err, 0))
}

/// Compact JSON bytes; `None` for a missing error.
pub fn to_vec<'a>(
    err: impl Into<Option<&'a Error>>,
    options: SerializeOptions,
) -> Result<Option<Vec<u8>>> {
    let Some(tree) = to_serialized(err, options) else {
        return Ok(None);
    };
    let bytes = serde_json::to_vec(&tree)
        .map_err(|e| crate::Error::from(e).with_operation("json::to_vec"))?;
    Ok(Some(bytes))
}

/// Pretty-printed JSON bytes using `indent` for each nesting level.
///
/// Only the indent is configurable; lines get no leading prefix. Prepend one
/// to each line of the output if a prefix is needed.
pub fn to_vec_indent<'a>(
    err: impl Into<Option<&'a Error>>,
    indent: &str,
    options: SerializeOptions,
) -> Result<Option<Vec<u8>>> {
    let Some(tree) = to_serialized(err, options) else {
        return Ok(None);
    };
    let mut bytes = Vec::new();
    let formatter = PrettyFormatter::with_indent(indent.as_bytes());
    let mut serializer = serde_json::Serializer::with_formatter(&mut bytes, formatter);
    tree.serialize(&mut serializer)
        .map_err(|e| crate::Error::from(e).with_operation("json::to_vec_indent"))?;
    Ok(Some(bytes))
}

/// Compact JSON text; `None` for a missing error.
pub fn to_string<'a>(
    err: impl Into<Option<&'a Error>>,
    options: SerializeOptions,
) -> Result<Option<String>> {
    let Some(tree) = to_serialized(err, options) else {
        return Ok(None);
    };
    let text = serde_json::to_string(&tree)
        .map_err(|e| crate::Error::from(e).with_operation("json::to_string"))?;
    Ok(Some(text))
}

/// JSON text indented by two spaces; `None` for a missing error.
pub fn to_string_pretty<'a>(
    err: impl Into<Option<&'a Error>>,
    options: SerializeOptions,
) -> Result<Option<String>> {
    let Some(tree) = to_serialized(err, options) else {
        return Ok(None);
    };
    let text = serde_json::to_string_pretty(&tree)
        .map_err(|e| crate::Error::from(e).with_operation("json::to_string_pretty"))?;
    Ok(Some(text))
}

/// Write compact JSON to `writer`.
///
/// Returns whether anything was written: a missing error writes nothing.
pub fn to_writer<'a, W: io::Write>(
    writer: W,
    err: impl Into<Option<&'a Error>>,
    options: SerializeOptions,
) -> Result<bool> {
    let Some(tree) = to_serialized(err, options) else {
        return Ok(false);
    };
    serde_json::to_writer(writer, &tree)
        .map_err(|e| crate::Error::from(e).with_operation("json::to_writer"))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use errx_core::{attrs, Displayable, Sentinel, Traced};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_pure_classifications() {
        assert!(is_pure(Sentinel::new("tag").as_error()));
        assert!(!is_pure(Displayable::new("shown").as_error()));
        assert!(!is_pure(attrs!("k" => 1).as_error()));
        assert!(!is_pure(Traced::new(vec![Frame::new("a.rs", 1, "a")]).as_error()));
        // an empty trace carries no frames
        assert!(is_pure(Traced::new(Vec::new()).as_error()));
    }

    #[test]
    fn test_sentinels_deduplicated_by_text() {
        let first = Sentinel::new("dup");
        let second = Sentinel::new("dup");
        let err = Error::msg("base").classify([&first, &second]);
        assert_eq!(sentinels(&err), vec!["dup".to_string()]);
    }

    #[test]
    fn test_sentinels_look_two_carriers_deep() {
        let one = Sentinel::new("one");
        let two = Sentinel::new("two");
        let three = Sentinel::new("three");
        let err = Error::msg("base")
            .classify([&three])
            .classify([&two])
            .classify([&one])
            .context("top");

        // top -> carrier(one) -> carrier(two) -> carrier(three)
        assert_eq!(sentinels(&err), vec!["one".to_string(), "two".to_string()]);
    }

    #[test]
    fn test_pure_sentinel_reports_itself() {
        let tag = Sentinel::new("tag");
        assert_eq!(sentinels(tag.as_error()), vec!["tag".to_string()]);
        assert!(sentinels(&Error::msg("plain")).is_empty());
    }

    #[test]
    fn test_stack_trace_limit() {
        let traced = Traced::new(
            (1..=5)
                .map(|line| Frame::new("a.rs", line, "a::f"))
                .collect(),
        );
        let err = Error::msg("boom").classify([traced]);

        let limited = TreeBuilder::new(SerializeOptions::default().with_max_stack_frames(2));
        assert_eq!(limited.stack_trace(&err).len(), 2);

        let unlimited = TreeBuilder::new(SerializeOptions::default().with_max_stack_frames(0));
        assert_eq!(unlimited.stack_trace(&err).len(), 5);
    }
}
