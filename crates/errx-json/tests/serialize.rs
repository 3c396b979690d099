use std::fmt;
use std::io;
use std::sync::OnceLock;

use errx_core::{attrs, Cause, Classification, Displayable, Error, Node, Sentinel};
use errx_json::{
    ErrorKind, SerializeOptions, SerializedError, CIRCULAR_REFERENCE, MAX_DEPTH_REACHED,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn to_value(err: &Error, options: SerializeOptions) -> Value {
    let bytes = errx_json::to_vec(err, options).unwrap().unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Node whose only cause is itself once linked.
#[derive(Debug)]
struct SelfLoop {
    next: OnceLock<Error>,
}

impl fmt::Display for SelfLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("self loop")
    }
}

impl Node for SelfLoop {
    fn cause(&self) -> Cause<'_> {
        self.next.get().map_or(Cause::None, Cause::Single)
    }
}

fn self_loop() -> Error {
    let err = Error::new(SelfLoop {
        next: OnceLock::new(),
    });
    if let Some(node) = err.downcast_ref::<SelfLoop>() {
        let _ = node.next.set(err.clone());
    }
    err
}

#[test]
fn test_missing_error_serializes_to_none() {
    let options = SerializeOptions::default();
    assert!(errx_json::to_serialized(None, options).is_none());
    assert!(errx_json::to_vec(None, options).unwrap().is_none());
    assert!(errx_json::to_string_pretty(None, options).unwrap().is_none());

    let mut out = Vec::new();
    assert!(!errx_json::to_writer(&mut out, None, options).unwrap());
    assert!(out.is_empty());
}

#[test]
fn test_displayable_cause_pretty() {
    let not_found = Sentinel::new("not found");
    let err = Error::from(Displayable::new("User not found")).wrap("lookup failed", [&not_found]);

    let text = errx_json::to_string_pretty(&err, SerializeOptions::default())
        .unwrap()
        .unwrap();
    let expected = r#"{
  "message": "lookup failed: User not found",
  "display_text": "User not found",
  "sentinels": [
    "not found"
  ],
  "cause": {
    "message": "User not found",
    "display_text": "User not found"
  }
}"#;
    assert_eq!(text, expected);
}

#[test]
fn test_custom_indent() {
    let err = Error::msg("boom");
    let bytes = errx_json::to_vec_indent(&err, "\t", SerializeOptions::default())
        .unwrap()
        .unwrap();
    assert_eq!(String::from_utf8(bytes).unwrap(), "{\n\t\"message\": \"boom\"\n}");
}

#[test]
fn test_attributes_and_sentinels_on_classified_node() {
    let database = Sentinel::new("database");
    let err = Error::msg("operation failed").classify([
        Classification::from(attrs!("user_id" => 12345, "action" => "delete")),
        Classification::from(&database),
    ]);

    assert_eq!(
        to_value(&err, SerializeOptions::default()),
        json!({
            "message": "operation failed",
            "sentinels": ["database"],
            "attributes": [
                {"key": "user_id", "value": 12345},
                {"key": "action", "value": "delete"},
            ],
            "cause": {"message": "operation failed"},
        })
    );
}

#[test]
fn test_chain_reports_sentinels_where_attached() {
    let database = Sentinel::new("database");
    let not_found = Sentinel::new("not found");
    let err = Error::msg("root cause")
        .wrap("middle layer", [&database])
        .wrap("top layer", [&not_found]);

    assert_eq!(
        to_value(&err, SerializeOptions::default()),
        json!({
            "message": "top layer: middle layer: root cause",
            "sentinels": ["not found"],
            "cause": {
                "message": "middle layer: root cause",
                "sentinels": ["database"],
                "cause": {"message": "root cause"},
            },
        })
    );
}

#[test]
fn test_self_reference_is_circular() {
    let tree = errx_json::to_serialized(&self_loop(), SerializeOptions::default()).unwrap();
    assert_eq!(tree.message, "self loop");
    let cause = tree.cause.unwrap();
    assert_eq!(cause.message, CIRCULAR_REFERENCE);
    assert!(cause.cause.is_none());
}

#[test]
fn test_cycle_below_carrier_terminates() {
    let attrs = attrs!("test" => "value");
    let err = self_loop().wrap("context", [attrs]);

    let value = to_value(&err, SerializeOptions::default());
    assert_eq!(value["message"], json!("context: self loop"));
    assert_eq!(value["attributes"], json!([{"key": "test", "value": "value"}]));
    assert_eq!(value["cause"]["message"], json!("self loop"));
    assert_eq!(value["cause"]["cause"]["message"], json!(CIRCULAR_REFERENCE));
}

#[test]
fn test_depth_limit_on_five_levels() {
    let mut err = Error::msg("level 5");
    for level in (1..=4).rev() {
        err = err.context(format!("level {level}"));
    }

    let tree = errx_json::to_serialized(&err, SerializeOptions::default().with_max_depth(3)).unwrap();

    let mut levels = Vec::new();
    let mut current = &tree;
    while let Some(cause) = &current.cause {
        levels.push(cause.message.clone());
        current = &**cause;
    }
    assert_eq!(levels.len(), 3);
    assert_eq!(levels[2], MAX_DEPTH_REACHED);
}

#[test]
fn test_depth_limit_compact_output() {
    let err = Error::msg("level 3").context("level 2").context("level 1");
    let text = errx_json::to_string(&err, SerializeOptions::default().with_max_depth(2))
        .unwrap()
        .unwrap();
    assert_eq!(
        text,
        r#"{"message":"level 1: level 2: level 3","cause":{"message":"level 2: level 3","cause":{"message":"(max depth reached)"}}}"#
    );
}

#[test]
fn test_standard_errors_excluded() {
    let database = Sentinel::new("database");
    let err = Error::msg("standard error").wrap("wrapper", [&database]);

    let tree = errx_json::to_serialized(
        &err,
        SerializeOptions::default().with_include_standard_errors(false),
    )
    .unwrap();
    assert!(tree.cause.is_none());
    assert_eq!(tree.sentinels, vec!["database".to_string()]);
}

#[test]
fn test_aggregate_members_become_causes() {
    let shown = Displayable::new("shown");
    let err = Error::join([
        Error::msg("first"),
        Error::from(shown.clone()),
        Error::msg("third"),
    ])
    .unwrap();

    let all = errx_json::to_serialized(&err, SerializeOptions::default()).unwrap();
    assert!(all.cause.is_none());
    let messages: Vec<&str> = all.causes.iter().map(|c| c.message.as_str()).collect();
    assert_eq!(messages, vec!["first", "shown", "third"]);

    let classified_only = errx_json::to_serialized(
        &err,
        SerializeOptions::default().with_include_standard_errors(false),
    )
    .unwrap();
    let messages: Vec<&str> = classified_only
        .causes
        .iter()
        .map(|c| c.message.as_str())
        .collect();
    assert_eq!(messages, vec!["shown"]);
}

#[test]
fn test_shared_member_serialized_once() {
    let shared = Error::msg("shared");
    let err = Error::join([shared.clone(), shared]).unwrap();

    let tree = errx_json::to_serialized(&err, SerializeOptions::default()).unwrap();
    assert_eq!(tree.causes.len(), 2);
    assert_eq!(tree.causes[0].message, "shared");
    assert_eq!(tree.causes[1].message, CIRCULAR_REFERENCE);
}

#[test]
fn test_stack_trace_truncated() {
    let err = errx_stack::wrap("operation failed", Error::msg("base error"), Vec::<Classification>::new())
        .unwrap();

    let tree = errx_json::to_serialized(&err, SerializeOptions::default().with_max_stack_frames(3))
        .unwrap();
    assert_eq!(tree.stack_trace.len(), 3);
    assert!(tree.sentinels.is_empty());
}

#[test]
fn test_writer_output_matches_string() {
    let err = Error::msg("timeout").wrap("q failed", [attrs!("retry" => true)]);
    let options = SerializeOptions::default();

    let mut out = Vec::new();
    assert!(errx_json::to_writer(&mut out, &err, options).unwrap());
    assert_eq!(
        String::from_utf8(out).unwrap(),
        errx_json::to_string(&err, options).unwrap().unwrap()
    );
}

#[test]
fn test_serialized_tree_can_be_edited() {
    let err = Error::msg("secret internals").context("request failed");
    let mut tree: SerializedError =
        errx_json::to_serialized(&err, SerializeOptions::default()).unwrap();
    tree.cause = None;

    assert_eq!(
        serde_json::to_value(&tree).unwrap(),
        json!({"message": "request failed: secret internals"})
    );
}

#[test]
fn test_options_from_toml_drive_output() {
    let options = SerializeOptions::from_toml_str("max_depth = 1").unwrap();
    let err = Error::msg("inner").context("outer");
    assert_eq!(
        to_value(&err, options),
        json!({"message": "outer: inner", "cause": {"message": MAX_DEPTH_REACHED}})
    );
}

struct ClosedPipe;

impl io::Write for ClosedPipe {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_write_failure_names_operation_once() {
    let err = Error::msg("boom");
    let failure = errx_json::to_writer(ClosedPipe, &err, SerializeOptions::default()).unwrap_err();

    assert_eq!(failure.kind(), ErrorKind::Io);
    assert_eq!(failure.operation(), "json::to_writer");
    assert!(failure.context().is_empty());
    assert!(failure.source_ref().is_some());
}
