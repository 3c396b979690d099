//! # errx-json
//!
//! JSON serialization for errx errors.
//!
//! The error graph is rendered as a tree: every node reports its message,
//! display text, sentinels, attributes and stack trace, followed by its
//! cause (or, for aggregates, its causes). Depth and cycles are bounded, so
//! any graph serializes.
//!
//! ## Usage
//!
//! ```rust
//! use errx_core::{Error, Sentinel};
//! use errx_json::SerializeOptions;
//!
//! let not_found = Sentinel::new("not found");
//! let err = Error::msg("connection timeout").wrap("failed to fetch user", [&not_found]);
//!
//! let json = errx_json::to_string(&err, SerializeOptions::default())?;
//! assert_eq!(
//!     json.as_deref(),
//!     Some(r#"{"message":"failed to fetch user: connection timeout","sentinels":["not found"],"cause":{"message":"connection timeout"}}"#)
//! );
//! # Ok::<(), errx_json::Error>(())
//! ```
//!
//! ## Principles
//!
//! - Building the tree never fails; only encoding returns [`Error`]
//! - A missing error serializes to `None`, not to an empty object
//! - Sentinels are reported where they were attached, not on every ancestor

mod error;
mod kind;
mod options;
mod serialize;

pub use error::Error;
pub use kind::ErrorKind;
pub use options::SerializeOptions;
pub use serialize::{
    to_serialized, to_string, to_string_pretty, to_vec, to_vec_indent, to_writer,
    SerializedAttr, SerializedError, SerializedFrame, CIRCULAR_REFERENCE, MAX_DEPTH_REACHED,
};

/// Result type alias using errx-json Error
pub type Result<T> = std::result::Result<T, Error>;
