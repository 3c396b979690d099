//! # errx-core
//!
//! Error composition: classify errors with sentinels, attach user-facing
//! text, structured attributes and stack traces, and keep treating the result
//! as one opaque [`Error`].
//!
//! ## Design
//!
//! - **Sentinel**: a classification marker, optionally with parent sentinels
//! - **Carrier**: attaches classifications without changing the message
//! - **Displayable / Attributed / Traced**: classifications with payloads
//! - **Traversal**: breadth-first, cycle-safe walk over the error graph
//!
//! ## Usage
//!
//! ```rust
//! use errx_core::{attrs, display_text, extract_attrs, Classification, Displayable, Error, Sentinel};
//!
//! let not_found = Sentinel::new("not found");
//!
//! let err = Error::msg("no rows in result set").wrap(
//!     "failed to fetch user",
//!     [
//!         Classification::from(&not_found),
//!         Classification::from(Displayable::new("User not found")),
//!         Classification::from(attrs!("user_id" => 42)),
//!     ],
//! );
//!
//! assert_eq!(err.to_string(), "failed to fetch user: no rows in result set");
//! assert!(err.is(&not_found));
//! assert_eq!(display_text(&err), "User not found");
//! assert_eq!(extract_attrs(&err).to_string(), "user_id=42");
//! ```
//!
//! ## Principles
//!
//! - Identity is the node allocation, never the message
//! - Classification text never leaks into messages
//! - A missing cause stays missing: composition takes `Option<Error>`
//! - Every walk over the graph terminates, cycles included

mod attrs;
mod carrier;
mod classified;
pub mod compat;
mod display;
mod node;
mod sentinel;
mod traced;
pub mod traverse;

pub use attrs::{extract_attrs, has_attrs, Attr, AttrList, Attributed};
pub use carrier::{classify, wrap, Carrier, ResultExt};
pub use classified::Classification;
pub use display::{display_text, display_text_or, is_displayable, Displayable};
pub use node::{Cause, Error, ErrorId, Node};
pub use sentinel::Sentinel;
pub use traced::{frames, Frame, StackSource, Traced};
pub use traverse::{walk, Visited};

/// Result type alias using errx Error
pub type Result<T, E = Error> = std::result::Result<T, E>;
