//! # errx
//!
//! Compose errors from classification sentinels, user-facing display text,
//! structured attributes and stack traces, while keeping a single opaque
//! [`Error`] value to pass around.
//!
//! - the core API ([`Error`], [`Sentinel`], [`wrap`], [`classify`], the
//!   extraction functions) is re-exported at the top level
//! - [`stack`] captures call stacks
//! - [`json`] serializes an error graph to JSON
//!
//! ```rust
//! use std::sync::LazyLock;
//!
//! use errx::{attrs, display_text, extract_attrs, Classification, Displayable, Error, Sentinel};
//!
//! static NOT_FOUND: LazyLock<Sentinel> = LazyLock::new(|| Sentinel::new("not found"));
//!
//! fn find_user(id: u64) -> errx::Result<String> {
//!     let rows: Option<String> = None;
//!     rows.ok_or_else(|| {
//!         Error::msg("no rows in result set").wrap(
//!             "failed to fetch user",
//!             [
//!                 Classification::from(&*NOT_FOUND),
//!                 Classification::from(Displayable::new("User not found")),
//!                 Classification::from(attrs!("user_id" => id)),
//!             ],
//!         )
//!     })
//! }
//!
//! let err = find_user(42).unwrap_err();
//! assert!(err.is(&*NOT_FOUND));
//! assert_eq!(display_text(&err), "User not found");
//! assert_eq!(extract_attrs(&err).to_string(), "user_id=42");
//!
//! let json = errx::json::to_string(&err, errx::json::SerializeOptions::default())?;
//! assert!(json.is_some());
//! # Ok::<(), errx::json::Error>(())
//! ```

pub use errx_core::*;

/// Stack trace capture.
pub mod stack {
    pub use errx_stack::*;
}

/// JSON serialization.
pub mod json {
    pub use errx_json::*;
}
