//! # errx-stack
//!
//! Attach call stacks to errx errors.
//!
//! Capturing only records return addresses; symbols are resolved the first
//! time the frames are read, so errors that are never inspected stay cheap.
//!
//! ```rust
//! use errx_core::{Error, Sentinel};
//!
//! let database = Sentinel::new("database error");
//! let err = errx_stack::wrap("query failed", Error::msg("timeout"), [&database]).unwrap();
//!
//! assert_eq!(err.to_string(), "query failed: timeout");
//! assert!(err.is(&database));
//! assert!(errx_stack::extract(&err).is_some());
//! ```

mod capture;

pub use capture::{classify, extract, here, here_with_depth, wrap, DEFAULT_MAX_FRAMES};
