//! Error kinds for errx-json operations

use strum_macros::{Display, IntoStaticStr};

/// The kind of error that occurred.
///
/// Serializing an error graph itself never fails; these cover writing the
/// encoded output and loading serializer options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoStaticStr, Display)]
#[non_exhaustive]
pub enum ErrorKind {
    /// JSON encoding failed
    Encode,

    /// Writing to or reading from an IO resource failed
    Io,

    /// Serializer options could not be parsed
    ConfigInvalid,
}

impl ErrorKind {
    /// Returns the error kind as a static string
    pub fn as_str(&self) -> &'static str {
        (*self).into()
    }
}
