//! Using ordinary errors as classifications.
//!
//! The typed API only accepts [`Classification`] values. The functions here
//! accept any [`Error`] instead and adopt it on the way in, so errors created
//! with [`Error::msg`] or [`Error::from_std`] can classify other errors and be
//! matched with [`Error::is`] later.

use std::fmt;

use crate::classified::Classification;
use crate::node::{Cause, Error, Node};

/// Classified shell around a plain error; unwraps to the original.
#[derive(Debug)]
struct Adopted {
    inner: Error,
}

impl fmt::Display for Adopted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl Node for Adopted {
    fn cause(&self) -> Cause<'_> {
        Cause::Single(&self.inner)
    }

    fn is_classified(&self) -> bool {
        true
    }
}

impl Classification {
    /// Accept any error as a classification.
    ///
    /// Classified nodes are taken as they are; plain errors get a classified
    /// shell that keeps them reachable for [`Error::is`] and [`Error::find`].
    pub fn adopt(err: Error) -> Self {
        if err.is_classified() {
            return Self::External(err);
        }
        Self::External(Error::new(Adopted { inner: err }))
    }
}

/// [`crate::wrap`] taking plain errors as classifications.
pub fn wrap(
    text: impl Into<String>,
    cause: impl Into<Option<Error>>,
    classifications: impl IntoIterator<Item = Error>,
) -> Option<Error> {
    crate::carrier::wrap(
        text,
        cause,
        classifications.into_iter().map(Classification::adopt),
    )
}

/// [`crate::classify`] taking plain errors as classifications.
pub fn classify(
    cause: impl Into<Option<Error>>,
    classifications: impl IntoIterator<Item = Error>,
) -> Option<Error> {
    crate::carrier::classify(cause, classifications.into_iter().map(Classification::adopt))
}
