//! Attaching classifications to an error without touching its message.

use std::any::TypeId;
use std::fmt;

use crate::classified::Classification;
use crate::node::{Cause, Error, Node};

/// Composition node layering classification markers onto a cause.
///
/// Its message is always exactly the cause's message; classification text is
/// never rendered.
#[derive(Debug)]
pub struct Carrier {
    classifications: Vec<Classification>,
    cause: Error,
}

impl Carrier {
    pub fn classifications(&self) -> &[Classification] {
        &self.classifications
    }

    pub fn wrapped(&self) -> &Error {
        &self.cause
    }
}

impl fmt::Display for Carrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.cause, f)
    }
}

impl Node for Carrier {
    fn cause(&self) -> Cause<'_> {
        Cause::Single(&self.cause)
    }

    fn matches(&self, target: &Error) -> bool {
        self.cause.is(target)
            || self
                .classifications
                .iter()
                .any(|classification| classification.as_error().is(target))
    }

    fn unwrap_as(&self, target: TypeId) -> Option<&(dyn Node + 'static)> {
        self.cause.find_by_type(target).or_else(|| {
            self.classifications
                .iter()
                .find_map(|classification| classification.as_error().find_by_type(target))
        })
    }
}

impl Error {
    /// Attach classifications, keeping the message as is.
    pub fn classify<C>(self, classifications: impl IntoIterator<Item = C>) -> Error
    where
        C: Into<Classification>,
    {
        Error::new(Carrier {
            classifications: classifications.into_iter().map(Into::into).collect(),
            cause: self,
        })
    }

    /// Prefix the message with `text` and attach classifications.
    ///
    /// Without classifications this is exactly [`Error::context`] and no
    /// carrier is allocated.
    pub fn wrap<C>(self, text: impl Into<String>, classifications: impl IntoIterator<Item = C>) -> Error
    where
        C: Into<Classification>,
    {
        let classifications: Vec<Classification> =
            classifications.into_iter().map(Into::into).collect();
        if classifications.is_empty() {
            return self.context(text);
        }
        Error::new(Carrier {
            classifications,
            cause: self,
        })
        .context(text)
    }
}

/// Attach classifications to `cause`. A missing cause stays missing.
///
/// ```
/// use errx_core::{classify, Error, Sentinel};
///
/// let not_found = Sentinel::new("resource not found");
/// let err = classify(Error::msg("resource missing"), [&not_found]).unwrap();
/// assert_eq!(err.to_string(), "resource missing");
/// assert!(err.is(&not_found));
///
/// assert!(classify(None::<Error>, [&not_found]).is_none());
/// ```
pub fn classify<C>(
    cause: impl Into<Option<Error>>,
    classifications: impl IntoIterator<Item = C>,
) -> Option<Error>
where
    C: Into<Classification>,
{
    Some(cause.into()?.classify(classifications))
}

/// Prefix `cause` with `text` and attach classifications. A missing cause
/// stays missing.
pub fn wrap<C>(
    text: impl Into<String>,
    cause: impl Into<Option<Error>>,
    classifications: impl IntoIterator<Item = C>,
) -> Option<Error>
where
    C: Into<Classification>,
{
    Some(cause.into()?.wrap(text, classifications))
}

/// Composition helpers on `Result`, so `Ok` values pass through untouched.
pub trait ResultExt<T> {
    fn context(self, text: impl Into<String>) -> Result<T, Error>;

    fn wrap_err<C>(
        self,
        text: impl Into<String>,
        classifications: impl IntoIterator<Item = C>,
    ) -> Result<T, Error>
    where
        C: Into<Classification>;

    fn classify_err<C>(self, classifications: impl IntoIterator<Item = C>) -> Result<T, Error>
    where
        C: Into<Classification>;
}

impl<T> ResultExt<T> for Result<T, Error> {
    fn context(self, text: impl Into<String>) -> Result<T, Error> {
        self.map_err(|err| err.context(text))
    }

    fn wrap_err<C>(
        self,
        text: impl Into<String>,
        classifications: impl IntoIterator<Item = C>,
    ) -> Result<T, Error>
    where
        C: Into<Classification>,
    {
        self.map_err(|err| err.wrap(text, classifications))
    }

    fn classify_err<C>(self, classifications: impl IntoIterator<Item = C>) -> Result<T, Error>
    where
        C: Into<Classification>,
    {
        self.map_err(|err| err.classify(classifications))
    }
}
