//! The closed set of classification markers a carrier can hold.

use std::fmt;

use crate::attrs::Attributed;
use crate::display::Displayable;
use crate::node::Error;
use crate::sentinel::Sentinel;
use crate::traced::Traced;

/// A classification marker.
///
/// The four built-in variants cover the library's own enrichments; `External`
/// holds any other node whose [`Node::is_classified`](crate::Node::is_classified)
/// returns `true`. Every variant is also an ordinary error, see
/// [`Classification::as_error`].
#[derive(Debug, Clone)]
pub enum Classification {
    Sentinel(Sentinel),
    Displayable(Displayable),
    Attributed(Attributed),
    Traced(Traced),
    External(Error),
}

impl Classification {
    /// Accept a custom classified node. Returns `None` for plain errors; see
    /// [`Classification::adopt`] to accept those as well.
    pub fn external(err: Error) -> Option<Self> {
        err.is_classified().then_some(Self::External(err))
    }

    pub fn as_error(&self) -> &Error {
        match self {
            Self::Sentinel(sentinel) => sentinel.as_error(),
            Self::Displayable(displayable) => displayable.as_error(),
            Self::Attributed(attributed) => attributed.as_error(),
            Self::Traced(traced) => traced.as_error(),
            Self::External(err) => err,
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.as_error(), f)
    }
}

impl AsRef<Error> for Classification {
    fn as_ref(&self) -> &Error {
        self.as_error()
    }
}

impl From<Classification> for Error {
    fn from(classification: Classification) -> Self {
        classification.as_error().clone()
    }
}

macro_rules! classification_from {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for Classification {
                fn from(value: $variant) -> Self {
                    Self::$variant(value)
                }
            }

            impl From<&$variant> for Classification {
                fn from(value: &$variant) -> Self {
                    Self::$variant(value.clone())
                }
            }
        )*
    };
}

classification_from!(Sentinel, Displayable, Attributed, Traced);

impl From<&Classification> for Classification {
    fn from(value: &Classification) -> Self {
        value.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;

    #[derive(Debug)]
    struct Quota {
        limit: u32,
    }

    impl fmt::Display for Quota {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "quota of {} exceeded", self.limit)
        }
    }

    impl Node for Quota {
        fn is_classified(&self) -> bool {
            true
        }
    }

    #[test]
    fn test_variants_share_identity_with_their_error() {
        let sentinel = Sentinel::new("tag");
        let classification = Classification::from(&sentinel);
        assert_eq!(classification.as_error().id(), sentinel.as_error().id());
        assert_eq!(classification.to_string(), "tag");
    }

    #[test]
    fn test_external_requires_classified_node() {
        assert!(Classification::external(Error::msg("plain")).is_none());

        let quota = Classification::external(Error::new(Quota { limit: 10 })).unwrap();
        assert_eq!(quota.to_string(), "quota of 10 exceeded");
        assert_eq!(quota.as_error().find::<Quota>().map(|q| q.limit), Some(10));
    }
}
