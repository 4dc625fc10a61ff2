//! Identifier types for schedule entities.
//!
//! Feed identifiers are opaque strings (e.g. `IDFM:71370` or
//! `IDFM:StopPoint:Q:22095`). The only things we insist on are that they
//! are non-empty and carry no surrounding whitespace or control characters,
//! so that two spellings of the same key cannot silently diverge.

use std::fmt;

/// Error returned when parsing an invalid identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind} identifier: {reason}")]
pub struct InvalidId {
    kind: &'static str,
    reason: &'static str,
}

fn validate(kind: &'static str, s: &str) -> Result<(), InvalidId> {
    if s.is_empty() {
        return Err(InvalidId {
            kind,
            reason: "must not be empty",
        });
    }

    if s.trim() != s {
        return Err(InvalidId {
            kind,
            reason: "must not have leading or trailing whitespace",
        });
    }

    if s.chars().any(char::is_control) {
        return Err(InvalidId {
            kind,
            reason: "must not contain control characters",
        });
    }

    Ok(())
}

macro_rules! feed_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Parse an identifier, rejecting empty or padded strings.
            pub fn parse(s: &str) -> Result<Self, InvalidId> {
                validate($kind, s)?;
                Ok(Self(s.to_string()))
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = InvalidId;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                validate($kind, &s)?;
                Ok(Self(s))
            }
        }

        impl std::str::FromStr for $name {
            type Err = InvalidId;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(&self.0)
            }
        }
    };
}

feed_id!(
    /// Key of a station (an interchange complex grouping several stops).
    ///
    /// # Examples
    ///
    /// ```
    /// use metro_planner::domain::StationId;
    ///
    /// let chatelet = StationId::parse("IDFM:71264").unwrap();
    /// assert_eq!(chatelet.as_str(), "IDFM:71264");
    ///
    /// assert!(StationId::parse("").is_err());
    /// assert!(StationId::parse(" IDFM:71264").is_err());
    /// ```
    StationId,
    "station"
);

feed_id!(
    /// Key of a single boarding point.
    StopId,
    "stop"
);

feed_id!(
    /// Key of a scheduled line.
    RouteId,
    "route"
);

feed_id!(
    /// Key of one scheduled vehicle run.
    TripId,
    "trip"
);


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Roundtrip: parse then as_str returns the original
        #[test]
        fn roundtrip(s in "[A-Za-z0-9:_-][A-Za-z0-9:_ -]{0,30}[A-Za-z0-9:_-]") {
            let id = StopId::parse(&s).unwrap();
            prop_assert_eq!(id.as_str(), s.as_str());
        }

        /// Leading whitespace is always rejected
        #[test]
        fn leading_whitespace_rejected(s in "[ \t][A-Za-z0-9]{1,10}") {
            prop_assert!(StationId::parse(&s).is_err());
        }
    }
}
