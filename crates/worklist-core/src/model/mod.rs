//! Entity shapes held by the list controller.
//!
//! Two concrete shapes exist: [`project::Project`] and
//! [`work_item::WorkItem`]. Both implement [`entity::ListEntity`], which is
//! everything the filter, sort, and mutation layers need to know.

pub mod entity;
pub mod project;
pub mod work_item;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error returned when parsing an enum value from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub expected: &'static str,
    pub got: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: '{}'", self.expected, self.got)
    }
}

impl std::error::Error for ParseEnumError {}

pub(crate) fn normalize(input: &str) -> String {
    input
        .trim()
        .chars()
        .map(|c| match c {
            '-' | ' ' => '_',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}

/// Declares a label-backed enum.
///
/// Known labels parse strictly through `FromStr`. Deserialization is lenient:
/// anything outside the known set lands in `Other` verbatim so corrupt remote
/// data can still be held, filtered, and ranked.
macro_rules! label_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $expected:literal, default = $default:ident {
            $($variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize,
        )]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($variant,)+
            /// A label outside the known set, kept verbatim.
            Other(String),
        }

        impl $name {
            /// Canonical wire label.
            #[must_use]
            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $label,)+
                    Self::Other(raw) => raw,
                }
            }

            /// Returns `false` for values outside the known set.
            #[must_use]
            pub const fn is_known(&self) -> bool {
                !matches!(self, Self::Other(_))
            }

            /// Every known value, in declaration order.
            #[must_use]
            pub fn known() -> Vec<Self> {
                vec![$(Self::$variant),+]
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::model::ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let normalized = $crate::model::normalize(s);
                match normalized.as_str() {
                    $($label => Ok(Self::$variant),)+
                    _ => Err($crate::model::ParseEnumError {
                        expected: $expected,
                        got: s.to_string(),
                    }),
                }
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                raw.parse().unwrap_or_else(|_| Self::Other(raw))
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                match value {
                    $name::Other(raw) => raw,
                    known => known.as_str().to_string(),
                }
            }
        }
    };
}

pub(crate) use label_enum;

label_enum! {
    /// Priority shared by projects and work items.
    Priority, "priority", default = Medium {
        High => "high",
        Medium => "medium",
        Low => "low",
    }
}

/// A dashboard user as the remote API renders it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
}

impl User {
    pub fn new(id: i64, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
        }
    }
}

pub(crate) fn join_usernames<'a>(users: impl Iterator<Item = &'a User>) -> String {
    users
        .map(|u| u.username.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::{Priority, normalize};
    use std::str::FromStr;

    #[test]
    fn priority_json_roundtrips() {
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), "\"high\"");
        assert_eq!(
            serde_json::from_str::<Priority>("\"low\"").unwrap(),
            Priority::Low
        );
    }

    #[test]
    fn unknown_priority_is_kept_verbatim() {
        let parsed: Priority = serde_json::from_str("\"critical\"").unwrap();
        assert_eq!(parsed, Priority::Other("critical".to_string()));
        assert!(!parsed.is_known());
        assert_eq!(serde_json::to_string(&parsed).unwrap(), "\"critical\"");
    }

    #[test]
    fn parse_is_strict_and_normalizing() {
        assert_eq!(Priority::from_str(" HIGH ").unwrap(), Priority::High);
        let err = Priority::from_str("urgent").unwrap_err();
        assert_eq!(err.to_string(), "invalid priority: 'urgent'");
    }

    #[test]
    fn normalize_folds_separators() {
        assert_eq!(normalize("On-Hold"), "on_hold");
        assert_eq!(normalize("in progress"), "in_progress");
    }

    #[test]
    fn known_lists_declared_order() {
        assert_eq!(
            Priority::known(),
            vec![Priority::High, Priority::Medium, Priority::Low]
        );
    }
}
