//! Validated identifiers for services and operations.
//!
//! Service and operation names arrive from untrusted callers, so both are
//! newtypes that can only be constructed through validation. Names must be
//! non-empty, at most 128 bytes, and limited to alphanumerics plus `_`, `-`
//! and `.`, which also rules out path separators and whitespace.

use serde::{Deserialize, Serialize};
use std::fmt;

const MAX_NAME_LEN: usize = 128;

/// Errors produced when parsing a service or operation name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidName {
    /// The name was empty or whitespace-only.
    #[error("name must not be empty")]
    Empty,

    /// The name exceeded the maximum length.
    #[error("name is {len} bytes, maximum is {MAX_NAME_LEN}")]
    TooLong { len: usize },

    /// The name contained a character outside the allowed set.
    #[error("name '{name}' contains invalid character '{ch}'")]
    InvalidChar { name: String, ch: char },
}

fn validate(raw: &str) -> Result<(), InvalidName> {
    if raw.trim().is_empty() {
        return Err(InvalidName::Empty);
    }
    if raw.len() > MAX_NAME_LEN {
        return Err(InvalidName::TooLong { len: raw.len() });
    }
    if let Some(ch) = raw
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')))
    {
        return Err(InvalidName::InvalidChar {
            name: raw.to_string(),
            ch,
        });
    }
    Ok(())
}

macro_rules! validated_name {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Parse and validate a raw name.
            pub fn parse(raw: &str) -> Result<Self, InvalidName> {
                validate(raw)?;
                Ok(Self(raw.to_string()))
            }

            /// View the name as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = InvalidName;

            fn try_from(raw: String) -> Result<Self, Self::Error> {
                validate(&raw)?;
                Ok(Self(raw))
            }
        }

        impl From<$name> for String {
            fn from(name: $name) -> String {
                name.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

validated_name! {
    /// Unique key a service is registered under.
    ServiceName
}

validated_name! {
    /// Name of one unit of work a service can perform.
    OperationName
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_reasonable_names() {
        assert!(ServiceName::parse("svc-a").is_ok());
        assert!(ServiceName::parse("weather_v2").is_ok());
        assert!(ServiceName::parse("billing.eu").is_ok());
        assert!(OperationName::parse("op1").is_ok());
        assert!(OperationName::parse("Fetch-Report").is_ok());
    }

    #[test]
    fn rejects_empty_and_whitespace() {
        assert_eq!(ServiceName::parse(""), Err(InvalidName::Empty));
        assert_eq!(ServiceName::parse("   "), Err(InvalidName::Empty));
    }

    #[test]
    fn rejects_invalid_characters() {
        assert!(matches!(
            ServiceName::parse("has space"),
            Err(InvalidName::InvalidChar { ch: ' ', .. })
        ));
        assert!(matches!(
            ServiceName::parse("../etc/passwd"),
            Err(InvalidName::InvalidChar { ch: '/', .. })
        ));
        assert!(matches!(
            OperationName::parse("op@special"),
            Err(InvalidName::InvalidChar { ch: '@', .. })
        ));
    }

    #[test]
    fn rejects_overlong_names() {
        let long = "a".repeat(129);
        assert!(matches!(
            ServiceName::parse(&long),
            Err(InvalidName::TooLong { len: 129 })
        ));
    }

    #[test]
    fn serde_round_trip_validates() {
        let name: ServiceName = serde_json::from_str("\"svc-a\"").unwrap();
        assert_eq!(name.as_str(), "svc-a");
        assert_eq!(serde_json::to_string(&name).unwrap(), "\"svc-a\"");

        let bad: Result<ServiceName, _> = serde_json::from_str("\"has space\"");
        assert!(bad.is_err());
    }
}
