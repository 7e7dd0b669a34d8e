use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::errors::{AuditLogError, Result};

/// Defines a string-backed category whose vocabulary is open: well-known
/// values are listed, but any non-blank value is accepted as-is.
macro_rules! open_vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal, [$($konst:ident => $value:literal),* $(,)?]
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            $(pub const $konst: &'static str = $value;)*

            /// Values this build knows about. Others are still valid.
            pub const KNOWN: &'static [&'static str] = &[$(Self::$konst),*];

            /// Wrap a value, rejecting blank strings. No case folding is
            /// applied: filters match the stored value exactly.
            pub fn new(value: impl Into<String>) -> Result<Self> {
                let value = value.into();
                if value.trim().is_empty() {
                    return Err(AuditLogError::InvalidInput {
                        field: $field.to_string(),
                        detail: "value must not be empty".into(),
                    });
                }
                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Whether this value is one of the well-known entries.
            pub fn is_known(&self) -> bool {
                Self::KNOWN.contains(&self.0.as_str())
            }
        }

        impl TryFrom<String> for $name {
            type Error = AuditLogError;

            fn try_from(value: String) -> Result<Self> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> String {
                value.0
            }
        }

        impl FromStr for $name {
            type Err = AuditLogError;

            fn from_str(s: &str) -> Result<Self> {
                Self::new(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

open_vocabulary!(
    /// What an operation did to its resource (`CREATE`, `UPDATE`, ...).
    Action, "action", [
        CREATE => "CREATE",
        UPDATE => "UPDATE",
        DELETE => "DELETE",
        READ => "READ",
        LOGIN => "LOGIN",
        LOGOUT => "LOGOUT",
    ]
);

open_vocabulary!(
    /// How a login was attempted (`password`, `oauth`, ...).
    LoginType, "login_type", [
        PASSWORD => "password",
        OAUTH => "oauth",
        LDAP => "ldap",
        API_KEY => "api_key",
    ]
);
