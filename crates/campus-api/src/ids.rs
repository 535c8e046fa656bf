//! Newtype IDs for type-safe identifiers.
//!
//! The backend hands out opaque string ids (`_id`). Wrapping them keeps an
//! event id from being passed where a placement id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($name:ident) => {
        /// A backend-assigned identifier.
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(UserId);
define_id!(EventId);
define_id!(ComplaintId);
define_id!(LostItemId);
define_id!(PlacementId);
define_id!(NotificationId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_creation() {
        let id = EventId::new("65f0c1");
        assert_eq!(id.as_str(), "65f0c1");
        assert_eq!(id.to_string(), "65f0c1");
    }

    #[test]
    fn test_id_serializes_as_plain_string() {
        let id: PlacementId = "p-9".into();
        assert_eq!(serde_json::to_value(&id).unwrap(), serde_json::json!("p-9"));

        let back: PlacementId = serde_json::from_str("\"p-9\"").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_id_equality() {
        assert_eq!(ComplaintId::new("same"), ComplaintId::new("same"));
        assert_ne!(ComplaintId::new("same"), ComplaintId::new("other"));
    }
}
