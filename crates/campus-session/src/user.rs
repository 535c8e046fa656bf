//! User identity.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// User role, derived from the backend's role flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Student (no elevated flags).
    #[default]
    Student,
    /// Faculty member.
    Faculty,
    /// Administrator.
    Admin,
}

impl Role {
    /// Get role as string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Faculty => "faculty",
            Role::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "faculty" => Ok(Role::Faculty),
            "admin" => Ok(Role::Admin),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The signed-in user as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// User ID.
    #[serde(alias = "_id")]
    pub id: String,
    /// Login name.
    pub username: String,
    /// Email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    /// Avatar URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// Administrator flag.
    #[serde(default)]
    pub is_admin: bool,
    /// Faculty flag.
    #[serde(default)]
    pub is_faculty: bool,
}

impl Identity {
    /// Create an identity with no role flags.
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            email: None,
            full_name: None,
            avatar: None,
            is_admin: false,
            is_faculty: false,
        }
    }

    /// Set the admin flag.
    pub fn admin(mut self) -> Self {
        self.is_admin = true;
        self
    }

    /// Set the faculty flag.
    pub fn faculty(mut self) -> Self {
        self.is_faculty = true;
        self
    }

    /// Highest role granted by the flags.
    pub fn role(&self) -> Role {
        if self.is_admin {
            Role::Admin
        } else if self.is_faculty {
            Role::Faculty
        } else {
            Role::Student
        }
    }

    /// Name to show in a UI.
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or(&self.username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identity_from_backend_json() {
        let identity: Identity = serde_json::from_value(json!({
            "_id": "u1",
            "username": "ana",
            "fullName": "Ana Lima",
            "isAdmin": true
        }))
        .unwrap();
        assert_eq!(identity.id, "u1");
        assert_eq!(identity.display_name(), "Ana Lima");
        assert_eq!(identity.role(), Role::Admin);
        assert!(!identity.is_faculty);
    }

    #[test]
    fn test_role_from_flags() {
        assert_eq!(Identity::new("1", "s").role(), Role::Student);
        assert_eq!(Identity::new("2", "f").faculty().role(), Role::Faculty);
        assert_eq!(Identity::new("3", "a").faculty().admin().role(), Role::Admin);
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("faculty".parse::<Role>(), Ok(Role::Faculty));
        assert!("root".parse::<Role>().is_err());
    }
}
