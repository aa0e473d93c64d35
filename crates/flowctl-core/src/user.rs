//! Users and project permissions.

use serde::{Deserialize, Serialize};

/// Role of a user in the platform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    /// Full administrative access.
    Admin,
    /// Access only through explicit project grants.
    #[default]
    General,
}

/// A user acting on the control plane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User id.
    pub id: i64,

    /// Login name.
    pub name: String,

    /// Role.
    #[serde(default)]
    pub role: UserRole,
}

impl User {
    /// Create a general user.
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            role: UserRole::General,
        }
    }

    /// Create an admin user.
    pub fn admin(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            role: UserRole::Admin,
        }
    }

    /// Returns true if the user is an administrator.
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Permission bits checked against a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    /// Read project resources.
    Read,
    /// Modify project resources.
    Write,
}

impl Permission {
    /// Returns true if holding `self` also grants `other`.
    pub fn implies(&self, other: Permission) -> bool {
        matches!(
            (self, other),
            (Self::Write, _) | (Self::Read, Permission::Read)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_implies_read() {
        assert!(Permission::Write.implies(Permission::Read));
        assert!(Permission::Write.implies(Permission::Write));
        assert!(Permission::Read.implies(Permission::Read));
        assert!(!Permission::Read.implies(Permission::Write));
    }
}
