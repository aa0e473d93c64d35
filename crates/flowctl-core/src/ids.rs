//! Newtype wrappers for identifiers to ensure type safety.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::CoreError;

/// Immutable numeric code identifying a Project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectCode(i64);

impl ProjectCode {
    /// Create a new ProjectCode.
    pub const fn new(code: i64) -> Self {
        Self(code)
    }

    /// Get the raw numeric value.
    pub const fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for ProjectCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ProjectCode {
    fn from(code: i64) -> Self {
        Self(code)
    }
}

impl FromStr for ProjectCode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| CoreError::InvalidProjectCode(s.to_string()))
    }
}

/// Identifier of a registry session owning ephemeral nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Create a new SessionId from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new random SessionId.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the inner string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a running task instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskInstanceId(String);

impl TaskInstanceId {
    /// Create a new TaskInstanceId from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new random TaskInstanceId.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the inner string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for TaskInstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TaskInstanceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TaskInstanceId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_generate() {
        let id1 = SessionId::generate();
        let id2 = SessionId::generate();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_project_code_parse() {
        let code: ProjectCode = " 42 ".parse().unwrap();
        assert_eq!(code, ProjectCode::new(42));
        assert_eq!(format!("{}", code), "42");

        let err = "abc".parse::<ProjectCode>().unwrap_err();
        assert_eq!(err, CoreError::InvalidProjectCode("abc".to_string()));
    }

    #[test]
    fn test_project_code_serializes_as_number() {
        let json = serde_json::to_string(&ProjectCode::new(7)).unwrap();
        assert_eq!(json, "7");
    }
}
