/// User domain types
use super::ids::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier
    pub id: UserId,

    /// Unique handle
    pub username: String,

    /// Contact email
    pub email: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: UserId::generate(),
            username: username.into(),
            email: email.into(),
            created_at: Utc::now(),
        }
    }
}
