//! Users, roles, and sessions.

use chrono::{DateTime, Utc};
use common::UserId;
use serde::{Deserialize, Serialize};

/// Capability claim attached to a session.
///
/// Established once when the session is created, never re-derived from
/// untyped user metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Admin,
}

impl Role {
    /// Returns true for admin sessions.
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// The authenticated user attached to the current session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: UserId,
    pub email: String,
    pub name: String,
    pub role: Role,
}

/// A row in the admin user directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
