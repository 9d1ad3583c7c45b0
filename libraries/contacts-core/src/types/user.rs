/// User domain type
use super::GrantSet;
use serde::{Deserialize, Serialize};

pub type UserId = i64;

/// User account
///
/// The password hash never leaves the storage layer through this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier
    pub id: UserId,

    /// Login name
    pub username: String,

    /// Superusers pass every permission check
    pub is_superuser: bool,

    /// Permissions granted on the contact resource
    pub grants: GrantSet,

    /// Account creation timestamp (ISO string)
    pub created_at: String,
}
