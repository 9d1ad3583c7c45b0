//! Storage traits
//!
//! These abstract the persistence layer so the resource controller does not
//! depend on a particular database.

use crate::error::Result;
use crate::types::{Contact, ContactChanges, ContactId, NewContact, Permission, User, UserId};
use async_trait::async_trait;

/// Record store for contacts
///
/// Every operation is atomic for the record it touches. Operations on an
/// unknown id fail with `ContactsError::NotFound`.
#[async_trait]
pub trait ContactStore: Send + Sync {
    /// Persist a new contact; the store assigns the id
    async fn create_contact(&self, contact: NewContact) -> Result<Contact>;

    /// Get a contact by id
    async fn get_contact(&self, id: ContactId) -> Result<Contact>;

    /// All contacts in insertion order
    async fn list_contacts(&self) -> Result<Vec<Contact>>;

    /// Merge `changes` onto the stored contact and return the result
    async fn update_contact(&self, id: ContactId, changes: ContactChanges) -> Result<Contact>;

    /// Hard-delete a contact
    async fn delete_contact(&self, id: ContactId) -> Result<()>;
}

/// Lookup of users and their grants, used to resolve request identities
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Find a user and its bcrypt password hash by login name
    async fn find_credentials(&self, username: &str) -> Result<Option<(User, String)>>;

    /// Get a user by id
    async fn get_user(&self, id: UserId) -> Result<User>;

    /// Create a user with an already hashed password
    async fn create_user(&self, username: &str, password_hash: &str, is_superuser: bool)
        -> Result<User>;

    /// All users ordered by username
    async fn list_users(&self) -> Result<Vec<User>>;

    /// Grant a permission; granting twice is a no-op
    async fn grant_permission(&self, user_id: UserId, permission: Permission) -> Result<()>;

    /// Revoke a permission; revoking an absent grant is a no-op
    async fn revoke_permission(&self, user_id: UserId, permission: Permission) -> Result<()>;
}
