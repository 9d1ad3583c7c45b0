use crate::{contacts, users, StorageError};
use async_trait::async_trait;
use contacts_core::{
    error::Result, Contact, ContactChanges, ContactId, ContactStore, ContactsError,
    IdentityStore, NewContact, Permission, User, UserId,
};
use sqlx::SqlitePool;

/// `SQLite`-backed implementation of the core storage traits
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if missing) the database at `database_url` and apply
    /// migrations
    pub async fn connect(database_url: &str) -> std::result::Result<Self, StorageError> {
        let pool = crate::create_pool(database_url).await?;
        crate::run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Round-trip a trivial query
    pub async fn ping(&self) -> std::result::Result<(), StorageError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl ContactStore for Database {
    async fn create_contact(&self, contact: NewContact) -> Result<Contact> {
        contacts::create(&self.pool, contact).await
    }

    async fn get_contact(&self, id: ContactId) -> Result<Contact> {
        contacts::get_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| ContactsError::not_found("Contact", id))
    }

    async fn list_contacts(&self) -> Result<Vec<Contact>> {
        contacts::get_all(&self.pool).await
    }

    async fn update_contact(&self, id: ContactId, changes: ContactChanges) -> Result<Contact> {
        contacts::update(&self.pool, id, changes).await
    }

    async fn delete_contact(&self, id: ContactId) -> Result<()> {
        contacts::delete(&self.pool, id).await
    }
}

#[async_trait]
impl IdentityStore for Database {
    async fn find_credentials(&self, username: &str) -> Result<Option<(User, String)>> {
        users::find_credentials(&self.pool, username).await
    }

    async fn get_user(&self, id: UserId) -> Result<User> {
        users::get_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| ContactsError::not_found("User", id))
    }

    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        is_superuser: bool,
    ) -> Result<User> {
        users::create(&self.pool, username, password_hash, is_superuser).await
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        users::get_all(&self.pool).await
    }

    async fn grant_permission(&self, user_id: UserId, permission: Permission) -> Result<()> {
        users::grant(&self.pool, user_id, permission).await
    }

    async fn revoke_permission(&self, user_id: UserId, permission: Permission) -> Result<()> {
        users::revoke(&self.pool, user_id, permission).await
    }
}
