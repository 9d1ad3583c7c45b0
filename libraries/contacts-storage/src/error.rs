/// Storage-specific errors
use thiserror::Error;

/// Storage error types
#[derive(Error, Debug)]
pub enum StorageError {
    /// Migration error
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Database error from `SQLx`
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl From<StorageError> for contacts_core::ContactsError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Database(e) => Self::from(e),
            StorageError::Migration(e) => Self::storage(format!("Migration error: {}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contacts_core::ContactsError;

    #[test]
    fn migration_failures_become_storage_errors() {
        let err = StorageError::from(sqlx::migrate::MigrateError::VersionMissing(3));
        let converted = ContactsError::from(err);
        assert!(matches!(converted, ContactsError::Storage(ref msg) if msg.starts_with("Migration error")));
    }

    #[test]
    fn query_failures_become_database_errors() {
        let converted = ContactsError::from(StorageError::from(sqlx::Error::RowNotFound));
        assert!(matches!(converted, ContactsError::Database(_)));
        assert!(!converted.is_not_found());
    }
}
