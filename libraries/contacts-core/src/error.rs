/// Core error types for the contacts service
use thiserror::Error;

/// Result type alias using `ContactsError`
pub type Result<T> = std::result::Result<T, ContactsError>;

/// Core error type for the contacts service
#[derive(Error, Debug)]
pub enum ContactsError {
    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Entity not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Duplicate entry
    #[error("Duplicate entry: {0}")]
    Duplicate(String),

    /// Database errors (for storage implementations)
    #[error("Database error: {0}")]
    Database(String),
}

impl ContactsError {
    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Whether this error means the requested entity does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(feature = "sqlx-support")]
impl From<sqlx::Error> for ContactsError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_entity_and_id() {
        let err = ContactsError::not_found("Contact", 42);
        assert_eq!(err.to_string(), "Contact not found: 42");
        assert!(err.is_not_found());
    }

    #[test]
    fn other_errors_are_not_not_found() {
        assert!(!ContactsError::storage("disk full").is_not_found());
    }
}
