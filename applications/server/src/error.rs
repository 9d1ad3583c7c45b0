/// Server error types
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use contacts_core::{AccessDenied, ContactsError, ValidationErrors};
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Permission denied: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Deletion notification failed: {0}")]
    Notification(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(ContactsError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Bcrypt error: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
}

impl From<ContactsError> for ServerError {
    fn from(err: ContactsError) -> Self {
        match err {
            ContactsError::NotFound { entity, .. } => {
                ServerError::NotFound(format!("{} not found", entity))
            }
            ContactsError::Duplicate(msg) => ServerError::BadRequest(msg),
            other => ServerError::Database(other),
        }
    }
}

impl From<contacts_storage::StorageError> for ServerError {
    fn from(err: contacts_storage::StorageError) -> Self {
        ServerError::from(ContactsError::from(err))
    }
}

impl From<AccessDenied> for ServerError {
    fn from(err: AccessDenied) -> Self {
        tracing::info!("{}", err);
        // The body does not say which permission was missing
        ServerError::Forbidden("You do not have permission to perform this action.".to_string())
    }
}

impl From<ValidationErrors> for ServerError {
    fn from(errors: ValidationErrors) -> Self {
        ServerError::Validation(errors)
    }
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::Auth(_) | ServerError::Jwt(_) => StatusCode::UNAUTHORIZED,
            ServerError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Validation(_) | ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Notification(_)
            | ServerError::Internal(_)
            | ServerError::Database(_)
            | ServerError::Config(_)
            | ServerError::Bcrypt(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Detail of a server-side failure, attached to 500 responses so the
/// debug middleware can expose it
#[derive(Debug, Clone)]
pub struct ErrorDetail {
    pub summary: String,
    pub detail: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();

        let (error_message, detail) = match self {
            ServerError::Validation(errors) => {
                return (status, Json(errors)).into_response();
            }
            ServerError::Auth(msg) => {
                let body = Json(json!({ "error": msg }));
                return (
                    status,
                    [(header::WWW_AUTHENTICATE, "Basic realm=\"api\"")],
                    body,
                )
                    .into_response();
            }
            ServerError::Forbidden(msg)
            | ServerError::NotFound(msg)
            | ServerError::BadRequest(msg) => (msg, None),
            ServerError::Jwt(ref e) => {
                tracing::warn!("JWT error: {:?}", e);
                ("Invalid token".to_string(), None)
            }
            ServerError::Notification(msg) => {
                tracing::error!("Notification error: {}", msg);
                ("Deletion notification failed".to_string(), Some(msg))
            }
            ServerError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                ("Database error".to_string(), Some(e.to_string()))
            }
            ServerError::Config(msg) => {
                tracing::error!("Config error: {}", msg);
                ("Configuration error".to_string(), Some(msg))
            }
            ServerError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                ("Internal server error".to_string(), Some(msg))
            }
            ServerError::Bcrypt(ref e) => {
                tracing::error!("Bcrypt error: {:?}", e);
                ("Password error".to_string(), Some(e.to_string()))
            }
        };

        let mut response = (status, Json(json!({ "error": &error_message }))).into_response();
        if let Some(detail) = detail {
            response.extensions_mut().insert(ErrorDetail {
                summary: error_message,
                detail,
            });
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contacts_core::{Action, Permission};

    #[test]
    fn not_found_maps_to_404() {
        let err = ServerError::from(ContactsError::not_found("Contact", 3));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn access_denied_maps_to_403_without_details() {
        let err = ServerError::from(AccessDenied {
            username: "reader".to_string(),
            action: Action::Destroy,
            required: Permission::Delete,
        });
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        assert!(!err.to_string().contains("delete"));
    }

    #[test]
    fn internal_errors_carry_detail_out_of_band() {
        let response = ServerError::Internal("disk I/O".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let detail = response.extensions().get::<ErrorDetail>().unwrap();
        assert_eq!(detail.summary, "Internal server error");
        assert_eq!(detail.detail, "disk I/O");
    }

    #[test]
    fn client_errors_carry_no_detail() {
        let response = ServerError::NotFound("Contact not found".to_string()).into_response();
        assert!(response.extensions().get::<ErrorDetail>().is_none());
    }

    #[test]
    fn auth_error_challenges_for_basic() {
        let response = ServerError::Auth("bad credentials".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));
    }
}
