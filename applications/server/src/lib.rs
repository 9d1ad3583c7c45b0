//! Contacts Server Library
//!
//! Contacts REST API with per-verb model permissions and an email
//! notification on every deletion.
//!
//! This library exposes the core components for testing purposes.

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod router;
pub mod services;
pub mod state;

// Re-export commonly used types for convenience
pub use config::{MailBackend, NotificationFailurePolicy, ServerConfig};
pub use error::{Result, ServerError};
pub use router::create_router;
pub use services::{auth::AuthService, contacts::ContactService};
pub use state::AppState;
