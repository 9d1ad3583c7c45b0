pub mod auth;
pub mod errors;

pub use auth::{auth_middleware, AuthenticatedUser};
pub use errors::expose_error_detail;
