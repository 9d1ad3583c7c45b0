/// API route modules
pub mod auth;
pub mod contacts;
pub mod health;
