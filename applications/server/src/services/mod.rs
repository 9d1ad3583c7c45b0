/// Server services
pub mod auth;
pub mod contacts;
pub mod notifier;

pub use auth::AuthService;
pub use contacts::ContactService;
pub use notifier::{MemoryNotifier, Notifier, SmtpNotifier};
