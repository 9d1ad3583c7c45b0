//! Contacts Core
//!
//! Storage-agnostic domain types, traits, and error handling for the contacts
//! service.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Contact`, `User`, `Identity`, `Permission`, `Action`
//! - **Permission Gate**: the `Authorizer` trait and its grant-set backed
//!   `ModelPermissions` implementation
//! - **Serialization**: decoding and validation of contact payloads
//! - **Storage Traits**: `ContactStore` and `IdentityStore`
//! - **Error Handling**: unified `ContactsError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use contacts_core::{Action, Authorizer, GrantSet, Identity, ModelPermissions, Permission};
//!
//! let reader = Identity::user(1, "reader", false, GrantSet::from_iter([Permission::View]));
//! let gate = ModelPermissions;
//!
//! assert!(gate.authorize(&reader, Action::List).is_ok());
//! assert!(gate.authorize(&reader, Action::Destroy).is_err());
//! ```

#![forbid(unsafe_code)]

pub mod authz;
pub mod error;
pub mod serialization;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use authz::{AccessDenied, Authorizer, ModelPermissions};
pub use error::{ContactsError, Result};
pub use serialization::{ValidationErrors, NON_FIELD_ERRORS};
pub use storage::{ContactStore, IdentityStore};
pub use types::{
    Action, Contact, ContactChanges, ContactId, GrantSet, Identity, NewContact, Permission,
    User, UserId,
};
