//! Domain types for the contacts service

mod contact;
mod identity;
mod permission;
mod user;

pub use contact::{Contact, ContactChanges, ContactId, NewContact};
pub use identity::Identity;
pub use permission::{Action, GrantSet, Permission};
pub use user::{User, UserId};
