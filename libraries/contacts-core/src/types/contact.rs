//! Contact types

use serde::{Deserialize, Serialize};

pub type ContactId = i64;

/// A stored contact
///
/// Serializes to the wire representation `{id, name, email}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: ContactId,
    pub name: String,
    pub email: String,
}

impl Contact {
    /// Every field of the record as ordered `(field, value)` pairs
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("id", self.id.to_string()),
            ("name", self.name.clone()),
            ("email", self.email.clone()),
        ]
    }
}

/// Data for creating (or fully replacing) a contact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContact {
    pub name: String,
    pub email: String,
}

/// Partial update of a contact; `None` leaves the stored value untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactChanges {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl ContactChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none()
    }

    /// Merge the provided fields onto an existing contact
    pub fn apply_to(&self, contact: &mut Contact) {
        if let Some(name) = &self.name {
            contact.name.clone_from(name);
        }
        if let Some(email) = &self.email {
            contact.email.clone_from(email);
        }
    }
}

impl From<NewContact> for ContactChanges {
    fn from(contact: NewContact) -> Self {
        Self {
            name: Some(contact.name),
            email: Some(contact.email),
        }
    }
}
