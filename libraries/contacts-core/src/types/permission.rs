//! Permissions on the contact resource and the actions that require them

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// A permission scoped to the contact resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    View,
    Add,
    Change,
    Delete,
}

impl Permission {
    pub const ALL: [Permission; 4] = [
        Permission::View,
        Permission::Add,
        Permission::Change,
        Permission::Delete,
    ];

    /// Codename stored in the `user_permissions` table
    pub const fn codename(&self) -> &'static str {
        match self {
            Permission::View => "view_contact",
            Permission::Add => "add_contact",
            Permission::Change => "change_contact",
            Permission::Delete => "delete_contact",
        }
    }

    pub fn from_codename(codename: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.codename() == codename)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Permission::View => "view",
            Permission::Add => "add",
            Permission::Change => "change",
            Permission::Delete => "delete",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = String;

    /// Accepts both the short form (`view`) and the codename (`view_contact`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == lowered || p.codename() == lowered)
            .ok_or_else(|| {
                format!(
                    "unknown permission '{}' (expected one of: view, add, change, delete)",
                    s
                )
            })
    }
}

/// The set of permissions granted to a user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GrantSet(BTreeSet<Permission>);

impl GrantSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(&mut self, permission: Permission) -> bool {
        self.0.insert(permission)
    }

    pub fn revoke(&mut self, permission: Permission) -> bool {
        self.0.remove(&permission)
    }

    pub fn contains(&self, permission: Permission) -> bool {
        self.0.contains(&permission)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Permission> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Permission> for GrantSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for GrantSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = self.iter().map(|p| p.as_str()).collect();
        f.write_str(&names.join(","))
    }
}

/// Operations exposed by the contact resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    List,
    Retrieve,
    Create,
    Update,
    PartialUpdate,
    Destroy,
}

impl Action {
    /// Permission a caller must hold to perform this action
    pub const fn required_permission(&self) -> Permission {
        match self {
            Action::List | Action::Retrieve => Permission::View,
            Action::Create => Permission::Add,
            Action::Update | Action::PartialUpdate => Permission::Change,
            Action::Destroy => Permission::Delete,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Action::List => "list",
            Action::Retrieve => "retrieve",
            Action::Create => "create",
            Action::Update => "update",
            Action::PartialUpdate => "partial_update",
            Action::Destroy => "destroy",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
