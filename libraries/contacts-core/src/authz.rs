//! Permission gate for the contact resource
//!
//! Authorization is a pure decision over `(identity, action)`. It never looks
//! at stored records, so a denial is always reported independently of
//! whether the addressed contact exists.

use crate::types::{Action, Identity, Permission};
use thiserror::Error;

/// The caller lacks the permission an action requires
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{username} may not {action} contacts (requires {required})")]
pub struct AccessDenied {
    pub username: String,
    pub action: Action,
    pub required: Permission,
}

/// Decides whether an identity may perform an action on contacts
pub trait Authorizer: Send + Sync {
    fn can_view(&self, identity: &Identity) -> bool;

    fn can_add(&self, identity: &Identity) -> bool;

    fn can_change(&self, identity: &Identity) -> bool;

    fn can_delete(&self, identity: &Identity) -> bool;

    /// Check the permission `action` requires
    fn authorize(&self, identity: &Identity, action: Action) -> Result<(), AccessDenied> {
        let required = action.required_permission();
        let allowed = match required {
            Permission::View => self.can_view(identity),
            Permission::Add => self.can_add(identity),
            Permission::Change => self.can_change(identity),
            Permission::Delete => self.can_delete(identity),
        };

        if allowed {
            Ok(())
        } else {
            Err(AccessDenied {
                username: identity.username().to_string(),
                action,
                required,
            })
        }
    }
}

/// Grant-set backed authorizer
///
/// Superusers hold every permission, anonymous callers hold none, everybody
/// else holds exactly what was granted to them.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelPermissions;

impl ModelPermissions {
    fn has(identity: &Identity, permission: Permission) -> bool {
        match identity {
            Identity::Anonymous => false,
            Identity::User {
                is_superuser: true, ..
            } => true,
            Identity::User { grants, .. } => grants.contains(permission),
        }
    }
}

impl Authorizer for ModelPermissions {
    fn can_view(&self, identity: &Identity) -> bool {
        Self::has(identity, Permission::View)
    }

    fn can_add(&self, identity: &Identity) -> bool {
        Self::has(identity, Permission::Add)
    }

    fn can_change(&self, identity: &Identity) -> bool {
        Self::has(identity, Permission::Change)
    }

    fn can_delete(&self, identity: &Identity) -> bool {
        Self::has(identity, Permission::Delete)
    }
}
