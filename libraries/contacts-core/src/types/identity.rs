//! The caller on whose behalf a request runs

use super::{GrantSet, User, UserId};

/// Identity of the caller, as resolved by the authentication layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    /// No credentials were presented
    Anonymous,
    /// An authenticated user together with its grants
    User {
        id: UserId,
        username: String,
        is_superuser: bool,
        grants: GrantSet,
    },
}

impl Identity {
    pub fn user(id: UserId, username: impl Into<String>, is_superuser: bool, grants: GrantSet) -> Self {
        Self::User {
            id,
            username: username.into(),
            is_superuser,
            grants,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::User { .. })
    }

    pub fn is_superuser(&self) -> bool {
        matches!(self, Self::User { is_superuser: true, .. })
    }

    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Self::Anonymous => None,
            Self::User { id, .. } => Some(*id),
        }
    }

    /// Name used in logs
    pub fn username(&self) -> &str {
        match self {
            Self::Anonymous => "anonymous",
            Self::User { username, .. } => username,
        }
    }

    pub fn grants(&self) -> Option<&GrantSet> {
        match self {
            Self::Anonymous => None,
            Self::User { grants, .. } => Some(grants),
        }
    }
}

impl From<User> for Identity {
    fn from(user: User) -> Self {
        Self::User {
            id: user.id,
            username: user.username,
            is_superuser: user.is_superuser,
            grants: user.grants,
        }
    }
}
