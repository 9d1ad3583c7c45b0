//! User management, credentials and permission grants

use contacts_core::{error::Result, ContactsError, GrantSet, Permission, User, UserId};
use sqlx::SqlitePool;

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    password_hash: String,
    is_superuser: bool,
    created_at: i64,
}

impl UserRow {
    fn into_user(self, grants: GrantSet) -> User {
        let created_at = chrono::DateTime::from_timestamp(self.created_at, 0)
            .map(|dt| dt.to_rfc3339())
            .unwrap_or_default();

        User {
            id: self.id,
            username: self.username,
            is_superuser: self.is_superuser,
            grants,
            created_at,
        }
    }
}

const SELECT_USER: &str =
    "SELECT id, username, password_hash, is_superuser, created_at FROM users";

/// Grants held by a user
///
/// Codenames this build does not know are skipped.
pub async fn get_grants(pool: &SqlitePool, user_id: UserId) -> Result<GrantSet> {
    let codenames: Vec<String> =
        sqlx::query_scalar("SELECT codename FROM user_permissions WHERE user_id = ?")
            .bind(user_id)
            .fetch_all(pool)
            .await?;

    Ok(codenames
        .iter()
        .filter_map(|c| Permission::from_codename(c))
        .collect())
}

pub async fn get_by_id(pool: &SqlitePool, id: UserId) -> Result<Option<User>> {
    let row = sqlx::query_as::<_, UserRow>(&format!("{SELECT_USER} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => {
            let grants = get_grants(pool, row.id).await?;
            Ok(Some(row.into_user(grants)))
        }
        None => Ok(None),
    }
}

/// Find a user by login name together with its password hash
pub async fn find_credentials(pool: &SqlitePool, username: &str) -> Result<Option<(User, String)>> {
    let row = sqlx::query_as::<_, UserRow>(&format!("{SELECT_USER} WHERE username = ?"))
        .bind(username)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => {
            let grants = get_grants(pool, row.id).await?;
            let hash = row.password_hash.clone();
            Ok(Some((row.into_user(grants), hash)))
        }
        None => Ok(None),
    }
}

pub async fn get_all(pool: &SqlitePool) -> Result<Vec<User>> {
    let rows = sqlx::query_as::<_, UserRow>(&format!("{SELECT_USER} ORDER BY username"))
        .fetch_all(pool)
        .await?;

    let mut users = Vec::with_capacity(rows.len());
    for row in rows {
        let grants = get_grants(pool, row.id).await?;
        users.push(row.into_user(grants));
    }

    Ok(users)
}

/// Create a user; `password_hash` must already be hashed
pub async fn create(
    pool: &SqlitePool,
    username: &str,
    password_hash: &str,
    is_superuser: bool,
) -> Result<User> {
    let result = sqlx::query(
        "INSERT INTO users (username, password_hash, is_superuser) VALUES (?, ?, ?)",
    )
    .bind(username)
    .bind(password_hash)
    .bind(is_superuser)
    .execute(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => {
            ContactsError::Duplicate(format!("username '{}' is taken", username))
        }
        other => other.into(),
    })?;

    get_by_id(pool, result.last_insert_rowid())
        .await?
        .ok_or_else(|| ContactsError::storage("Failed to retrieve created user"))
}

/// Replace a user's password hash
pub async fn set_password_hash(pool: &SqlitePool, user_id: UserId, password_hash: &str) -> Result<()> {
    let result = sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
        .bind(password_hash)
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ContactsError::not_found("User", user_id));
    }

    Ok(())
}

pub async fn grant(pool: &SqlitePool, user_id: UserId, permission: Permission) -> Result<()> {
    ensure_exists(pool, user_id).await?;

    sqlx::query("INSERT OR IGNORE INTO user_permissions (user_id, codename) VALUES (?, ?)")
        .bind(user_id)
        .bind(permission.codename())
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn revoke(pool: &SqlitePool, user_id: UserId, permission: Permission) -> Result<()> {
    ensure_exists(pool, user_id).await?;

    sqlx::query("DELETE FROM user_permissions WHERE user_id = ? AND codename = ?")
        .bind(user_id)
        .bind(permission.codename())
        .execute(pool)
        .await?;

    Ok(())
}

async fn ensure_exists(pool: &SqlitePool, user_id: UserId) -> Result<()> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = ?)")
        .bind(user_id)
        .fetch_one(pool)
        .await?;

    if exists {
        Ok(())
    } else {
        Err(ContactsError::not_found("User", user_id))
    }
}
