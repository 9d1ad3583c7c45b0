//! Contact queries

use contacts_core::{error::Result, Contact, ContactChanges, ContactId, ContactsError, NewContact};
use sqlx::SqlitePool;

#[derive(sqlx::FromRow)]
struct ContactRow {
    id: i64,
    name: String,
    email: String,
}

impl From<ContactRow> for Contact {
    fn from(row: ContactRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
        }
    }
}

pub async fn get_all(pool: &SqlitePool) -> Result<Vec<Contact>> {
    let rows = sqlx::query_as::<_, ContactRow>("SELECT id, name, email FROM contacts ORDER BY id")
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(Contact::from).collect())
}

pub async fn get_by_id(pool: &SqlitePool, id: ContactId) -> Result<Option<Contact>> {
    let row =
        sqlx::query_as::<_, ContactRow>("SELECT id, name, email FROM contacts WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;

    Ok(row.map(Contact::from))
}

pub async fn create(pool: &SqlitePool, contact: NewContact) -> Result<Contact> {
    let result = sqlx::query("INSERT INTO contacts (name, email) VALUES (?, ?)")
        .bind(&contact.name)
        .bind(&contact.email)
        .execute(pool)
        .await?;

    Ok(Contact {
        id: result.last_insert_rowid(),
        name: contact.name,
        email: contact.email,
    })
}

/// Update only the provided columns in a single statement
///
/// `COALESCE` keeps the stored value for absent fields, so concurrent partial
/// updates touching different fields do not overwrite each other.
pub async fn update(pool: &SqlitePool, id: ContactId, changes: ContactChanges) -> Result<Contact> {
    let row = sqlx::query_as::<_, ContactRow>(
        "UPDATE contacts
         SET name = COALESCE(?, name), email = COALESCE(?, email)
         WHERE id = ?
         RETURNING id, name, email",
    )
    .bind(changes.name)
    .bind(changes.email)
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| ContactsError::not_found("Contact", id))?;

    Ok(row.into())
}

pub async fn delete(pool: &SqlitePool, id: ContactId) -> Result<()> {
    let result = sqlx::query("DELETE FROM contacts WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ContactsError::not_found("Contact", id));
    }

    Ok(())
}
