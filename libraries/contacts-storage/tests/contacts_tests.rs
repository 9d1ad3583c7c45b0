use contacts_core::{ContactChanges, ContactStore, NewContact};

use test_helpers::{create_test_contact, TestDb};

#[tokio::test]
async fn test_create_and_get_contact() {
    let test_db = TestDb::new().await;
    let db = &test_db.db;

    let created = db
        .create_contact(NewContact {
            name: "a".to_string(),
            email: "b@c.com".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(created.name, "a");
    assert_eq!(created.email, "b@c.com");

    // Id is stable across retrievals
    let first = db.get_contact(created.id).await.unwrap();
    let second = db.get_contact(created.id).await.unwrap();
    assert_eq!(first, created);
    assert_eq!(second, created);
}

#[tokio::test]
async fn test_get_missing_contact_is_not_found() {
    let test_db = TestDb::new().await;

    let err = test_db.db.get_contact(404).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_list_is_in_insertion_order() {
    let test_db = TestDb::new().await;
    let db = &test_db.db;

    let z = create_test_contact(db, "a@z.com").await;
    let b = create_test_contact(db, "a@b.com").await;
    let c = create_test_contact(db, "a@c.com").await;

    // Updating must not reorder
    db.update_contact(
        z.id,
        ContactChanges {
            name: Some("zzz".to_string()),
            email: None,
        },
    )
    .await
    .unwrap();

    let ids: Vec<_> = db
        .list_contacts()
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(ids, vec![z.id, b.id, c.id]);
}

#[tokio::test]
async fn test_partial_update_merges_fields() {
    let test_db = TestDb::new().await;
    let db = &test_db.db;

    let contact = create_test_contact(db, "a@z.com").await;

    let updated = db
        .update_contact(
            contact.id,
            ContactChanges {
                name: Some("newname!".to_string()),
                email: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.id, contact.id);
    assert_eq!(updated.name, "newname!");
    assert_eq!(updated.email, "a@z.com");
    assert_eq!(db.get_contact(contact.id).await.unwrap(), updated);
}

#[tokio::test]
async fn test_update_is_idempotent() {
    let test_db = TestDb::new().await;
    let db = &test_db.db;

    let contact = create_test_contact(db, "a@z.com").await;
    let changes = ContactChanges {
        name: Some("n".to_string()),
        email: None,
    };

    let once = db.update_contact(contact.id, changes.clone()).await.unwrap();
    let twice = db.update_contact(contact.id, changes).await.unwrap();
    assert_eq!(once, twice);
}

#[tokio::test]
async fn test_update_missing_contact_is_not_found() {
    let test_db = TestDb::new().await;

    let err = test_db
        .db
        .update_contact(
            12,
            ContactChanges {
                name: Some("x".to_string()),
                email: None,
            },
        )
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_delete_removes_contact() {
    let test_db = TestDb::new().await;
    let db = &test_db.db;

    let keep = create_test_contact(db, "a@b.com").await;
    let gone = create_test_contact(db, "a@c.com").await;

    db.delete_contact(gone.id).await.unwrap();

    let remaining = db.list_contacts().await.unwrap();
    assert_eq!(remaining, vec![keep]);
    assert!(db.get_contact(gone.id).await.unwrap_err().is_not_found());

    // Deleting again reports not found instead of success
    assert!(db.delete_contact(gone.id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_ids_are_never_reused() {
    let test_db = TestDb::new().await;
    let db = &test_db.db;

    let first = create_test_contact(db, "a@b.com").await;
    db.delete_contact(first.id).await.unwrap();
    let second = create_test_contact(db, "a@b.com").await;

    assert!(second.id > first.id);
}
