/// Contact resource controller
///
/// Every operation checks the caller's permission before it looks at the id,
/// the payload or the store, so a caller without access never learns whether
/// an id exists or what a valid body looks like. A missing record is reported
/// before an invalid payload.
use crate::config::NotificationFailurePolicy;
use crate::error::{Result, ServerError};
use crate::services::notifier::Notifier;
use contacts_core::{
    serialization, Action, Authorizer, Contact, ContactId, ContactStore, Identity,
};
use serde_json::Value;
use std::sync::Arc;

/// Request body as received; malformed JSON is already a `BadRequest`
pub type Payload = Result<Value>;

pub struct ContactService {
    store: Arc<dyn ContactStore>,
    authorizer: Arc<dyn Authorizer>,
    notifier: Arc<dyn Notifier>,
    failure_policy: NotificationFailurePolicy,
}

/// Ids that are not integers name no record
fn parse_id(raw: &str) -> Result<ContactId> {
    raw.parse::<ContactId>()
        .map_err(|_| ServerError::NotFound("Contact not found".to_string()))
}

impl ContactService {
    pub fn new(
        store: Arc<dyn ContactStore>,
        authorizer: Arc<dyn Authorizer>,
        notifier: Arc<dyn Notifier>,
        failure_policy: NotificationFailurePolicy,
    ) -> Self {
        Self {
            store,
            authorizer,
            notifier,
            failure_policy,
        }
    }

    fn authorize(&self, identity: &Identity, action: Action) -> Result<()> {
        Ok(self.authorizer.authorize(identity, action)?)
    }

    pub async fn list(&self, identity: &Identity) -> Result<Vec<Contact>> {
        self.authorize(identity, Action::List)?;
        Ok(self.store.list_contacts().await?)
    }

    pub async fn create(&self, identity: &Identity, payload: Payload) -> Result<Contact> {
        self.authorize(identity, Action::Create)?;
        let new_contact = serialization::decode_create(&payload?)?;

        let contact = self.store.create_contact(new_contact).await?;
        tracing::info!(
            "Contact {} created by {}",
            contact.id,
            identity.username()
        );
        Ok(contact)
    }

    pub async fn retrieve(&self, identity: &Identity, id: &str) -> Result<Contact> {
        self.authorize(identity, Action::Retrieve)?;
        let id = parse_id(id)?;
        Ok(self.store.get_contact(id).await?)
    }

    /// Full update; both fields must be supplied
    pub async fn update(&self, identity: &Identity, id: &str, payload: Payload) -> Result<Contact> {
        self.authorize(identity, Action::Update)?;
        let id = parse_id(id)?;
        self.store.get_contact(id).await?;

        let replacement = serialization::decode_replace(&payload?)?;
        Ok(self.store.update_contact(id, replacement.into()).await?)
    }

    pub async fn partial_update(
        &self,
        identity: &Identity,
        id: &str,
        payload: Payload,
    ) -> Result<Contact> {
        self.authorize(identity, Action::PartialUpdate)?;
        let id = parse_id(id)?;
        self.store.get_contact(id).await?;

        let changes = serialization::decode_partial(&payload?)?;
        Ok(self.store.update_contact(id, changes).await?)
    }

    /// Notify about the record, then delete it
    pub async fn destroy(&self, identity: &Identity, id: &str) -> Result<()> {
        self.authorize(identity, Action::Destroy)?;
        let id = parse_id(id)?;
        let contact = self.store.get_contact(id).await?;

        if let Err(e) = self.notifier.notify_deletion(&contact.fields()).await {
            match self.failure_policy {
                NotificationFailurePolicy::Abort => {
                    return Err(ServerError::Notification(format!(
                        "contact {} kept: {}",
                        id, e
                    )));
                }
                NotificationFailurePolicy::Proceed => {
                    tracing::warn!(
                        "Deletion notification for contact {} failed, deleting anyway: {}",
                        id,
                        e
                    );
                }
            }
        }

        self.store.delete_contact(id).await?;
        tracing::info!("Contact {} deleted by {}", id, identity.username());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MemoryNotifier;
    use contacts_core::{GrantSet, ModelPermissions, NewContact, Permission};
    use contacts_storage::Database;
    use serde_json::json;
    use tempfile::TempDir;

    async fn service() -> (ContactService, Database, MemoryNotifier, TempDir) {
        let temp_dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", temp_dir.path().join("contacts.db").display());
        let db = Database::connect(&url).await.unwrap();
        let notifier = MemoryNotifier::new("noreply@example.com", "ops@example.com");

        let service = ContactService::new(
            Arc::new(db.clone()),
            Arc::new(ModelPermissions),
            Arc::new(notifier.clone()),
            NotificationFailurePolicy::Abort,
        );
        (service, db, notifier, temp_dir)
    }

    fn holding(permission: Permission) -> Identity {
        Identity::user(7, "someone", false, GrantSet::from_iter([permission]))
    }

    fn malformed() -> Payload {
        Err(ServerError::BadRequest("EOF while parsing".to_string()))
    }

    #[tokio::test]
    async fn denial_wins_over_bad_id_and_bad_payload() {
        let (service, _db, notifier, _dir) = service().await;
        let reader = holding(Permission::View);

        let err = service
            .partial_update(&reader, "not-a-number", malformed())
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::Forbidden(_)));

        let err = service.create(&reader, malformed()).await.unwrap_err();
        assert!(matches!(err, ServerError::Forbidden(_)));

        let err = service.destroy(&reader, "9999").await.unwrap_err();
        assert!(matches!(err, ServerError::Forbidden(_)));
        assert!(notifier.outbox().is_empty());
    }

    #[tokio::test]
    async fn missing_record_wins_over_bad_payload() {
        let (service, _db, _notifier, _dir) = service().await;
        let changer = holding(Permission::Change);

        let err = service
            .partial_update(&changer, "9999", malformed())
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::NotFound(_)));

        let err = service
            .update(&changer, "abc", Ok(json!({})))
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::NotFound(_)));
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request_for_permitted_caller() {
        let (service, db, _notifier, _dir) = service().await;
        let contact = db
            .create_contact(NewContact {
                name: "a".to_string(),
                email: "a@b.com".to_string(),
            })
            .await
            .unwrap();

        let err = service
            .partial_update(&holding(Permission::Change), &contact.id.to_string(), malformed())
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::BadRequest(_)));
    }
}
