//! Common test utilities and fixtures
//!
//! Each `TestApp` owns a fresh SQLite file in a temp dir, a set of users with
//! different grants and the real router.
#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use contacts_core::{Contact, ContactStore, IdentityStore, NewContact, Permission};
use contacts_server::{
    config::ServerConfig,
    create_router,
    services::{
        notifier::{NotifyError, Notifier},
        AuthService, MemoryNotifier,
    },
    AppState, NotificationFailurePolicy,
};
use contacts_storage::Database;
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;

pub const PASSWORD: &str = "correct-horse";
pub const TARGET: &str = "ops@example.com";
pub const SENDER: &str = "noreply@example.com";

/// Test users and what they hold
pub mod users {
    pub const ADMIN: &str = "admin";
    pub const READER: &str = "reader";
    pub const WRITER: &str = "writer";
    pub const CHANGER: &str = "changer";
    pub const DELETER: &str = "deleter";
    pub const NOBODY: &str = "nobody";
}

/// Emails seeded as contacts, in insertion order
pub const SEEDED_EMAILS: [&str; 4] = ["a@b.com", "a@c.com", "a@d.com", "a@z.com"];

pub struct TestApp {
    pub router: Router,
    pub db: Database,
    pub auth_service: AuthService,
    pub notifier: MemoryNotifier,
    pub seeded: Vec<Contact>,
    _temp_dir: TempDir,
}

/// Notifier whose relay is always down
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn notify_deletion(&self, _fields: &[(&str, String)]) -> Result<(), NotifyError> {
        Err(NotifyError::Unavailable("relay refused connection".to_string()))
    }
}

pub fn test_config(debug: bool, policy: NotificationFailurePolicy) -> ServerConfig {
    let policy = match policy {
        NotificationFailurePolicy::Abort => "abort",
        NotificationFailurePolicy::Proceed => "proceed",
    };
    let mut config = ServerConfig::from_sources(None, |name| {
        let value = match name {
            "SECRET_KEY" => "test-secret-key",
            "NOTIFICATION_TARGET" => TARGET,
            "NOTIFICATION_FAILURE_POLICY" => policy,
            "EMAIL_BACKEND" => "memory",
            "EMAIL_HOST_USER" => SENDER,
            "DEBUG" => {
                if debug {
                    "True"
                } else {
                    "False"
                }
            }
            _ => return None,
        };
        Some(value.to_string())
    })
    .expect("Failed to build test config");
    config.auth.bcrypt_cost = 4;
    config
}

impl TestApp {
    /// App with an in-memory outbox and the default failure policy
    pub async fn new() -> Self {
        let notifier = MemoryNotifier::new(SENDER, TARGET);
        Self::build(
            test_config(false, NotificationFailurePolicy::Abort),
            notifier.clone(),
            Arc::new(notifier),
        )
        .await
    }

    /// App whose notifier always fails
    pub async fn with_failing_notifier(policy: NotificationFailurePolicy, debug: bool) -> Self {
        Self::build(
            test_config(debug, policy),
            MemoryNotifier::new(SENDER, TARGET),
            Arc::new(FailingNotifier),
        )
        .await
    }

    async fn build(
        config: ServerConfig,
        outbox: MemoryNotifier,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("contacts.db");
        let db = Database::connect(&format!("sqlite://{}", db_path.display()))
            .await
            .expect("Failed to create test database");

        let auth_service = AuthService::new(config.auth.secret_key.clone(), 1, 1)
            .with_bcrypt_cost(config.auth.bcrypt_cost);

        let password_hash = auth_service.hash_password(PASSWORD).unwrap();
        let accounts: [(&str, bool, &[Permission]); 6] = [
            (users::ADMIN, true, &[]),
            (users::READER, false, &[Permission::View]),
            (users::WRITER, false, &[Permission::Add]),
            (users::CHANGER, false, &[Permission::Change]),
            (users::DELETER, false, &[Permission::Delete]),
            (users::NOBODY, false, &[]),
        ];
        for (username, superuser, grants) in accounts {
            let user = db
                .create_user(username, &password_hash, superuser)
                .await
                .unwrap();
            for permission in grants {
                db.grant_permission(user.id, *permission).await.unwrap();
            }
        }

        let mut seeded = Vec::new();
        for email in SEEDED_EMAILS {
            let contact = db
                .create_contact(NewContact {
                    name: email.split('@').nth(1).unwrap_or(email).to_string(),
                    email: email.to_string(),
                })
                .await
                .unwrap();
            seeded.push(contact);
        }

        let state = AppState::with_notifier(config, db.clone(), notifier);

        Self {
            router: create_router(state),
            db,
            auth_service,
            notifier: outbox,
            seeded,
            _temp_dir: temp_dir,
        }
    }

    /// Send a request as `user` (Basic auth) or anonymously
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        user: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let authorization =
            user.map(|username| format!("Basic {}", basic_credentials(username, PASSWORD)));
        self.send(method, uri, authorization, body).await
    }

    /// Send a request with a raw `Authorization` header value
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        authorization: Option<String>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(authorization) = authorization {
            builder = builder.header(header::AUTHORIZATION, authorization);
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    pub async fn contact_count(&self) -> usize {
        self.db.list_contacts().await.unwrap().len()
    }
}

pub fn basic_credentials(username: &str, password: &str) -> String {
    STANDARD.encode(format!("{}:{}", username, password))
}

pub fn emails(body: &Value) -> Vec<String> {
    body.as_array()
        .expect("expected a JSON array")
        .iter()
        .map(|c| c["email"].as_str().unwrap().to_string())
        .collect()
}
