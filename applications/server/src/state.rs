/// Shared application state
use crate::config::ServerConfig;
use crate::services::{notifier, AuthService, ContactService, Notifier};
use crate::error::{Result, ServerError};
use contacts_core::ModelPermissions;
use contacts_storage::Database;
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub db: Arc<Database>,
    pub auth_service: Arc<AuthService>,
    pub contacts: Arc<ContactService>,
}

impl AppState {
    pub fn new(
        config: Arc<ServerConfig>,
        db: Arc<Database>,
        auth_service: Arc<AuthService>,
        contacts: Arc<ContactService>,
    ) -> Self {
        Self {
            config,
            db,
            auth_service,
            contacts,
        }
    }

    /// Wire the services described by `config` around an open database
    pub fn from_config(config: ServerConfig, db: Database) -> Result<Self> {
        let notifier = notifier::from_config(&config.mail, &config.notification.target)
            .map_err(|e| ServerError::Config(e.to_string()))?;
        Ok(Self::with_notifier(config, db, notifier))
    }

    /// Like [`AppState::from_config`] with an explicit notifier
    pub fn with_notifier(config: ServerConfig, db: Database, notifier: Arc<dyn Notifier>) -> Self {
        let db = Arc::new(db);

        let auth_service = AuthService::new(
            config.auth.secret_key.clone(),
            config.auth.access_token_hours,
            config.auth.refresh_token_days,
        )
        .with_bcrypt_cost(config.auth.bcrypt_cost);

        let contacts = ContactService::new(
            db.clone(),
            Arc::new(ModelPermissions),
            notifier,
            config.notification.failure_policy,
        );

        Self::new(
            Arc::new(config),
            db,
            Arc::new(auth_service),
            Arc::new(contacts),
        )
    }
}
