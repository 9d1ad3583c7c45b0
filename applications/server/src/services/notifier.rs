/// Deletion notifier - emails a summary of a record before it is deleted
use crate::config::{MailBackend, MailSettings};
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub const DELETION_SUBJECT: &str = "deletion notification";

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Invalid address '{address}': {reason}")]
    Address { address: String, reason: String },

    #[error("Failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    #[error("Notifier unavailable: {0}")]
    Unavailable(String),
}

/// A rendered notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl Notification {
    pub fn deletion(from: &str, to: &str, fields: &[(&str, String)]) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            subject: DELETION_SUBJECT.to_string(),
            body: deletion_body(fields),
        }
    }
}

/// `notification on deletion of id=1, name=a, email=a@b.com`
pub fn deletion_body(fields: &[(&str, String)]) -> String {
    let pairs = fields
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join(", ");
    format!("notification on deletion of {}", pairs)
}

/// Sends deletion notifications
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send one notification describing the record about to be deleted
    async fn notify_deletion(&self, fields: &[(&str, String)]) -> Result<(), NotifyError>;
}

/// Build the notifier selected by the mail settings
pub fn from_config(
    mail: &MailSettings,
    target: &str,
) -> Result<Arc<dyn Notifier>, NotifyError> {
    let notifier: Arc<dyn Notifier> = match mail.backend {
        MailBackend::Smtp => Arc::new(SmtpNotifier::new(mail, target)?),
        MailBackend::Console => Arc::new(ConsoleNotifier::new(&mail.user, target)),
        MailBackend::Memory => Arc::new(MemoryNotifier::new(&mail.user, target)),
    };
    Ok(notifier)
}

fn parse_mailbox(address: &str) -> Result<Mailbox, NotifyError> {
    address.parse::<Mailbox>().map_err(|e| NotifyError::Address {
        address: address.to_string(),
        reason: e.to_string(),
    })
}

/// SMTP delivery through lettre's tokio transport
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpNotifier {
    pub fn new(mail: &MailSettings, target: &str) -> Result<Self, NotifyError> {
        let from = parse_mailbox(&mail.user)?;
        let to = parse_mailbox(target)?;

        let builder = if mail.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&mail.host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&mail.host)
        };

        let mut builder = builder.port(mail.port).timeout(mail.timeout());
        if !mail.user.is_empty() {
            builder = builder.credentials(Credentials::new(
                mail.user.clone(),
                mail.password.clone(),
            ));
        }

        Ok(Self {
            transport: builder.build(),
            from,
            to,
        })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn notify_deletion(&self, fields: &[(&str, String)]) -> Result<(), NotifyError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(DELETION_SUBJECT)
            .header(ContentType::TEXT_PLAIN)
            .body(deletion_body(fields))?;

        let response = self.transport.send(message).await?;
        tracing::debug!("SMTP relay accepted notification: {:?}", response.code());
        Ok(())
    }
}

/// Writes notifications to the log and stdout
pub struct ConsoleNotifier {
    from: String,
    to: String,
}

impl ConsoleNotifier {
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn notify_deletion(&self, fields: &[(&str, String)]) -> Result<(), NotifyError> {
        let notification = Notification::deletion(&self.from, &self.to, fields);
        tracing::info!(
            to = %notification.to,
            subject = %notification.subject,
            "{}",
            notification.body
        );
        println!(
            "From: {}\nTo: {}\nSubject: {}\n\n{}\n",
            notification.from, notification.to, notification.subject, notification.body
        );
        Ok(())
    }
}

/// Keeps notifications in memory
#[derive(Clone, Default)]
pub struct MemoryNotifier {
    from: String,
    to: String,
    outbox: Arc<Mutex<Vec<Notification>>>,
}

impl MemoryNotifier {
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            outbox: Arc::default(),
        }
    }

    /// Everything sent so far, oldest first
    pub fn outbox(&self) -> Vec<Notification> {
        self.outbox
            .lock()
            .map(|outbox| outbox.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Notifier for MemoryNotifier {
    async fn notify_deletion(&self, fields: &[(&str, String)]) -> Result<(), NotifyError> {
        let notification = Notification::deletion(&self.from, &self.to, fields);
        self.outbox
            .lock()
            .map_err(|_| NotifyError::Unavailable("outbox lock poisoned".to_string()))?
            .push(notification);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> Vec<(&'static str, String)> {
        vec![
            ("id", "7".to_string()),
            ("name", "a".to_string()),
            ("email", "a@b.com".to_string()),
        ]
    }

    #[test]
    fn body_lists_every_field_in_order() {
        assert_eq!(
            deletion_body(&fields()),
            "notification on deletion of id=7, name=a, email=a@b.com"
        );
    }

    #[tokio::test]
    async fn memory_notifier_records_each_send() {
        let notifier = MemoryNotifier::new("noreply@example.com", "ops@example.com");
        notifier.notify_deletion(&fields()).await.unwrap();

        let outbox = notifier.outbox();
        assert_eq!(outbox.len(), 1);
        assert_eq!(outbox[0].subject, DELETION_SUBJECT);
        assert_eq!(outbox[0].to, "ops@example.com");
        assert_eq!(outbox[0].from, "noreply@example.com");
        assert!(outbox[0].body.contains("email=a@b.com"));
    }

    #[tokio::test]
    async fn smtp_notifier_rejects_bad_target() {
        let mail = MailSettings {
            backend: MailBackend::Smtp,
            host: "localhost".to_string(),
            port: 2525,
            user: "noreply@example.com".to_string(),
            password: String::new(),
            use_tls: false,
            timeout_secs: Some(1),
        };
        let err = SmtpNotifier::new(&mail, "not an address").err().unwrap();
        assert!(matches!(err, NotifyError::Address { .. }));
    }
}
