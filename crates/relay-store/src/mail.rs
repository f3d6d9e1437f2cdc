//! Mail delivery backend.
//!
//! Wraps the scan as an email attachment and sends it through the
//! configured SMTP relay: connect, upgrade to STARTTLS, authenticate,
//! send. Any failure in that chain fails the submit and leaves the source
//! file in place for retry.

use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::info;

use crate::document::{Document, sniff_content_type};
use crate::store::{DocumentStore, StoreError};

/// Fixed plain-text body accompanying every scan.
const NOTICE: &str = "Hey!

I found a new scan on your printer. You can find it in the attachments :)

Regards
Scan-Bot
";

/// Mail destination configuration.
///
/// Immutable after startup; shared read-only by every cycle.
#[derive(Debug, Clone)]
pub struct MailConfig {
    /// From address (defaults to the SMTP user at the config layer).
    pub from: String,
    /// Recipient addresses.
    pub to: Vec<String>,
    /// SMTP username.
    pub user: String,
    /// SMTP password.
    pub password: String,
    /// SMTP host.
    pub host: String,
    /// SMTP port.
    pub port: u16,
}

/// Delivery backend that mails scans as attachments.
pub struct MailStore {
    config: MailConfig,
}

impl MailStore {
    /// Create a mail store from validated configuration.
    #[must_use]
    pub fn new(config: MailConfig) -> Self {
        Self { config }
    }

    /// Compose the message for one document.
    fn compose(&self, document: &Document) -> Result<Message, StoreError> {
        let mut builder = Message::builder()
            .from(self.config.from.parse::<Mailbox>()?)
            .subject("New Scan!");
        for recipient in &self.config.to {
            builder = builder.to(recipient.parse::<Mailbox>()?);
        }

        // Content type comes from the payload's magic bytes; the share's
        // extension is not trusted.
        let content_type = ContentType::parse(sniff_content_type(&document.payload))?;
        let attachment = Attachment::new(document.delivery_name())
            .body(document.payload.clone(), content_type);

        Ok(builder.multipart(
            MultiPart::mixed()
                .singlepart(attachment)
                .singlepart(SinglePart::plain(NOTICE.to_owned())),
        )?)
    }
}

impl DocumentStore for MailStore {
    fn submit(&self, document: &Document) -> Result<(), StoreError> {
        let message = self.compose(document)?;

        // Fresh session per delivery; the relay is the connection owner.
        let mailer = SmtpTransport::starttls_relay(&self.config.host)?
            .port(self.config.port)
            .credentials(Credentials::new(
                self.config.user.clone(),
                self.config.password.clone(),
            ))
            .build();
        mailer.send(&message)?;

        info!(
            source = %document.source_path,
            attachment = %document.delivery_name(),
            "scan mailed"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use pretty_assertions::assert_eq;

    use super::*;

    fn store() -> MailStore {
        MailStore::new(MailConfig {
            from: "scanner@example.com".to_owned(),
            to: vec!["inbox@example.com".to_owned(), "other@example.com".to_owned()],
            user: "scanner@example.com".to_owned(),
            password: "secret".to_owned(),
            host: "smtp.example.com".to_owned(),
            port: 587,
        })
    }

    fn jpeg_document() -> Document {
        Document::new(
            "/EPSCAN/001/img001.jpg".to_owned(),
            SystemTime::UNIX_EPOCH,
            vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00],
        )
    }

    #[test]
    fn test_compose_is_multipart_with_attachment() {
        let message = store().compose(&jpeg_document()).unwrap();

        let formatted = String::from_utf8(message.formatted()).unwrap();
        assert!(formatted.contains("Subject: New Scan!"));
        assert!(formatted.contains("multipart/mixed"));
        assert!(formatted.contains("Content-Type: image/jpeg"));
        assert!(formatted.contains(&format!(
            "filename=\"{}\"",
            jpeg_document().delivery_name()
        )));
        assert!(formatted.contains("I found a new scan on your printer"));
    }

    #[test]
    fn test_compose_addresses_all_recipients() {
        let message = store().compose(&jpeg_document()).unwrap();

        let recipients: Vec<String> =
            message.envelope().to().iter().map(ToString::to_string).collect();
        assert_eq!(
            recipients,
            vec!["inbox@example.com".to_owned(), "other@example.com".to_owned()]
        );
    }

    #[test]
    fn test_compose_rejects_bad_recipient() {
        let mut config = store().config;
        config.to = vec!["not an address".to_owned()];
        let store = MailStore::new(config);

        let result = store.compose(&jpeg_document());

        assert!(matches!(result, Err(StoreError::Address(_))));
    }
}
