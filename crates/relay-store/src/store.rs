//! Delivery capability trait and error type.

use crate::document::Document;

/// Error from a delivery attempt.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Recipient or sender address failed to parse.
    #[error("invalid mail address: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// Message composition failed.
    #[error("message composition failed: {0}")]
    Compose(#[from] lettre::error::Error),

    /// Attachment content type was rejected.
    #[error("invalid content type: {0}")]
    ContentType(#[from] lettre::message::header::ContentTypeErr),

    /// SMTP connect/upgrade/auth/send failure.
    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    /// HTTP request failed (network error, timeout, etc).
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] ureq::Error),

    /// HTTP response error (server returned error status).
    #[error("HTTP error: {status} - {body}")]
    HttpResponse {
        /// HTTP status code.
        status: u16,
        /// Response body (may contain error details).
        body: String,
    },

    /// Injected failure from the mock store.
    #[cfg(any(test, feature = "mock"))]
    #[error("injected delivery failure: {0}")]
    Mock(String),
}

/// Delivery backend for scanned documents.
///
/// `submit` transmits the document's bytes to the configured destination.
/// It never touches the source share; purging delivered files is the
/// caller's job. Exactly one implementation is active per process,
/// selected at startup by the operating mode.
pub trait DocumentStore: Send + Sync {
    /// Deliver one document.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if any step of the delivery chain fails; the
    /// caller must then leave the source file in place for retry.
    fn submit(&self, document: &Document) -> Result<(), StoreError>;
}
