//! Document model and delivery backends for scanrelay.
//!
//! A [`Document`] is one fetched scan: source path, modification time,
//! extension and raw bytes. The [`DocumentStore`] trait is the single
//! delivery capability — `submit` transmits a document's bytes to the
//! configured destination and never touches the source share. Exactly one
//! store implementation is active per process:
//!
//! - [`MailStore`] wraps the scan as an email attachment and sends it over
//!   authenticated STARTTLS SMTP.
//! - [`WebDavStore`] uploads the raw bytes to a WebDAV collection.
//! - [`MockStore`] records submissions for tests (behind the `mock`
//!   feature).

mod document;
mod mail;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod store;
mod webdav;

pub use document::{Document, sniff_content_type};
pub use mail::{MailConfig, MailStore};
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockStore, Submission};
pub use store::{DocumentStore, StoreError};
pub use webdav::{WebDavConfig, WebDavStore};
