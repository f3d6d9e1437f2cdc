//! WebDAV delivery backend.
//!
//! Uploads the raw scan bytes to a WebDAV collection with HTTP Basic
//! authentication. Sync client; one `PUT` per document.

use std::time::Duration;

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use tracing::info;
use ureq::Agent;

use crate::document::Document;
use crate::store::{DocumentStore, StoreError};

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// Characters escaped in a URL path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'?')
    .add(b'{')
    .add(b'}');

/// WebDAV destination configuration.
///
/// Immutable after startup; shared read-only by every cycle.
#[derive(Debug, Clone)]
pub struct WebDavConfig {
    /// Server URL, e.g. `https://dav.example.com`.
    pub host: String,
    /// Basic auth username.
    pub user: String,
    /// Basic auth password.
    pub password: String,
    /// Collection path uploads go into; empty means the root collection.
    pub base_path: String,
}

/// Delivery backend that uploads scans to a WebDAV collection.
pub struct WebDavStore {
    agent: Agent,
    config: WebDavConfig,
}

impl WebDavStore {
    /// Create a WebDAV store from validated configuration.
    #[must_use]
    pub fn new(config: WebDavConfig) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT)))
            .http_status_as_error(false)
            .build()
            .into();

        Self { agent, config }
    }

    /// Target URL for one document.
    fn upload_url(&self, document: &Document) -> String {
        let host = self.config.host.trim_end_matches('/');
        let base = normalize_base_path(&self.config.base_path);
        let delivery_name = document.delivery_name();
        let name = utf8_percent_encode(&delivery_name, PATH_SEGMENT);
        format!("{host}{base}/{name}")
    }

    /// Basic auth header value.
    fn auth_header(&self) -> String {
        let credentials = format!("{}:{}", self.config.user, self.config.password);
        format!("Basic {}", BASE64_STANDARD.encode(credentials))
    }
}

/// Normalize a base path to `""` (root) or `/segment/...` without a
/// trailing slash.
fn normalize_base_path(base: &str) -> String {
    let trimmed = base.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

impl DocumentStore for WebDavStore {
    fn submit(&self, document: &Document) -> Result<(), StoreError> {
        let url = self.upload_url(document);

        let response = self
            .agent
            .put(&url)
            .header("Authorization", &self.auth_header())
            .header("Content-Type", "application/octet-stream")
            .send(&document.payload[..])?;

        let status = response.status().as_u16();
        if status >= 400 {
            let body = response
                .into_body()
                .read_to_string()
                .unwrap_or_else(|_| "(unable to read error body)".to_owned());
            return Err(StoreError::HttpResponse { status, body });
        }

        info!(source = %document.source_path, url = %url, "scan uploaded");
        Ok(())
    }
}
