//! In-memory representation of one discovered scan.

use std::time::SystemTime;

use chrono::{DateTime, Local};

/// One fetched scan.
///
/// Created when a discovered file is read off the share; owned by the
/// cycle iteration that created it and consumed by exactly one `submit`
/// call. The payload is the complete file content — scans are small
/// enough that buffering beats streaming complexity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Share-absolute source path.
    pub source_path: String,
    /// Modification time from the share's file metadata.
    pub modified: DateTime<Local>,
    /// Lowercased extension without the leading dot; may be empty.
    pub extension: String,
    /// Raw file bytes.
    pub payload: Vec<u8>,
}

impl Document {
    /// Build a document from a fetched file.
    #[must_use]
    pub fn new(source_path: String, modified: SystemTime, payload: Vec<u8>) -> Self {
        let extension = extension_of(&source_path);
        Self {
            source_path,
            modified: modified.into(),
            extension,
            payload,
        }
    }

    /// Delivery filename: `scan-<YYYY_MM_DD-HHMMSS>.<ext>`.
    ///
    /// The timestamp is the source file's modification time, not the
    /// delivery time, so redelivered files keep a stable name. No trailing
    /// dot when the extension is empty.
    #[must_use]
    pub fn delivery_name(&self) -> String {
        let timestamp = self.modified.format("%Y_%m_%d-%H%M%S");
        if self.extension.is_empty() {
            format!("scan-{timestamp}")
        } else {
            format!("scan-{timestamp}.{}", self.extension)
        }
    }
}

/// Lowercased extension of a path's final component, without the dot.
fn extension_of(path: &str) -> String {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rfind('.') {
        // A leading dot is a hidden-file marker, not an extension.
        Some(idx) if idx > 0 => name[idx + 1..].to_lowercase(),
        _ => String::new(),
    }
}

/// Sniff a content type from the payload's magic signature.
///
/// Never derived from the filename extension; unknown signatures fall back
/// to `application/octet-stream`.
#[must_use]
pub fn sniff_content_type(payload: &[u8]) -> &'static str {
    infer::get(payload).map_or("application/octet-stream", |t| t.mime_type())
}
