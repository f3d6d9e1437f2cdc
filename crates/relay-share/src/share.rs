//! Share trait and error types.
//!
//! Provides the core [`Share`] trait for abstracting access to the
//! scanner's network share, along with [`ShareError`] for unified error
//! handling across backends.
//!
//! # Path Convention
//!
//! All path parameters are **share-absolute**, slash-separated strings.
//! The SMB backend uses full `smb://` URLs (e.g.
//! `smb://printer/MEMORYCARD/EPSCAN/img001.jpg`); the filesystem backend
//! uses paths relative to its mount point (e.g. `/EPSCAN/img001.jpg`).
//! Backends resolve these to their internal addressing.

use std::time::SystemTime;

/// Kind of a directory entry.
///
/// Anything that is neither a plain file nor a directory (links, printer
/// queues, workgroup entries) is dropped at the backend boundary and never
/// reaches consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A plain file.
    File,
    /// A directory.
    Directory,
}

/// An item returned by a directory listing.
///
/// Transient; not retained beyond one listing call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEntry {
    /// Entry name, relative to the listed directory.
    pub name: String,
    /// Entry kind.
    pub kind: EntryKind,
}

/// File metadata returned by [`Share::stat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileInfo {
    /// Last modification time as stored on the share.
    pub modified: SystemTime,
    /// File size in bytes.
    pub size: u64,
}

/// Error from share operations.
#[derive(Debug, thiserror::Error)]
pub enum ShareError {
    /// Path does not exist on the share.
    #[error("not found: {path}")]
    NotFound {
        /// Share-absolute path.
        path: String,
    },

    /// I/O failure with path context.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Share-absolute path.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Backend-specific transport failure.
    #[error("share backend error: {0}")]
    Backend(String),
}

impl ShareError {
    /// Wrap an I/O error with path context, mapping `NotFound` to the
    /// dedicated variant.
    #[must_use]
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound { path }
        } else {
            Self::Io { path, source }
        }
    }
}

/// Access to the scanner's share.
///
/// The share is tree-structured; all four operations are blocking.
/// Transport timeouts are the backend's concern, not the caller's.
pub trait Share: Send + Sync {
    /// List the immediate entries of a directory.
    ///
    /// Returns entries in the order the share reports them, including any
    /// `.` / `..` entries the transport produces; callers filter those.
    ///
    /// # Errors
    ///
    /// Returns [`ShareError`] if the directory cannot be opened or
    /// enumerated.
    fn list_dir(&self, path: &str) -> Result<Vec<RemoteEntry>, ShareError>;

    /// Stat a file.
    ///
    /// # Errors
    ///
    /// Returns [`ShareError`] if the file does not exist or metadata cannot
    /// be read.
    fn stat(&self, path: &str) -> Result<FileInfo, ShareError>;

    /// Read a file's full content in one pass.
    ///
    /// The whole file is buffered in memory; there is no streaming read.
    ///
    /// # Errors
    ///
    /// Returns [`ShareError`] if the file cannot be opened or read.
    fn read_file(&self, path: &str) -> Result<Vec<u8>, ShareError>;

    /// Delete a file from the share.
    ///
    /// # Errors
    ///
    /// Returns [`ShareError`] if the file cannot be removed.
    fn delete_file(&self, path: &str) -> Result<(), ShareError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_error_io_not_found() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = ShareError::io("/EPSCAN/img.jpg", io_err);

        assert!(matches!(err, ShareError::NotFound { path } if path == "/EPSCAN/img.jpg"));
    }

    #[test]
    fn test_share_error_io_other() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = ShareError::io("/EPSCAN", io_err);

        assert_eq!(err.to_string(), "I/O error at /EPSCAN: denied");
    }

    #[test]
    fn test_share_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ShareError>();
    }
}
