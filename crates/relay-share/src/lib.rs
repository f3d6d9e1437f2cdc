//! Share capability for scanrelay.
//!
//! This crate abstracts the scanner's network share behind a [`Share`] trait
//! with the four operations the pipeline needs: list a directory, stat a
//! file, read a file in one pass, delete a file. This enables:
//!
//! - **Unit testing** without a printer on the network
//! - **Backend flexibility** (live SMB, a cifs/gvfs mount point, in-memory)
//!
//! # Architecture
//!
//! The crate provides:
//! - [`Share`] trait plus [`RemoteEntry`], [`FileInfo`] and [`ShareError`]
//! - [`walk`] for recursive, dot-entry-filtered traversal over any backend
//! - [`scan_root`] / [`mounted_scan_root`] for the vendor-specific scan root
//! - [`FsShare`] for shares mounted into the local filesystem
//! - [`SmbShare`] for direct SMB access (behind the `smb` feature)
//! - [`MockShare`] for testing (behind the `mock` feature)

mod fs;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod root;
mod share;
#[cfg(feature = "smb")]
mod smb;
mod walker;

pub use fs::FsShare;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockShare;
pub use root::{mounted_scan_root, scan_root};
pub use share::{EntryKind, FileInfo, RemoteEntry, Share, ShareError};
#[cfg(feature = "smb")]
pub use smb::SmbShare;
pub use walker::walk;
