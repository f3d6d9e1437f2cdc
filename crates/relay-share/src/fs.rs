//! Filesystem share implementation.
//!
//! Provides [`FsShare`] for shares that are mounted into the local
//! filesystem (cifs or gvfs mounts). Deployments that cannot link
//! libsmbclient mount `smb://<printer>/MEMORYCARD` with the kernel client
//! and point this backend at the mount directory.

use std::fs;
use std::path::PathBuf;

use crate::share::{EntryKind, FileInfo, RemoteEntry, Share, ShareError};

/// Share backend over a local mount point.
///
/// Share-absolute paths (`/EPSCAN/img001.jpg`) resolve beneath the mount
/// directory.
#[derive(Debug)]
pub struct FsShare {
    mount: PathBuf,
}

impl FsShare {
    /// Create a backend over a mount directory.
    #[must_use]
    pub fn new(mount: PathBuf) -> Self {
        Self { mount }
    }

    /// Resolve a share-absolute path under the mount point.
    fn resolve(&self, path: &str) -> PathBuf {
        self.mount.join(path.trim_start_matches('/'))
    }
}

/// Map a directory entry to a remote entry, dropping unsupported kinds.
fn to_remote_entry(entry: &fs::DirEntry) -> Option<RemoteEntry> {
    let file_type = entry.file_type().ok()?;
    let kind = if file_type.is_dir() {
        EntryKind::Directory
    } else if file_type.is_file() {
        EntryKind::File
    } else {
        // Symlinks and special files have no counterpart on the share.
        return None;
    };
    Some(RemoteEntry {
        name: entry.file_name().to_string_lossy().into_owned(),
        kind,
    })
}

impl Share for FsShare {
    fn list_dir(&self, path: &str) -> Result<Vec<RemoteEntry>, ShareError> {
        let dir = self.resolve(path);
        let entries = fs::read_dir(&dir).map_err(|e| ShareError::io(path, e))?;

        let mut result = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| ShareError::io(path, e))?;
            if let Some(remote) = to_remote_entry(&entry) {
                result.push(remote);
            }
        }
        Ok(result)
    }

    fn stat(&self, path: &str) -> Result<FileInfo, ShareError> {
        let metadata = fs::metadata(self.resolve(path)).map_err(|e| ShareError::io(path, e))?;
        let modified = metadata.modified().map_err(|e| ShareError::io(path, e))?;
        Ok(FileInfo {
            modified,
            size: metadata.len(),
        })
    }

    fn read_file(&self, path: &str) -> Result<Vec<u8>, ShareError> {
        fs::read(self.resolve(path)).map_err(|e| ShareError::io(path, e))
    }

    fn delete_file(&self, path: &str) -> Result<(), ShareError> {
        fs::remove_file(self.resolve(path)).map_err(|e| ShareError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::walker::walk;

    fn mounted_tree() -> (tempfile::TempDir, FsShare) {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("EPSCAN/001")).unwrap();
        fs::write(dir.path().join("EPSCAN/001/img001.jpg"), b"jpegdata").unwrap();
        fs::write(dir.path().join("EPSCAN/note.pdf"), b"pdfdata").unwrap();
        let share = FsShare::new(dir.path().to_path_buf());
        (dir, share)
    }

    #[test]
    fn test_list_dir_kinds() {
        let (_dir, share) = mounted_tree();

        let mut entries = share.list_dir("/EPSCAN").unwrap();
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        assert_eq!(
            entries,
            vec![
                RemoteEntry {
                    name: "001".to_owned(),
                    kind: EntryKind::Directory
                },
                RemoteEntry {
                    name: "note.pdf".to_owned(),
                    kind: EntryKind::File
                },
            ]
        );
    }

    #[test]
    fn test_walk_over_mount() {
        let (_dir, share) = mounted_tree();

        let mut files = walk(&share, "/EPSCAN", EntryKind::File, true).unwrap();
        files.sort();

        assert_eq!(files, vec!["/EPSCAN/001/img001.jpg", "/EPSCAN/note.pdf"]);
    }

    #[test]
    fn test_read_and_stat() {
        let (_dir, share) = mounted_tree();

        let payload = share.read_file("/EPSCAN/note.pdf").unwrap();
        let info = share.stat("/EPSCAN/note.pdf").unwrap();

        assert_eq!(payload, b"pdfdata");
        assert_eq!(info.size, 7);
    }

    #[test]
    fn test_delete_file() {
        let (_dir, share) = mounted_tree();

        share.delete_file("/EPSCAN/note.pdf").unwrap();

        assert!(matches!(
            share.stat("/EPSCAN/note.pdf"),
            Err(ShareError::NotFound { .. })
        ));
    }

    #[test]
    fn test_missing_directory_is_not_found() {
        let (_dir, share) = mounted_tree();

        assert!(matches!(
            share.list_dir("/NOPE"),
            Err(ShareError::NotFound { .. })
        ));
    }
}
