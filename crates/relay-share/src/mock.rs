//! Mock share implementation for testing.
//!
//! Provides [`MockShare`] for unit testing without a printer on the
//! network. The mock keeps an in-memory tree, records deletions, and can
//! inject failures into listing, reads and deletes.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::RwLock;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::share::{EntryKind, FileInfo, RemoteEntry, Share, ShareError};

/// One in-memory file.
#[derive(Debug, Clone)]
struct MockFile {
    payload: Vec<u8>,
    modified: SystemTime,
}

/// Mock share for testing.
///
/// Paths are share-absolute with a leading slash. Ancestor directories of
/// added files are registered automatically. Every listing includes `.`
/// and `..` entries, like a real SMB server, so consumers exercise their
/// dot filtering. Listing order is deterministic: dot entries, then
/// directories, then files, each lexicographic.
///
/// # Example
///
/// ```ignore
/// use relay_share::{MockShare, Share};
///
/// let share = MockShare::new().with_file("/EPSCAN/img001.jpg", vec![0xFF]);
/// let entries = share.list_dir("/EPSCAN")?;
/// ```
#[derive(Debug, Default)]
pub struct MockShare {
    files: RwLock<BTreeMap<String, MockFile>>,
    dirs: RwLock<BTreeSet<String>>,
    deleted: RwLock<Vec<String>>,
    fail_listing: bool,
    fail_reads: HashSet<String>,
    fail_deletes: HashSet<String>,
}

impl MockShare {
    /// Create a new empty mock share.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file with a default modification time.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_file(self, path: impl Into<String>, payload: Vec<u8>) -> Self {
        // Arbitrary fixed default keeps filenames deterministic in tests.
        self.with_file_mtime(path, payload, UNIX_EPOCH + Duration::from_secs(1_683_201_909))
    }

    /// Add a file with an explicit modification time.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_file_mtime(
        self,
        path: impl Into<String>,
        payload: Vec<u8>,
        modified: SystemTime,
    ) -> Self {
        let path = path.into();
        self.register_ancestors(&path);
        self.files
            .write()
            .unwrap()
            .insert(path, MockFile { payload, modified });
        self
    }

    /// Add an empty directory.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_dir(self, path: impl Into<String>) -> Self {
        let path = path.into();
        self.register_ancestors(&path);
        self.dirs.write().unwrap().insert(path);
        self
    }

    /// Make every listing call fail.
    #[must_use]
    pub fn with_listing_failure(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    /// Make reads of one path fail.
    #[must_use]
    pub fn with_read_failure(mut self, path: impl Into<String>) -> Self {
        self.fail_reads.insert(path.into());
        self
    }

    /// Make deletion of one path fail.
    #[must_use]
    pub fn with_delete_failure(mut self, path: impl Into<String>) -> Self {
        self.fail_deletes.insert(path.into());
        self
    }

    /// Paths deleted so far, in deletion order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn deleted(&self) -> Vec<String> {
        self.deleted.read().unwrap().clone()
    }

    /// Whether a file is currently present.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.files.read().unwrap().contains_key(path)
    }

    /// Number of files currently present.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.files.read().unwrap().len()
    }

    /// Register every ancestor directory of a path.
    fn register_ancestors(&self, path: &str) {
        let mut dirs = self.dirs.write().unwrap();
        let mut end = path.len();
        while let Some(idx) = path[..end].rfind('/') {
            if idx == 0 {
                break;
            }
            dirs.insert(path[..idx].to_owned());
            end = idx;
        }
    }
}

/// Parent directory of a share-absolute path (`"/"` for top-level names).
fn parent(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) => "/",
        Some(idx) => &path[..idx],
        None => "/",
    }
}

impl Share for MockShare {
    fn list_dir(&self, path: &str) -> Result<Vec<RemoteEntry>, ShareError> {
        if self.fail_listing {
            return Err(ShareError::Backend("injected listing failure".to_owned()));
        }

        let path = path.trim_end_matches('/');
        let dirs = self.dirs.read().unwrap();
        let files = self.files.read().unwrap();

        if path != "/" && !path.is_empty() && !dirs.contains(path) {
            return Err(ShareError::NotFound {
                path: path.to_owned(),
            });
        }

        let lookup = if path.is_empty() { "/" } else { path };
        let mut entries = vec![
            RemoteEntry {
                name: ".".to_owned(),
                kind: EntryKind::Directory,
            },
            RemoteEntry {
                name: "..".to_owned(),
                kind: EntryKind::Directory,
            },
        ];
        entries.extend(
            dirs.iter()
                .filter(|d| parent(d) == lookup)
                .map(|d| RemoteEntry {
                    name: d.rsplit('/').next().unwrap_or(d).to_owned(),
                    kind: EntryKind::Directory,
                }),
        );
        entries.extend(
            files
                .keys()
                .filter(|f| parent(f) == lookup)
                .map(|f| RemoteEntry {
                    name: f.rsplit('/').next().unwrap_or(f).to_owned(),
                    kind: EntryKind::File,
                }),
        );
        Ok(entries)
    }

    fn stat(&self, path: &str) -> Result<FileInfo, ShareError> {
        let files = self.files.read().unwrap();
        let file = files.get(path).ok_or_else(|| ShareError::NotFound {
            path: path.to_owned(),
        })?;
        Ok(FileInfo {
            modified: file.modified,
            size: file.payload.len() as u64,
        })
    }

    fn read_file(&self, path: &str) -> Result<Vec<u8>, ShareError> {
        if self.fail_reads.contains(path) {
            return Err(ShareError::Backend("injected read failure".to_owned()));
        }
        let files = self.files.read().unwrap();
        files
            .get(path)
            .map(|f| f.payload.clone())
            .ok_or_else(|| ShareError::NotFound {
                path: path.to_owned(),
            })
    }

    fn delete_file(&self, path: &str) -> Result<(), ShareError> {
        if self.fail_deletes.contains(path) {
            return Err(ShareError::Backend("injected delete failure".to_owned()));
        }
        let mut files = self.files.write().unwrap();
        if files.remove(path).is_none() {
            return Err(ShareError::NotFound {
                path: path.to_owned(),
            });
        }
        self.deleted.write().unwrap().push(path.to_owned());
        Ok(())
    }
}
