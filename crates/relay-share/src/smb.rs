//! SMB share implementation.
//!
//! Provides [`SmbShare`] over libsmbclient via `pavao`. The printer's SMB
//! server accepts any credentials, so a fixed workgroup/user/password
//! triple is always supplied. Compiled behind the `smb` feature because
//! it links the system libsmbclient.

use std::io::Read;

use pavao::{SmbClient, SmbCredentials, SmbDirent, SmbDirentType, SmbOpenOptions, SmbOptions};

use crate::share::{EntryKind, FileInfo, RemoteEntry, Share, ShareError};

/// Fixed credential triple; the printer ignores the values.
const WORKGROUP: &str = "WORKGROUP";
const USERNAME: &str = "default";
const PASSWORD: &str = "default";

/// Share name of the removable storage on supported models.
const VENDOR_SHARE: &str = "/MEMORYCARD";

/// Live SMB share backend.
///
/// Accepts full `smb://` URLs as produced by [`crate::scan_root`] and maps
/// them onto the connected share. The client handle is reused across
/// cycles; a connection fault surfaces as a listing or per-file error on
/// the next operation.
pub struct SmbShare {
    client: SmbClient,
    /// URL prefix covered by the connected share, e.g.
    /// `smb://printer/MEMORYCARD`.
    url_prefix: String,
}

impl SmbShare {
    /// Connect to a printer's removable-storage share.
    ///
    /// # Errors
    ///
    /// Returns [`ShareError::Backend`] if the SMB context cannot be
    /// created.
    pub fn connect(hostname: &str) -> Result<Self, ShareError> {
        let server = format!("smb://{hostname}");
        let client = SmbClient::new(
            SmbCredentials::default()
                .server(&server)
                .share(VENDOR_SHARE)
                .username(USERNAME)
                .password(PASSWORD)
                .workgroup(WORKGROUP),
            SmbOptions::default().one_share_per_server(true),
        )
        .map_err(backend_err)?;

        Ok(Self {
            client,
            url_prefix: format!("{server}{VENDOR_SHARE}"),
        })
    }

    /// Strip the share's URL prefix, leaving a share-relative path.
    fn relative<'a>(&self, path: &'a str) -> &'a str {
        match path.strip_prefix(&self.url_prefix) {
            Some("") => "/",
            Some(rel) => rel,
            None => path,
        }
    }
}

/// Map an SMB error onto the share error type.
fn backend_err(err: pavao::SmbError) -> ShareError {
    ShareError::Backend(err.to_string())
}

/// Map a dirent to a remote entry, dropping unsupported kinds.
fn to_remote_entry(dirent: &SmbDirent) -> Option<RemoteEntry> {
    let kind = match dirent.get_type() {
        SmbDirentType::File => EntryKind::File,
        SmbDirentType::Dir => EntryKind::Directory,
        // Workgroups, servers, printer queues and links never hold scans.
        _ => return None,
    };
    Some(RemoteEntry {
        name: dirent.name().to_owned(),
        kind,
    })
}

impl Share for SmbShare {
    fn list_dir(&self, path: &str) -> Result<Vec<RemoteEntry>, ShareError> {
        let entries = self.client.list_dir(self.relative(path)).map_err(backend_err)?;
        Ok(entries.iter().filter_map(to_remote_entry).collect())
    }

    fn stat(&self, path: &str) -> Result<FileInfo, ShareError> {
        let stat = self.client.stat(self.relative(path)).map_err(backend_err)?;
        Ok(FileInfo {
            modified: stat.modified,
            size: stat.size,
        })
    }

    fn read_file(&self, path: &str) -> Result<Vec<u8>, ShareError> {
        let mut file = self
            .client
            .open_with(self.relative(path), SmbOpenOptions::default().read(true))
            .map_err(backend_err)?;
        let mut payload = Vec::new();
        file.read_to_end(&mut payload)
            .map_err(|e| ShareError::io(path, e))?;
        Ok(payload)
    }

    fn delete_file(&self, path: &str) -> Result<(), ShareError> {
        self.client.unlink(self.relative(path)).map_err(backend_err)
    }
}
