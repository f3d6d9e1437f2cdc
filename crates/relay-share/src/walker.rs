//! Recursive traversal over a [`Share`].
//!
//! Walks the directory tree depth-first, accumulating matching entries
//! into one flat, ordered sequence of share-absolute paths. The consumer
//! contract stays simple: no nested structures, no imposed sort — order
//! reproduces the share's listing order, with the entries of a directory
//! preceding those of its subdirectories.

use tracing::trace;

use crate::share::{EntryKind, RemoteEntry, Share, ShareError};

/// List paths of the given kind under `root`.
///
/// Entries whose name is a run of dots (`.`, `..`, ...) are filtered out.
/// When `recursive` is true, every child directory is descended into
/// depth-first and the result is a flattened sequence of share-absolute
/// paths; when false, only the immediate children of the requested kind
/// are returned.
///
/// An empty `root` is the degenerate unsupported-model case and yields an
/// empty listing.
///
/// # Errors
///
/// A transport failure while listing any directory aborts the whole walk;
/// there is no partial per-subdirectory recovery.
pub fn walk(
    share: &dyn Share,
    root: &str,
    kind: EntryKind,
    recursive: bool,
) -> Result<Vec<String>, ShareError> {
    if root.is_empty() {
        return Ok(Vec::new());
    }

    trace!(root, "listing share directory");
    let entries = share.list_dir(root)?;

    let dirs = paths_of_kind(&entries, EntryKind::Directory, root);
    let mut matches = if kind == EntryKind::Directory {
        dirs.clone()
    } else {
        paths_of_kind(&entries, EntryKind::File, root)
    };

    if recursive {
        for dir in &dirs {
            matches.extend(walk(share, dir, kind, true)?);
        }
    }

    Ok(matches)
}

/// Absolute paths of entries of one kind, with dot entries filtered.
fn paths_of_kind(entries: &[RemoteEntry], kind: EntryKind, root: &str) -> Vec<String> {
    entries
        .iter()
        .filter(|e| e.kind == kind && !is_dot_entry(&e.name))
        .map(|e| format!("{root}/{}", e.name))
        .collect()
}

/// True for names that are a non-empty run of dots (`.`, `..`, `...`).
fn is_dot_entry(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b == b'.')
}
