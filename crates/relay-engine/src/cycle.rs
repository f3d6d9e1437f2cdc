//! One discover → fetch → deliver → purge pass over the share.

use relay_share::{EntryKind, Share, ShareError, walk};
use relay_store::{Document, DocumentStore, StoreError};
use tracing::{debug, info, warn};

/// Outcome counters for one cycle.
///
/// An empty share yields the zero report; re-running a cycle with no new
/// files is a no-op.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    /// Files delivered to the destination.
    pub delivered: usize,
    /// Files that failed fetch or delivery and stay on the share.
    pub failed: usize,
    /// Delivered files whose source could not be deleted afterwards.
    pub purge_failures: usize,
}

/// Failure while processing a single file.
#[derive(Debug, thiserror::Error)]
enum FileError {
    #[error(transparent)]
    Share(#[from] ShareError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Orchestrates one full pass: walk, fetch, deliver, purge.
///
/// Holds only borrowed collaborators; the destination configuration and
/// the share handle are shared read-only across cycles. Per-file
/// isolation: one failing file never aborts the batch.
pub struct ScanCycle<'a> {
    share: &'a dyn Share,
    store: &'a dyn DocumentStore,
    root: &'a str,
}

impl<'a> ScanCycle<'a> {
    /// Create a cycle over a share root and a delivery store.
    #[must_use]
    pub fn new(share: &'a dyn Share, store: &'a dyn DocumentStore, root: &'a str) -> Self {
        Self { share, store, root }
    }

    /// Run one cycle.
    ///
    /// Files are processed in walk order. A file is deleted from the share
    /// only after the store acknowledged delivery; a failed purge is
    /// logged and counted but never escalated (the file is redelivered on
    /// a later cycle). Fetch and delivery failures are isolated per file.
    ///
    /// # Errors
    ///
    /// Returns [`ShareError`] only for a failure of the listing walk
    /// itself; nothing was processed in that case.
    pub fn run(&self) -> Result<CycleReport, ShareError> {
        let files = walk(self.share, self.root, EntryKind::File, true)?;

        let mut report = CycleReport::default();
        for path in files {
            debug!(path = %path, "found file");
            match self.process(&path) {
                Ok(purged) => {
                    report.delivered += 1;
                    if !purged {
                        report.purge_failures += 1;
                    }
                }
                Err(err) => {
                    warn!(path = %path, error = %err, "processing failed; file stays for retry");
                    report.failed += 1;
                }
            }
        }

        info!(
            delivered = report.delivered,
            failed = report.failed,
            purge_failures = report.purge_failures,
            "cycle finished"
        );
        Ok(report)
    }

    /// Fetch, deliver and purge one file.
    ///
    /// Returns whether the source was purged after successful delivery.
    fn process(&self, path: &str) -> Result<bool, FileError> {
        let info = self.share.stat(path)?;
        let payload = self.share.read_file(path)?;
        let document = Document::new(path.to_owned(), info.modified, payload);

        self.store.submit(&document)?;

        // Delivery is acknowledged; removal is the dedup marker. A failed
        // removal degrades to redelivery on the next cycle.
        match self.share.delete_file(path) {
            Ok(()) => Ok(true),
            Err(err) => {
                warn!(path = %path, error = %err, "purge failed; file will be redelivered");
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, UNIX_EPOCH};

    use pretty_assertions::assert_eq;
    use relay_share::MockShare;
    use relay_store::MockStore;

    use super::*;

    /// JPEG magic signature, 5 bytes as scanned.
    const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00];

    #[test]
    fn test_empty_share_is_noop() {
        let share = MockShare::new().with_dir("/EPSCAN");
        let store = MockStore::new();

        let report = ScanCycle::new(&share, &store, "/EPSCAN").run().unwrap();

        assert_eq!(report, CycleReport::default());
        assert_eq!(store.submission_count(), 0);
        assert_eq!(share.deleted().len(), 0);
    }

    #[test]
    fn test_delivers_and_purges_in_walk_order() {
        let share = MockShare::new()
            .with_file("/EPSCAN/001/img001.jpg", JPEG.to_vec())
            .with_file("/EPSCAN/001/img002.jpg", JPEG.to_vec());
        let store = MockStore::new();

        let report = ScanCycle::new(&share, &store, "/EPSCAN").run().unwrap();

        assert_eq!(report.delivered, 2);
        assert_eq!(report.failed, 0);
        assert_eq!(
            share.deleted(),
            vec!["/EPSCAN/001/img001.jpg", "/EPSCAN/001/img002.jpg"]
        );
        let sources: Vec<String> = store
            .submissions()
            .into_iter()
            .map(|s| s.source_path)
            .collect();
        assert_eq!(
            sources,
            vec!["/EPSCAN/001/img001.jpg", "/EPSCAN/001/img002.jpg"]
        );
    }

    #[test]
    fn test_second_run_is_idempotent() {
        let share = MockShare::new().with_file("/EPSCAN/img.jpg", JPEG.to_vec());
        let store = MockStore::new();
        let cycle = ScanCycle::new(&share, &store, "/EPSCAN");

        let first = cycle.run().unwrap();
        let second = cycle.run().unwrap();

        assert_eq!(first.delivered, 1);
        assert_eq!(second, CycleReport::default());
        assert_eq!(store.submission_count(), 1);
    }

    #[test]
    fn test_delivery_failure_keeps_file_for_retry() {
        let share = MockShare::new().with_file("/EPSCAN/img.jpg", JPEG.to_vec());
        let store = MockStore::new().with_total_failure();

        let report = ScanCycle::new(&share, &store, "/EPSCAN").run().unwrap();

        assert_eq!(report.failed, 1);
        assert_eq!(report.delivered, 0);
        // At-least-once: the file is still present and rediscovered.
        assert!(share.contains("/EPSCAN/img.jpg"));
        let next = walk(&share, "/EPSCAN", EntryKind::File, true).unwrap();
        assert_eq!(next, vec!["/EPSCAN/img.jpg"]);
    }

    #[test]
    fn test_per_file_isolation() {
        let share = MockShare::new()
            .with_file("/EPSCAN/bad.jpg", JPEG.to_vec())
            .with_file("/EPSCAN/good.jpg", JPEG.to_vec())
            .with_read_failure("/EPSCAN/bad.jpg");
        let store = MockStore::new();

        let report = ScanCycle::new(&share, &store, "/EPSCAN").run().unwrap();

        assert_eq!(report.delivered, 1);
        assert_eq!(report.failed, 1);
        assert!(share.contains("/EPSCAN/bad.jpg"));
        assert!(!share.contains("/EPSCAN/good.jpg"));
    }

    #[test]
    fn test_listing_failure_aborts_cycle() {
        let share = MockShare::new()
            .with_file("/EPSCAN/img.jpg", JPEG.to_vec())
            .with_listing_failure();
        let store = MockStore::new();

        let result = ScanCycle::new(&share, &store, "/EPSCAN").run();

        assert!(result.is_err());
        assert_eq!(store.submission_count(), 0);
    }

    #[test]
    fn test_purge_failure_is_not_escalated() {
        let share = MockShare::new()
            .with_file("/EPSCAN/img.jpg", JPEG.to_vec())
            .with_file("/EPSCAN/other.jpg", JPEG.to_vec())
            .with_delete_failure("/EPSCAN/img.jpg");
        let store = MockStore::new();
        let cycle = ScanCycle::new(&share, &store, "/EPSCAN");

        let report = cycle.run().unwrap();

        assert_eq!(report.delivered, 2);
        assert_eq!(report.purge_failures, 1);
        // The undeleted file is redelivered on the next cycle.
        let second = cycle.run().unwrap();
        assert_eq!(second.delivered, 1);
        assert_eq!(store.submission_count(), 3);
    }

    #[test]
    fn test_purge_happens_before_next_file() {
        let share = MockShare::new()
            .with_file("/EPSCAN/a.jpg", JPEG.to_vec())
            .with_file("/EPSCAN/b.jpg", JPEG.to_vec());
        let store = MockStore::new();

        ScanCycle::new(&share, &store, "/EPSCAN").run().unwrap();

        // Deletion order matches delivery order: each purge precedes the
        // next file's processing.
        assert_eq!(share.deleted(), vec!["/EPSCAN/a.jpg", "/EPSCAN/b.jpg"]);
    }

    #[test]
    fn test_unsupported_model_empty_root() {
        let share = MockShare::new().with_file("/EPSCAN/img.jpg", JPEG.to_vec());
        let store = MockStore::new();

        let report = ScanCycle::new(&share, &store, "").run().unwrap();

        assert_eq!(report, CycleReport::default());
    }

    #[test]
    fn test_mail_scenario_shape() {
        // /EPSCAN/img001.jpg, 5 bytes with JPEG signature: one delivery
        // with the synthesized attachment name, then the source is gone.
        let mtime = UNIX_EPOCH + Duration::from_secs(1_683_201_909);
        let share = MockShare::new().with_file_mtime("/EPSCAN/img001.jpg", JPEG.to_vec(), mtime);
        let store = MockStore::new();

        let report = ScanCycle::new(&share, &store, "/EPSCAN").run().unwrap();

        assert_eq!(report.delivered, 1);
        let submissions = store.submissions();
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].payload, JPEG);
        assert_eq!(relay_store::sniff_content_type(&submissions[0].payload), "image/jpeg");
        assert!(submissions[0].delivery_name.starts_with("scan-2023_"));
        assert!(submissions[0].delivery_name.ends_with(".jpg"));
        assert!(!share.contains("/EPSCAN/img001.jpg"));
    }
}
