//! Mock delivery backend for testing.

use std::collections::HashSet;
use std::sync::RwLock;
use std::time::Duration;

use crate::document::Document;
use crate::store::{DocumentStore, StoreError};

/// One recorded delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// Source path of the delivered document.
    pub source_path: String,
    /// Synthesized delivery filename.
    pub delivery_name: String,
    /// Delivered bytes.
    pub payload: Vec<u8>,
}

/// Mock store that records submissions.
///
/// Failures can be injected per source path or for every call; an
/// optional artificial delay supports scheduler stress tests.
#[derive(Debug, Default)]
pub struct MockStore {
    submissions: RwLock<Vec<Submission>>,
    fail_paths: HashSet<String>,
    fail_all: bool,
    delay: Option<Duration>,
}

impl MockStore {
    /// Create a mock store that accepts everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail submissions for one source path.
    #[must_use]
    pub fn with_failure(mut self, source_path: impl Into<String>) -> Self {
        self.fail_paths.insert(source_path.into());
        self
    }

    /// Fail every submission.
    #[must_use]
    pub fn with_total_failure(mut self) -> Self {
        self.fail_all = true;
        self
    }

    /// Sleep for `delay` inside every submit call.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Recorded submissions in delivery order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions.read().unwrap().clone()
    }

    /// Number of recorded submissions.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn submission_count(&self) -> usize {
        self.submissions.read().unwrap().len()
    }
}

impl DocumentStore for MockStore {
    fn submit(&self, document: &Document) -> Result<(), StoreError> {
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        if self.fail_all || self.fail_paths.contains(&document.source_path) {
            return Err(StoreError::Mock(document.source_path.clone()));
        }
        self.submissions.write().unwrap().push(Submission {
            source_path: document.source_path.clone(),
            delivery_name: document.delivery_name(),
            payload: document.payload.clone(),
        });
        Ok(())
    }
}
