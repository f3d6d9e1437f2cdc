//! Scan cycle orchestration and scheduling.
//!
//! [`ScanCycle`] drives one full pass over the share: walk the scan root,
//! fetch each file, hand it to the active delivery store, and purge the
//! source on success. Per-file failures are isolated; a listing failure
//! aborts the cycle. [`Scheduler`] repeats cycles at a fixed interval
//! without ever overlapping two runs.

mod cycle;
mod scheduler;

pub use cycle::{CycleReport, ScanCycle};
pub use scheduler::Scheduler;
