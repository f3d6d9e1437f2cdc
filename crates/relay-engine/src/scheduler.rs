//! Fixed-interval, non-overlapping cycle scheduling.
//!
//! The target time for the next run accumulates by the interval
//! regardless of how long a run took, but a new run never starts before
//! the previous one returned: a slow cycle delays the next one instead of
//! overlapping it. Single thread of control; no locks are needed because
//! concurrency is structurally excluded.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tracing::debug;

/// Runs cycles once or periodically.
#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
    interval: Duration,
}

impl Scheduler {
    /// Create a scheduler with a fixed interval between cycle starts.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Run exactly one cycle.
    pub fn run_once<F: FnMut()>(mut cycle: F) {
        cycle();
    }

    /// Run a cycle immediately, then repeat at the fixed interval until
    /// `stop` is set.
    ///
    /// The stop flag is only checked between runs; a running cycle is
    /// never interrupted mid-file. Process termination remains the
    /// ultimate cancellation mechanism.
    pub fn run<F: FnMut()>(&self, stop: &AtomicBool, mut cycle: F) {
        let mut next_call = Instant::now();

        loop {
            cycle();

            if stop.load(Ordering::Relaxed) {
                return;
            }

            // The schedule accumulates independently of run duration; an
            // overrunning cycle yields a zero sleep, never an overlap.
            next_call += self.interval;
            let now = Instant::now();
            if next_call > now {
                debug!(sleep_ms = (next_call - now).as_millis() as u64, "waiting for next cycle");
                std::thread::sleep(next_call - now);
            }

            if stop.load(Ordering::Relaxed) {
                return;
            }
        }
    }
}
