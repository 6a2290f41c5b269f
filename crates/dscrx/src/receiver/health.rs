//! Receiver liveness tracking

use std::time::{Duration, Instant};

/// Thresholds for the health check
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HealthLimits {
    /// Consecutive errors of one kind which halt the receiver
    pub max_consecutive_errors: u32,

    /// Error counters clear after this long without an error
    pub error_reset: Duration,

    /// The receiver is unhealthy if no audio arrives for this long
    pub data_timeout: Duration,
}

impl Default for HealthLimits {
    fn default() -> Self {
        Self {
            max_consecutive_errors: 10,
            error_reset: Duration::from_secs(120),
            data_timeout: Duration::from_secs(30),
        }
    }
}

/// Snapshot of receiver health
///
/// Read and processing errors are counted separately. A
/// successful read clears the read counter, and a successfully
/// processed chunk clears the processing counter. Both clear
/// after a quiet period with no errors at all.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct HealthState {
    running: bool,
    halted: bool,
    consecutive_read_errors: u32,
    consecutive_processing_errors: u32,
    last_error: Option<Instant>,
    last_data: Option<Instant>,
    empty_reads: u32,
}

impl HealthState {
    /// True while the acquisition loop runs
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// True if the loop stopped on too many errors
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Consecutive failed reads
    pub fn consecutive_read_errors(&self) -> u32 {
        self.consecutive_read_errors
    }

    /// Consecutive chunks which could not be processed
    pub fn consecutive_processing_errors(&self) -> u32 {
        self.consecutive_processing_errors
    }

    /// When the last error occurred
    pub fn last_error(&self) -> Option<Instant> {
        self.last_error
    }

    /// When audio last arrived
    pub fn last_data(&self) -> Option<Instant> {
        self.last_data
    }

    /// Consecutive reads which returned no audio
    pub fn empty_reads(&self) -> u32 {
        self.empty_reads
    }

    /// Liveness predicate
    ///
    /// Healthy means running, audio within the data timeout,
    /// and both error counters below the limit.
    pub fn is_healthy(&self, now: Instant, limits: &HealthLimits) -> bool {
        let fresh = self
            .last_data
            .map(|t| now.saturating_duration_since(t) < limits.data_timeout)
            .unwrap_or(false);

        self.running
            && !self.halted
            && fresh
            && self.consecutive_read_errors < limits.max_consecutive_errors
            && self.consecutive_processing_errors < limits.max_consecutive_errors
    }

    pub(crate) fn set_running(&mut self, running: bool) {
        self.running = running;
        if running {
            self.halted = false;
        }
    }

    pub(crate) fn halt(&mut self) {
        self.halted = true;
        self.running = false;
    }

    pub(crate) fn record_data(&mut self, now: Instant) {
        self.last_data = Some(now);
        self.consecutive_read_errors = 0;
        self.empty_reads = 0;
    }

    // returns the new empty-read count
    pub(crate) fn record_empty_read(&mut self) -> u32 {
        self.empty_reads = self.empty_reads.saturating_add(1);
        self.empty_reads
    }

    pub(crate) fn clear_empty_reads(&mut self) {
        self.empty_reads = 0;
    }

    // returns the new consecutive count
    pub(crate) fn record_read_error(&mut self, now: Instant) -> u32 {
        self.last_error = Some(now);
        self.consecutive_read_errors = self.consecutive_read_errors.saturating_add(1);
        self.consecutive_read_errors
    }

    // returns the new consecutive count
    pub(crate) fn record_processing_error(&mut self, now: Instant) -> u32 {
        self.last_error = Some(now);
        self.consecutive_processing_errors = self.consecutive_processing_errors.saturating_add(1);
        self.consecutive_processing_errors
    }

    pub(crate) fn record_processed(&mut self) {
        self.consecutive_processing_errors = 0;
    }

    /// Clear error counters after a quiet period
    ///
    /// Returns `true` if the counters were cleared.
    pub(crate) fn expire_errors(&mut self, now: Instant, reset_after: Duration) -> bool {
        match self.last_error {
            Some(t) if now.saturating_duration_since(t) >= reset_after => {
                self.consecutive_read_errors = 0;
                self.consecutive_processing_errors = 0;
                self.last_error = None;
                true
            }
            _ => false,
        }
    }
}
