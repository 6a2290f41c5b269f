//! Chooses among redundant decodings of one call
//!
//! Each DSC burst is decoded once per bit phase, and often more
//! than once per phase as the frame decoder slides across it.
//! These candidates arrive within a few hundred milliseconds of
//! each other. The [`CandidateReconciler`] holds them until no
//! new candidate has arrived for a settling window, then issues
//! the single best one.
//!
//! "Best" is the candidate with the most symbols received
//! intact. Ties go to the candidate which arrived first.

#[cfg(not(test))]
use log::debug;

#[cfg(test)]
use std::println as debug;

use std::time::{Duration, Instant};

use super::timeddata::TimedData;
use crate::message::DscMessage;

/// Default settling window
pub const DEFAULT_SETTLE_WINDOW: Duration = Duration::from_secs(2);

/// Pending candidate and its score
#[derive(Clone, Debug, PartialEq, Eq)]
struct Candidate {
    message: DscMessage,
    score: usize,
    pool_size: usize,
}

/// Holds candidate decodings until they settle
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CandidateReconciler {
    window: Duration,
    pending: Option<TimedData<Candidate>>,
}

impl CandidateReconciler {
    /// New reconciler with the given settling window
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    /// Add a candidate which arrived at `now`
    ///
    /// Restarts the settling window. Returns `true` if the
    /// candidate is now the best one held.
    pub fn accept(&mut self, message: DscMessage, now: Instant) -> bool {
        let deadline = now + self.window;
        let score = message.valid_symbol_count();

        match &mut self.pending {
            Some(timed) => {
                timed.deadline = deadline;
                timed.data.pool_size += 1;
                if score > timed.data.score {
                    debug!(
                        "reconcile: candidate with {} good symbols replaces one with {}",
                        score, timed.data.score
                    );
                    timed.data.message = message;
                    timed.data.score = score;
                    true
                } else {
                    false
                }
            }
            None => {
                debug!("reconcile: first candidate, {} good symbols", score);
                self.pending = Some(TimedData::with_deadline(
                    Candidate {
                        message,
                        score,
                        pool_size: 1,
                    },
                    deadline,
                ));
                true
            }
        }
    }

    /// If the candidates have settled "now," issue the best
    ///
    /// Returns `None` if nothing is held or the settling window
    /// has not yet elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<DscMessage> {
        let settled = self
            .pending
            .as_ref()
            .map(|t| t.is_expired_at(now))
            .unwrap_or(false);
        if settled {
            self.flush()
        } else {
            None
        }
    }

    /// Issue the best candidate immediately
    pub fn flush(&mut self) -> Option<DscMessage> {
        let timed = self.pending.take()?;
        debug!(
            "reconcile: issuing best of {} candidates",
            timed.data.pool_size
        );
        Some(timed.data.message)
    }

    /// Number of candidates received since the last issue
    pub fn len(&self) -> usize {
        self.pending.as_ref().map(|t| t.data.pool_size).unwrap_or(0)
    }

    /// True if no candidates are held
    pub fn is_empty(&self) -> bool {
        self.pending.is_none()
    }

    /// When the held candidates will settle, if any are held
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|t| t.deadline)
    }

    /// Discard held candidates
    pub fn reset(&mut self) {
        self.pending = None;
    }
}

impl Default for CandidateReconciler {
    fn default() -> Self {
        Self::new(DEFAULT_SETTLE_WINDOW)
    }
}
