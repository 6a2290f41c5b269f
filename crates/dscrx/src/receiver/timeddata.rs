use std::time::Instant;

/// Time-sensitive data with an expiration time
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimedData<D> {
    /// Data
    pub data: D,

    /// Deadline or expiration time, on the monotonic clock
    pub deadline: Instant,
}

impl<D> TimedData<D> {
    /// Store `data` with the given `deadline`
    pub fn with_deadline(data: D, deadline: Instant) -> Self {
        TimedData { data, deadline }
    }

    /// Check for expiration
    pub fn is_expired_at(&self, now: Instant) -> bool {
        self.deadline <= now
    }
}

impl<D> AsRef<D> for TimedData<D> {
    fn as_ref(&self) -> &D {
        &self.data
    }
}
