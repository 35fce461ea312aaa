use crate::error::AppError;
use std::cell::Cell;
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime, UtcOffset};

/// Source of the current instant, expressed in the user's local offset.
pub trait Clock {
    fn now(&self) -> OffsetDateTime;

    /// Current instant as an RFC 3339 UTC string, the form every stored
    /// `createdAt`/`completedAt` uses.
    fn timestamp(&self) -> Result<String, AppError> {
        format_timestamp(self.now())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc().to_offset(local_offset())
    }
}

/// Manually driven clock for headless runs and tests.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Cell<OffsetDateTime>,
}

impl FixedClock {
    pub fn new(now: OffsetDateTime) -> Self {
        Self {
            now: Cell::new(now),
        }
    }

    pub fn set(&self, now: OffsetDateTime) {
        self.now.set(now);
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.now.get()
    }
}

pub fn local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}

pub fn format_timestamp(instant: OffsetDateTime) -> Result<String, AppError> {
    Ok(instant.to_offset(UtcOffset::UTC).format(&Rfc3339)?)
}

pub fn unix_millis(instant: OffsetDateTime) -> i64 {
    (instant.unix_timestamp_nanos() / 1_000_000) as i64
}

/// Hands out record ids derived from the clock in milliseconds. Two records
/// created within the same millisecond still get distinct ids: the second
/// one is bumped past the last id handed out.
#[derive(Debug, Default, Clone)]
pub struct IdSource {
    last: i64,
}

impl IdSource {
    pub fn seeded<I: IntoIterator<Item = i64>>(existing: I) -> Self {
        Self {
            last: existing.into_iter().max().unwrap_or(0),
        }
    }

    pub fn next_id(&mut self, now: OffsetDateTime) -> i64 {
        let id = unix_millis(now).max(self.last + 1);
        self.last = id;
        id
    }
}
