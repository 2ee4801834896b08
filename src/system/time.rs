//! Time keeping module for PineTime

use chrono::{DateTime, NaiveDateTime, TimeDelta};
use embassy_time::Instant;
use pinetime_ringface::clock::to_local;

pub struct TimeReference {
    /// Clock time (UTC)
    time: NaiveDateTime,
    /// Related system time
    instant: Instant,
}

impl Default for TimeReference {
    fn default() -> Self {
        Self {
            time: NaiveDateTime::UNIX_EPOCH,
            instant: Instant::from_ticks(0),
        }
    }
}

impl TimeReference {
    /// Create new time reference from NaiveDateTime
    pub fn from_datetime(time: NaiveDateTime) -> Self {
        Self {
            time,
            instant: Instant::now(),
        }
    }

    /// Create new time reference from seconds since the unix epoch
    pub fn from_timestamp(secs: i64) -> Option<Self> {
        DateTime::from_timestamp(secs, 0).map(|time| Self::from_datetime(time.naive_utc()))
    }
}

pub struct TimeManager {
    reference: TimeReference,
    /// Local time offset from UTC in seconds
    utc_offset_secs: i32,
}

impl TimeManager {
    /// Initialize time measurement on boot
    pub fn init(reference: TimeReference, utc_offset_secs: i32) -> Self {
        Self {
            reference,
            utc_offset_secs,
        }
    }

    /// Get current time (UTC)
    pub fn utc(&self) -> NaiveDateTime {
        let elapsed = Instant::now().duration_since(self.reference.instant);
        self.reference
            .time
            .checked_add_signed(TimeDelta::microseconds(elapsed.as_micros() as i64))
            .unwrap_or(self.reference.time)
    }

    /// Get current local time
    pub fn local(&self) -> NaiveDateTime {
        to_local(self.utc(), self.utc_offset_secs)
    }

    /// Update time reference from a local wall clock time
    pub fn set_local(&mut self, local: NaiveDateTime) {
        self.reference = TimeReference::from_datetime(to_local(local, -self.utc_offset_secs));
    }
}
