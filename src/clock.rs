//! Wall clock helpers

use chrono::{NaiveDate, NaiveDateTime, TimeDelta, Timelike};

/// User preference for the time label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockStyle {
    TwelveHour,
    TwentyFourHour,
}

/// Shift a UTC timestamp by a fixed offset in seconds.
pub fn to_local(utc: NaiveDateTime, offset_secs: i32) -> NaiveDateTime {
    utc.checked_add_signed(TimeDelta::seconds(offset_secs as i64))
        .unwrap_or(utc)
}

/// Seconds left until the next full minute, in `1..=60`.
pub fn secs_until_next_minute(now: &NaiveDateTime) -> u32 {
    60 - now.second()
}

/// Remembers the last wall clock minute that was ticked.
///
/// Poll it on every wake-up, whether the minute timer or an event caused it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinuteTracker {
    last: NaiveDateTime,
}

impl MinuteTracker {
    /// Start tracking; `now` counts as already ticked.
    pub fn new(now: &NaiveDateTime) -> Self {
        Self {
            last: truncate_to_minute(now),
        }
    }

    /// Returns `true` once for every minute change seen since the previous call.
    pub fn poll(&mut self, now: &NaiveDateTime) -> bool {
        let minute = truncate_to_minute(now);
        if minute == self.last {
            return false;
        }
        self.last = minute;
        true
    }
}

fn truncate_to_minute(time: &NaiveDateTime) -> NaiveDateTime {
    time.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(*time)
}

/// Decode a Current Time Service characteristic value.
///
/// Layout: year (u16 LE), month, day, hours, minutes, seconds, day of week, fractions256,
/// adjust reason. Returns `None` when the buffer is short or the date is invalid.
pub fn parse_current_time(bytes: &[u8]) -> Option<NaiveDateTime> {
    if bytes.len() < 9 {
        return None;
    }
    let year = u16::from_le_bytes([bytes[0], bytes[1]]) as i32;
    let month = bytes[2] as u32;
    let day = bytes[3] as u32;
    let hour = bytes[4] as u32;
    let min = bytes[5] as u32;
    let sec = bytes[6] as u32;
    // Convert fractions_256 to milliseconds
    let milli = bytes[8] as u32 * 1000 / 256;

    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_milli_opt(hour, min, sec, milli)
}

#[cfg(test)]
mod test {
    use super::*;

    fn datetime(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 3)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_local_offset() {
        let utc = datetime(23, 30, 0);
        let local = to_local(utc, 3_600);
        assert_eq!(local.hour(), 0);
        assert_eq!(local.minute(), 30);
        assert_eq!(to_local(utc, -1_800).hour(), 23);
        assert_eq!(to_local(utc, -1_800).minute(), 0);
    }

    #[test]
    fn test_next_minute() {
        assert_eq!(secs_until_next_minute(&datetime(12, 0, 0)), 60);
        assert_eq!(secs_until_next_minute(&datetime(12, 0, 1)), 59);
        assert_eq!(secs_until_next_minute(&datetime(12, 0, 59)), 1);
    }

    #[test]
    fn test_event_inside_fractional_second_ticks() {
        let at = |m: u32, s: u32, milli: u32| {
            NaiveDate::from_ymd_opt(2024, 3, 3)
                .unwrap()
                .and_hms_milli_opt(12, m, s, milli)
                .unwrap()
        };

        // Timer armed at 12:00:30.600 for 30 s fires at 12:01:00.600
        let mut minutes = MinuteTracker::new(&at(0, 30, 600));
        assert!(!minutes.poll(&at(0, 59, 900)));
        // A host event wins the race at 12:01:00.300
        assert!(minutes.poll(&at(1, 0, 300)));
        // The timer re-armed from there must not tick 12:01 twice
        assert!(!minutes.poll(&at(1, 0, 600)));
        assert!(!minutes.poll(&at(1, 59, 999)));
        assert!(minutes.poll(&at(2, 0, 300)));
    }

    #[test]
    fn test_clock_set_back_ticks() {
        let mut minutes = MinuteTracker::new(&datetime(12, 10, 0));
        assert!(minutes.poll(&datetime(12, 5, 0)));
        assert!(!minutes.poll(&datetime(12, 5, 30)));
    }

    #[test]
    fn test_current_time_service() {
        // 2024-03-03 14:05:30, Sunday, 128/256 s, manual update
        let bytes = [0xe8, 0x07, 3, 3, 14, 5, 30, 7, 128, 1];
        let time = parse_current_time(&bytes).unwrap();
        assert_eq!(time.date(), NaiveDate::from_ymd_opt(2024, 3, 3).unwrap());
        assert_eq!((time.hour(), time.minute(), time.second()), (14, 5, 30));
        assert_eq!(time.nanosecond(), 500_000_000);

        assert_eq!(parse_current_time(&bytes[..5]), None);
        let invalid_month = [0xe8, 0x07, 13, 3, 14, 5, 30, 7, 0, 0];
        assert_eq!(parse_current_time(&invalid_month), None);
    }
}
