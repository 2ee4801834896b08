//! Text labels

use core::fmt;

use chrono::Timelike;

use crate::clock::ClockStyle;

/// "12:34"
pub const TIME_LABEL_LEN: usize = 8;
/// "100%"
pub const BATTERY_LABEL_LEN: usize = 8;
/// "-2147483648°", the degree sign takes two bytes
pub const TEMPERATURE_LABEL_LEN: usize = 16;

/// Fixed capacity text buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct Label<const N: usize> {
    buf: [u8; N],
    len: usize,
}

impl<const N: usize> Label<N> {
    pub const fn new() -> Self {
        Self {
            buf: [0; N],
            len: 0,
        }
    }

    /// Replace the text with formatted output.
    ///
    /// On overflow the previous text is kept.
    pub fn set_fmt(&mut self, args: fmt::Arguments<'_>) -> Result<(), Error> {
        let mut scratch = [0u8; N];
        let len = format_no_std::show(&mut scratch, args)
            .map_err(|_| Error::Overflow)?
            .len();
        self.buf = scratch;
        self.len = len;
        Ok(())
    }

    pub fn set(&mut self, text: &str) -> Result<(), Error> {
        self.set_fmt(format_args!("{}", text))
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.buf[..self.len]).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<const N: usize> Default for Label<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> fmt::Debug for Label<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Label").field(&self.as_str()).finish()
    }
}

/// Write the clock time.
///
/// 24 hour style is zero padded ("09:05"), 12 hour style isn't ("9:05").
pub fn write_time<const N: usize, T: Timelike>(
    label: &mut Label<N>,
    time: &T,
    style: ClockStyle,
) -> Result<(), Error> {
    match style {
        ClockStyle::TwentyFourHour => {
            label.set_fmt(format_args!("{:02}:{:02}", time.hour(), time.minute()))
        }
        ClockStyle::TwelveHour => {
            let (_, hour) = time.hour12();
            label.set_fmt(format_args!("{}:{:02}", hour, time.minute()))
        }
    }
}

pub fn write_battery<const N: usize>(label: &mut Label<N>, percent: u8) -> Result<(), Error> {
    label.set_fmt(format_args!("{}%", percent))
}

pub fn write_temperature<const N: usize>(label: &mut Label<N>, degrees: i32) -> Result<(), Error> {
    label.set_fmt(format_args!("{}°", degrees))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Text doesn't fit the label
    Overflow,
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::NaiveTime;

    fn time(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    #[test]
    fn test_time_formats() {
        let mut label: Label<TIME_LABEL_LEN> = Label::new();

        write_time(&mut label, &time(9, 5), ClockStyle::TwentyFourHour).unwrap();
        assert_eq!(label.as_str(), "09:05");
        write_time(&mut label, &time(9, 5), ClockStyle::TwelveHour).unwrap();
        assert_eq!(label.as_str(), "9:05");

        write_time(&mut label, &time(0, 5), ClockStyle::TwentyFourHour).unwrap();
        assert_eq!(label.as_str(), "00:05");
        write_time(&mut label, &time(0, 5), ClockStyle::TwelveHour).unwrap();
        assert_eq!(label.as_str(), "12:05");
        write_time(&mut label, &time(13, 59), ClockStyle::TwelveHour).unwrap();
        assert_eq!(label.as_str(), "1:59");
        write_time(&mut label, &time(23, 0), ClockStyle::TwentyFourHour).unwrap();
        assert_eq!(label.as_str(), "23:00");
    }

    #[test]
    fn test_battery_format() {
        let mut label: Label<BATTERY_LABEL_LEN> = Label::new();
        write_battery(&mut label, 100).unwrap();
        assert_eq!(label.as_str(), "100%");
        write_battery(&mut label, 7).unwrap();
        assert_eq!(label.as_str(), "7%");
    }

    #[test]
    fn test_temperature_format() {
        let mut label: Label<TEMPERATURE_LABEL_LEN> = Label::new();
        assert!(label.is_empty());
        write_temperature(&mut label, 72).unwrap();
        assert_eq!(label.as_str(), "72°");
        write_temperature(&mut label, -4).unwrap();
        assert_eq!(label.as_str(), "-4°");
        write_temperature(&mut label, i32::MIN).unwrap();
        assert_eq!(label.as_str(), "-2147483648°");
    }

    #[test]
    fn test_overflow_keeps_previous_text() {
        let mut label: Label<4> = Label::new();
        label.set("abc").unwrap();
        assert_eq!(label.set("abcde"), Err(Error::Overflow));
        assert_eq!(label.as_str(), "abc");
        label.clear();
        assert_eq!(label.as_str(), "");
    }
}
