//! Watch face configuration

use crate::clock::ClockStyle;
use crate::ui::ring::{RingGeometry, RingVariant};

/// Minutes between two temperature requests.
pub const WEATHER_POLL_MINUTES: u32 = 30;

/// What a watch face variant shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FaceConfig {
    /// Progress ring
    pub ring: RingVariant,
    /// Battery percentage in the top right corner
    pub show_battery: bool,
    /// Temperature below the clock, fetched from the phone
    pub show_temperature: bool,
    /// Request a temperature whenever `minute % weather_poll_minutes == 0`
    pub weather_poll_minutes: u32,
}

impl FaceConfig {
    /// Hours left in the day, with temperature.
    pub const fn countdown() -> Self {
        Self {
            ring: RingVariant::Hours,
            show_battery: false,
            show_temperature: true,
            weather_poll_minutes: WEATHER_POLL_MINUTES,
        }
    }

    /// Minutes left in the hour, with battery percentage.
    pub const fn time_battery() -> Self {
        Self {
            ring: RingVariant::Minutes,
            show_battery: true,
            show_temperature: false,
            weather_poll_minutes: WEATHER_POLL_MINUTES,
        }
    }

    /// Day in ten minute steps, with temperature.
    pub const fn ten_minute() -> Self {
        Self {
            ring: RingVariant::TenMinutes,
            show_battery: false,
            show_temperature: true,
            weather_poll_minutes: WEATHER_POLL_MINUTES,
        }
    }
}

impl Default for FaceConfig {
    fn default() -> Self {
        Self::countdown()
    }
}

/// Everything needed to set up a [`RingWatchface`](crate::ui::RingWatchface).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WatchfaceConfig {
    pub face: FaceConfig,
    pub clock_style: ClockStyle,
    /// Local time offset from UTC in seconds
    pub utc_offset_secs: i32,
    pub geometry: RingGeometry,
}

impl WatchfaceConfig {
    pub const fn new(face: FaceConfig) -> Self {
        Self {
            face,
            clock_style: ClockStyle::TwentyFourHour,
            utc_offset_secs: 0,
            geometry: RingGeometry::COMPACT,
        }
    }

    pub const fn with_clock_style(mut self, clock_style: ClockStyle) -> Self {
        self.clock_style = clock_style;
        self
    }

    pub const fn with_utc_offset(mut self, utc_offset_secs: i32) -> Self {
        self.utc_offset_secs = utc_offset_secs;
        self
    }

    pub const fn with_geometry(mut self, geometry: RingGeometry) -> Self {
        self.geometry = geometry;
        self
    }
}

impl Default for WatchfaceConfig {
    fn default() -> Self {
        Self::new(FaceConfig::default())
    }
}
