//! General system configuration

use embassy_nrf::{
    config::{Config, Debug, HfclkSource, LfclkSource},
    interrupt::Priority,
};
use embedded_graphics::{pixelcolor::Rgb565, prelude::RgbColor};
use pinetime_ringface::{
    clock::ClockStyle,
    config::{FaceConfig, WatchfaceConfig},
    ui::{ring::RingGeometry, Palette},
};

/// Local time offset from UTC
const TIMEZONE: i32 = 3_600;

#[cfg(feature = "face-time-battery")]
const FACE: FaceConfig = FaceConfig::time_battery();
#[cfg(all(feature = "face-ten-minute", not(feature = "face-time-battery")))]
const FACE: FaceConfig = FaceConfig::ten_minute();
#[cfg(not(any(feature = "face-time-battery", feature = "face-ten-minute")))]
const FACE: FaceConfig = FaceConfig::countdown();

/// Watch face settings
pub const WATCHFACE: WatchfaceConfig = WatchfaceConfig::new(FACE)
    .with_clock_style(ClockStyle::TwentyFourHour)
    .with_utc_offset(TIMEZONE)
    .with_geometry(RingGeometry::for_diameter(240));

pub const PALETTE: Palette<Rgb565> = Palette {
    background: Rgb565::BLACK,
    dial: Rgb565::WHITE,
    ink: Rgb565::BLACK,
    text: Rgb565::WHITE,
};

/// Backlight level after boot (0–7)
pub const BRIGHTNESS: u8 = 2;

/// Seconds between two battery samples
pub const BATTERY_POLL_SECS: u64 = 10;

pub struct SystemConfig {}

impl SystemConfig {
    /// Create new system configuration
    pub fn new() -> Config {
        // Generate default config, required because Config is set as
        // `non_exhaustive`
        let mut config = Config::default();

        // Set high-frequency and low-frequency clock sources to external
        config.hfclk_source = HfclkSource::ExternalXtal;
        config.lfclk_source = LfclkSource::ExternalXtal;

        // Enable DC/DC regulator to massively reduce runtime current consumption
        config.dcdc.reg1 = true;

        // Configure interrupt priorities to exclude 0 (default), 1, and 4,
        // which are reserved for the nrf SoftDevice
        config.gpiote_interrupt_priority = Priority::P2;
        config.time_interrupt_priority = Priority::P2;

        // Allow debugging
        config.debug = Debug::Allowed;

        config
    }
}
