//! Battery status check
//!
//! Implementation based upon https://github.com/dbrgn/pinetime-rtic/blob/master/pinetime-rtic/src/battery.rs
//! and https://wiki.pine64.org/wiki/PineTime.

use embassy_nrf::{
    gpio::Input,
    peripherals::{P0_12, P0_19},
    saadc::Saadc,
};
use pinetime_ringface::battery::{self, millivolts_from_adc, percent_from_millivolts, BatteryChargeState};

/// Battery configuration
struct BatteryConfig<'a> {
    /// ADC instance for battery voltage measurement
    adc: Saadc<'a, 1>,
    /// Charge indication pin:
    /// high = battery, low = charging
    pin_charge_indication: Input<'a, P0_12>,
    /// Power presence pin:
    /// high = no power, low = charger connected
    pin_power_presence: Input<'a, P0_19>,
}

/// Battery API
pub struct Battery {
    /// Battery configuration
    config: BatteryConfig<'static>,
}

impl Battery {
    /// Configure battery settings on boot
    pub fn init(
        adc: Saadc<'static, 1>,
        charge_pin: Input<'static, P0_12>,
        power_pin: Input<'static, P0_19>,
    ) -> Self {
        Self {
            config: BatteryConfig {
                adc,
                pin_charge_indication: charge_pin,
                pin_power_presence: power_pin,
            },
        }
    }

    /// Charging state of the battery
    pub fn is_charging(&self) -> bool {
        self.config.pin_charge_indication.is_low()
    }

    /// Charger connected
    pub fn is_plugged(&self) -> bool {
        self.config.pin_power_presence.is_low()
    }

    /// Sample the battery.
    pub async fn state(&mut self) -> Result<BatteryChargeState, battery::Error> {
        let mut buf = [0; 1];
        self.config.adc.sample(&mut buf).await;
        let voltage = millivolts_from_adc(buf[0])?;

        Ok(BatteryChargeState {
            charge_percent: percent_from_millivolts(voltage),
            is_charging: self.is_charging(),
            is_plugged: self.is_plugged(),
        })
    }
}
