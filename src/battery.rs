//! Battery charge state
//!
//! Conversion formulas based upon https://github.com/dbrgn/pinetime-rtic/blob/master/pinetime-rtic/src/battery.rs
//! and https://wiki.pine64.org/wiki/PineTime.

/// Snapshot of the battery, as handed to the watch face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BatteryChargeState {
    /// Charge in percent (0–100)
    pub charge_percent: u8,
    /// Battery is being charged
    pub is_charging: bool,
    /// Charger is connected
    pub is_plugged: bool,
}

/// Convert a 12 bit SAADC sample into the battery voltage in millivolts.
pub fn millivolts_from_adc(raw_measurement: i16) -> Result<u16, Error> {
    match raw_measurement {
        0..=4095 => {
            // Keep as 32 bit for multiplication.
            // Multiply by 2 * 1000 for mV (voltage divider) and divide by (2 ^ 12 / 3.3V reference).
            let adc_val = raw_measurement as u32;
            Ok((adc_val * 2000 / 1241) as u16)
        }
        _ => Err(Error::InvalidMeasurement),
    }
}

/// Estimate the battery capacity in percent.
///
/// Uses fixed data points and linear interpolation in between.
pub fn percent_from_millivolts(voltage: u16) -> u8 {
    (match voltage {
        0..=3449 => 0,
        3450..=3699 => (voltage - 3450) / 5,
        3700..=4199 => 50 + (voltage - 3700) / 10,
        _ => 100,
    }) as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    InvalidMeasurement,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_adc_conversion() {
        assert_eq!(millivolts_from_adc(0), Ok(0));
        // Full scale is 3.3V on the divided side
        assert_eq!(millivolts_from_adc(4095), Ok(6599));
        assert_eq!(millivolts_from_adc(2482), Ok(4000));
        assert_eq!(millivolts_from_adc(-1), Err(Error::InvalidMeasurement));
        assert_eq!(millivolts_from_adc(4096), Err(Error::InvalidMeasurement));
    }

    #[test]
    fn test_percent_curve() {
        assert_eq!(percent_from_millivolts(3000), 0);
        assert_eq!(percent_from_millivolts(3449), 0);
        assert_eq!(percent_from_millivolts(3450), 0);
        assert_eq!(percent_from_millivolts(3575), 25);
        assert_eq!(percent_from_millivolts(3700), 50);
        assert_eq!(percent_from_millivolts(3950), 75);
        assert_eq!(percent_from_millivolts(4199), 99);
        assert_eq!(percent_from_millivolts(4200), 100);
        assert_eq!(percent_from_millivolts(u16::MAX), 100);
    }
}
