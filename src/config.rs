// Values are raw ADC units unless the name says otherwise. The channel is a
// 16 bit signed conversion across +/-10V, so one volt is 3276.7 counts.
//
// Earlier board revisions used different band encodings and sample counts,
// these are the ones that match the current front end.

use embassy_time::Duration;

use crate::error::{ConfigurationError, Error};
use crate::relay::TripMode;

pub const SAMPLES_PER_PERIOD: usize = 16;

pub const VOLTAGE_NOMINAL: f32 = 8191.9;
pub const VOLTAGE_UPPER_BOUND: f32 = 9830.3;
pub const VOLTAGE_LOWER_BOUND: f32 = 6553.5;
pub const VOLTS_PER_UNIT: f32 = 3276.7;

pub const DEFINITE_TRIP_TIME_MS: u32 = 5000;
pub const INVERSE_TRIP_FLOOR_MS: u32 = 1000;
// inverse time progress added per evaluation
pub const EVALUATION_STEP_MS: u32 = 10;

// 16 samples per 50Hz cycle
pub const SAMPLE_PERIOD: Duration = Duration::from_micros(1250);
pub const TRIP_CLOCK_PERIOD: Duration = Duration::from_millis(EVALUATION_STEP_MS as u64);

#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RelayConfig {
    pub upper: f32,
    pub lower: f32,
    pub nominal: f32,
    pub volts_per_unit: f32,
    pub definite_trip_ms: u32,
    pub inverse_floor_ms: u32,
    pub evaluation_step_ms: u32,
    pub initial_mode: TripMode,
}

pub const DEFAULT_RELAY_CONFIG: RelayConfig = RelayConfig {
    upper: VOLTAGE_UPPER_BOUND,
    lower: VOLTAGE_LOWER_BOUND,
    nominal: VOLTAGE_NOMINAL,
    volts_per_unit: VOLTS_PER_UNIT,
    definite_trip_ms: DEFINITE_TRIP_TIME_MS,
    inverse_floor_ms: INVERSE_TRIP_FLOOR_MS,
    evaluation_step_ms: EVALUATION_STEP_MS,
    initial_mode: TripMode::Definite,
};

impl RelayConfig {
    pub fn validate(&self) -> Result<(), Error> {
        // written as negations so NaN bounds fail too
        if !(self.upper > self.lower) {
            return Err(ConfigurationError::ThresholdsInverted.into());
        }

        if !(self.nominal > self.lower && self.nominal < self.upper) {
            return Err(ConfigurationError::NominalOutOfBand.into());
        }

        if !(self.volts_per_unit > 0.0) {
            return Err(ConfigurationError::NonPositiveScale.into());
        }

        if self.definite_trip_ms == 0 || self.inverse_floor_ms == 0 || self.evaluation_step_ms == 0 {
            return Err(ConfigurationError::ZeroDuration.into());
        }

        Ok(())
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        DEFAULT_RELAY_CONFIG
    }
}
