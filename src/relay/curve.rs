use libm::{fabsf, roundf};

use crate::config::RelayConfig;

// deviations at or below this are treated as a measurement inconsistency
pub const MIN_DEVIATION: f32 = 1.0e-6;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TripMode {
    Definite,
    Inverse,
}

impl TripMode {
    /// Wire encoding used by the timing mode command.
    pub const fn as_u8(self) -> u8 {
        match self {
            TripMode::Definite => 1,
            TripMode::Inverse => 2,
        }
    }

    pub const fn from_u8(val: u8) -> Option<Self> {
        match val {
            1 => Some(TripMode::Definite),
            2 => Some(TripMode::Inverse),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    AboveUpper,
    BelowLower,
}

impl Direction {
    /// The tap changer action that corrects this excursion.
    pub const fn corrective_action(self) -> Action {
        match self {
            Direction::AboveUpper => Action::Lower,
            Direction::BelowLower => Action::Raise,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    Raise,
    Lower,
    Alarm,
}

/// Where a magnitude sits against the band, `None` for in band.
///
/// Bounds are inclusive. `Err(())` for values that can't be classified (NaN).
pub fn classify(rms: f32, config: &RelayConfig) -> Result<Option<Direction>, ()> {
    if rms > config.upper {
        Ok(Some(Direction::AboveUpper))
    } else if rms < config.lower {
        Ok(Some(Direction::BelowLower))
    } else if rms >= config.lower && rms <= config.upper {
        Ok(None)
    } else {
        Err(())
    }
}

/// Distance from nominal in volts.
pub fn deviation(rms: f32, config: &RelayConfig) -> f32 {
    fabsf(rms - config.nominal) / config.volts_per_unit
}

/// Inverse time curve, t = 5 / (2 * deviation) seconds, floored.
///
/// `None` when the deviation is too small to divide by.
pub fn inverse_trip_time_ms(deviation: f32, floor_ms: u32) -> Option<u32> {
    // negated so NaN lands in the guard as well
    if !(deviation > MIN_DEVIATION) {
        return None;
    }

    let target_ms = roundf((5.0 / (2.0 * deviation)) * 1000.0);

    // float to int casts saturate
    Some((target_ms as u32).max(floor_ms))
}
