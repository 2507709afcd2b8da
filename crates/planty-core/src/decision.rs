//! Irrigation decision engine
//!
//! Classifies the current period as day or night and decides whether the
//! pump should run. The engine is a pure function of its inputs: it keeps no
//! state between cycles and has no hysteresis band.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::ControllerConfig;
use crate::reading::ReadingSet;

/// Direction in which a reading must cross its threshold.
///
/// Both comparisons are strict, so a reading equal to the threshold never
/// satisfies either direction.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// `value > threshold`
    Above,
    /// `value < threshold`
    Below,
}

impl Comparison {
    #[inline]
    pub const fn holds(self, value: u16, threshold: u16) -> bool {
        match self {
            Self::Above => value > threshold,
            Self::Below => value < threshold,
        }
    }
}

impl FromStr for Comparison {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("above") || s == ">" {
            Ok(Self::Above)
        } else if s.eq_ignore_ascii_case("below") || s == "<" {
            Ok(Self::Below)
        } else {
            Err(())
        }
    }
}

/// Outcome of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Decision {
    pub is_daytime: bool,
    pub pump_should_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecisionEngine {
    night_threshold: u16,
    daylight_polarity: Comparison,
    moisture_threshold: u16,
    dryness_polarity: Comparison,
}

impl DecisionEngine {
    pub const fn new(
        night_threshold: u16,
        daylight_polarity: Comparison,
        moisture_threshold: u16,
        dryness_polarity: Comparison,
    ) -> Self {
        Self {
            night_threshold,
            daylight_polarity,
            moisture_threshold,
            dryness_polarity,
        }
    }

    pub const fn from_config(config: &ControllerConfig) -> Self {
        Self::new(
            config.night_threshold,
            config.daylight_polarity,
            config.moisture_threshold,
            config.dryness_polarity,
        )
    }

    pub const fn is_daytime(&self, light: u16) -> bool {
        self.daylight_polarity.holds(light, self.night_threshold)
    }

    pub const fn is_dry(&self, soil_moisture: u16) -> bool {
        self.dryness_polarity
            .holds(soil_moisture, self.moisture_threshold)
    }

    /// Watering requires daylight, dry soil and water in the tank.
    pub const fn decide(&self, light: u16, soil_moisture: u16, water_available: bool) -> Decision {
        let is_daytime = self.is_daytime(light);
        Decision {
            is_daytime,
            pump_should_run: is_daytime && self.is_dry(soil_moisture) && water_available,
        }
    }

    pub const fn evaluate(&self, readings: &ReadingSet) -> Decision {
        self.decide(
            readings.light,
            readings.soil_moisture,
            readings.water_available,
        )
    }
}

impl Default for DecisionEngine {
    fn default() -> Self {
        Self::from_config(&ControllerConfig::default())
    }
}
