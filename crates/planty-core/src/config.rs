//! Deployment configuration for the irrigation controller
//!
//! Thresholds and their comparison direction depend on how the sensors are
//! wired and calibrated, so they live here rather than in the decision logic.
//! Defaults match the reference hardware: a photoresistor divider where a
//! higher reading means brighter light, and a resistive soil probe where a
//! higher reading means drier soil.

use core::str::FromStr;

use embassy_time::Duration;
use serde::{Deserialize, Serialize};
use thiserror_no_std::Error;

use crate::decision::Comparison;

/// Largest packet value on the wire (`13 * 1000 + 999`) needs 14 bits.
pub const MIN_PACKET_BITS: u8 = 14;
pub const MAX_PACKET_BITS: u8 = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Unknown configuration key")]
    UnknownKey,
    #[error("Invalid value for {key}")]
    InvalidValue { key: &'static str },
    #[error("Invalid configuration: {reason}")]
    Invalid { reason: &'static str },
}

/// Controller configuration.
///
/// Durations are stored as milliseconds so the struct stays plain data for
/// serde; use the accessor methods to get [`Duration`] values.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct ControllerConfig {
    /// Light level separating night from day
    pub night_threshold: u16,
    /// Direction in which light must cross `night_threshold` to count as day
    pub daylight_polarity: Comparison,
    /// Soil moisture level separating wet from dry
    pub moisture_threshold: u16,
    /// Direction in which moisture must cross `moisture_threshold` to count as dry
    pub dryness_polarity: Comparison,
    pub pump_on_time_ms: u32,
    /// Upper bound accepted for `pump_on_time_ms`
    pub pump_max_on_time_ms: u32,
    pub cycle_period_ms: u32,
    /// Pause between consecutive telemetry packets
    pub packet_spacing_ms: u32,
    pub packet_bits: u8,
    pub telemetry_enabled: bool,
    /// How many times the radio repeats each packet
    pub radio_repeat: u8,
    /// Base pulse length of the OOK protocol in microseconds
    pub radio_pulse_us: u16,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            night_threshold: 600,
            daylight_polarity: Comparison::Above,
            moisture_threshold: 850,
            dryness_polarity: Comparison::Above,
            pump_on_time_ms: 10 * 1000,
            pump_max_on_time_ms: 30 * 1000,
            cycle_period_ms: 10 * 60 * 1000,
            packet_spacing_ms: 500,
            packet_bits: 24,
            telemetry_enabled: true,
            radio_repeat: 10,
            radio_pulse_us: 350,
        }
    }
}

impl ControllerConfig {
    pub const fn pump_on_time(&self) -> Duration {
        Duration::from_millis(self.pump_on_time_ms as u64)
    }

    pub const fn cycle_period(&self) -> Duration {
        Duration::from_millis(self.cycle_period_ms as u64)
    }

    pub const fn packet_spacing(&self) -> Duration {
        Duration::from_millis(self.packet_spacing_ms as u64)
    }

    /// Check the configuration for values the controller cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pump_on_time_ms == 0 {
            return Err(ConfigError::Invalid {
                reason: "pump on-time must be non-zero",
            });
        }
        if self.pump_on_time_ms > self.pump_max_on_time_ms {
            return Err(ConfigError::Invalid {
                reason: "pump on-time exceeds the configured maximum",
            });
        }
        if self.cycle_period_ms == 0 {
            return Err(ConfigError::Invalid {
                reason: "cycle period must be non-zero",
            });
        }
        if self.pump_on_time_ms >= self.cycle_period_ms {
            return Err(ConfigError::Invalid {
                reason: "pump on-time must be shorter than the cycle period",
            });
        }
        if !(MIN_PACKET_BITS..=MAX_PACKET_BITS).contains(&self.packet_bits) {
            return Err(ConfigError::Invalid {
                reason: "packet width must be between 14 and 32 bits",
            });
        }
        if self.radio_repeat == 0 || self.radio_pulse_us == 0 {
            return Err(ConfigError::Invalid {
                reason: "radio repeat count and pulse length must be non-zero",
            });
        }
        Ok(())
    }

    /// Set a single field from its `PLANTY_*` key and string value.
    ///
    /// Keys match the environment variables read by the firmware build script
    /// and the simulator, e.g. `PLANTY_NIGHT_THRESHOLD=550`.
    pub fn apply_override(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        match key {
            "PLANTY_NIGHT_THRESHOLD" => {
                self.night_threshold = parse(value, "PLANTY_NIGHT_THRESHOLD")?
            }
            "PLANTY_DAYLIGHT_POLARITY" => {
                self.daylight_polarity = parse(value, "PLANTY_DAYLIGHT_POLARITY")?
            }
            "PLANTY_MOISTURE_THRESHOLD" => {
                self.moisture_threshold = parse(value, "PLANTY_MOISTURE_THRESHOLD")?
            }
            "PLANTY_DRYNESS_POLARITY" => {
                self.dryness_polarity = parse(value, "PLANTY_DRYNESS_POLARITY")?
            }
            "PLANTY_PUMP_ON_TIME_MS" => {
                self.pump_on_time_ms = parse(value, "PLANTY_PUMP_ON_TIME_MS")?
            }
            "PLANTY_PUMP_MAX_ON_TIME_MS" => {
                self.pump_max_on_time_ms = parse(value, "PLANTY_PUMP_MAX_ON_TIME_MS")?
            }
            "PLANTY_CYCLE_PERIOD_MS" => {
                self.cycle_period_ms = parse(value, "PLANTY_CYCLE_PERIOD_MS")?
            }
            "PLANTY_PACKET_SPACING_MS" => {
                self.packet_spacing_ms = parse(value, "PLANTY_PACKET_SPACING_MS")?
            }
            "PLANTY_PACKET_BITS" => self.packet_bits = parse(value, "PLANTY_PACKET_BITS")?,
            "PLANTY_TELEMETRY_ENABLED" => {
                self.telemetry_enabled = parse(value, "PLANTY_TELEMETRY_ENABLED")?
            }
            "PLANTY_RADIO_REPEAT" => self.radio_repeat = parse(value, "PLANTY_RADIO_REPEAT")?,
            "PLANTY_RADIO_PULSE_US" => {
                self.radio_pulse_us = parse(value, "PLANTY_RADIO_PULSE_US")?
            }
            _ => return Err(ConfigError::UnknownKey),
        }
        Ok(())
    }
}

/// Every key accepted by [`ControllerConfig::apply_override`].
pub const OVERRIDE_KEYS: [&str; 12] = [
    "PLANTY_NIGHT_THRESHOLD",
    "PLANTY_DAYLIGHT_POLARITY",
    "PLANTY_MOISTURE_THRESHOLD",
    "PLANTY_DRYNESS_POLARITY",
    "PLANTY_PUMP_ON_TIME_MS",
    "PLANTY_PUMP_MAX_ON_TIME_MS",
    "PLANTY_CYCLE_PERIOD_MS",
    "PLANTY_PACKET_SPACING_MS",
    "PLANTY_PACKET_BITS",
    "PLANTY_TELEMETRY_ENABLED",
    "PLANTY_RADIO_REPEAT",
    "PLANTY_RADIO_PULSE_US",
];

fn parse<T: FromStr>(value: &str, key: &'static str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue { key })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ControllerConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.cycle_period(), Duration::from_secs(600));
        assert_eq!(config.pump_on_time(), Duration::from_secs(10));
        assert_eq!(config.packet_spacing(), Duration::from_millis(500));
    }

    #[test]
    fn test_pump_on_time_limits() {
        let mut config = ControllerConfig::default();
        config.pump_on_time_ms = 0;
        assert!(config.validate().is_err());

        config.pump_on_time_ms = config.pump_max_on_time_ms + 1;
        assert!(config.validate().is_err());

        config.pump_max_on_time_ms = u32::MAX;
        config.pump_on_time_ms = config.cycle_period_ms;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_packet_width_must_hold_largest_tag() {
        let mut config = ControllerConfig::default();
        config.packet_bits = 13;
        assert!(config.validate().is_err());
        config.packet_bits = 14;
        assert_eq!(config.validate(), Ok(()));
        config.packet_bits = 33;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides() {
        let mut config = ControllerConfig::default();
        config.apply_override("PLANTY_NIGHT_THRESHOLD", "550").unwrap();
        config.apply_override("PLANTY_DRYNESS_POLARITY", "below").unwrap();
        config.apply_override("PLANTY_TELEMETRY_ENABLED", " false ").unwrap();

        assert_eq!(config.night_threshold, 550);
        assert_eq!(config.dryness_polarity, Comparison::Below);
        assert!(!config.telemetry_enabled);
    }

    #[test]
    fn test_override_errors() {
        let mut config = ControllerConfig::default();
        assert_eq!(
            config.apply_override("PLANTY_PACKET_BITS", "lots"),
            Err(ConfigError::InvalidValue {
                key: "PLANTY_PACKET_BITS"
            })
        );
        assert_eq!(
            config.apply_override("PLANTY_COLOUR", "green"),
            Err(ConfigError::UnknownKey)
        );
        assert_eq!(config, ControllerConfig::default());
    }

    #[test]
    fn test_every_listed_key_is_accepted() {
        for key in OVERRIDE_KEYS {
            let mut config = ControllerConfig::default();
            let value = match key {
                "PLANTY_DAYLIGHT_POLARITY" | "PLANTY_DRYNESS_POLARITY" => "above",
                "PLANTY_TELEMETRY_ENABLED" => "true",
                _ => "20",
            };
            assert_eq!(config.apply_override(key, value), Ok(()), "{key}");
        }
    }
}
