//! Configuration baked in at build time
//!
//! `build.rs` forwards `PLANTY_*` variables from `.env`; anything not set keeps
//! the default from [`ControllerConfig::default`].

use log::{error, info};
use planty_core::ControllerConfig;
use planty_core::config::OVERRIDE_KEYS;

const BAKED_OVERRIDES: [(&str, Option<&str>); 12] = [
    ("PLANTY_NIGHT_THRESHOLD", option_env!("PLANTY_NIGHT_THRESHOLD")),
    ("PLANTY_DAYLIGHT_POLARITY", option_env!("PLANTY_DAYLIGHT_POLARITY")),
    ("PLANTY_MOISTURE_THRESHOLD", option_env!("PLANTY_MOISTURE_THRESHOLD")),
    ("PLANTY_DRYNESS_POLARITY", option_env!("PLANTY_DRYNESS_POLARITY")),
    ("PLANTY_PUMP_ON_TIME_MS", option_env!("PLANTY_PUMP_ON_TIME_MS")),
    ("PLANTY_PUMP_MAX_ON_TIME_MS", option_env!("PLANTY_PUMP_MAX_ON_TIME_MS")),
    ("PLANTY_CYCLE_PERIOD_MS", option_env!("PLANTY_CYCLE_PERIOD_MS")),
    ("PLANTY_PACKET_SPACING_MS", option_env!("PLANTY_PACKET_SPACING_MS")),
    ("PLANTY_PACKET_BITS", option_env!("PLANTY_PACKET_BITS")),
    ("PLANTY_TELEMETRY_ENABLED", option_env!("PLANTY_TELEMETRY_ENABLED")),
    ("PLANTY_RADIO_REPEAT", option_env!("PLANTY_RADIO_REPEAT")),
    ("PLANTY_RADIO_PULSE_US", option_env!("PLANTY_RADIO_PULSE_US")),
];

// `option_env!` needs literal names, so the table above is spelled out. It must
// list the same keys, in the same order, as the ones `build.rs` forwards.
const _: () = assert!(
    keys_match(&BAKED_OVERRIDES, &OVERRIDE_KEYS),
    "BAKED_OVERRIDES is out of sync with planty_core::config::OVERRIDE_KEYS"
);

const fn keys_match(baked: &[(&str, Option<&str>)], expected: &[&str]) -> bool {
    if baked.len() != expected.len() {
        return false;
    }
    let mut i = 0;
    while i < baked.len() {
        let (a, b) = (baked[i].0.as_bytes(), expected[i].as_bytes());
        if a.len() != b.len() {
            return false;
        }
        let mut j = 0;
        while j < a.len() {
            if a[j] != b[j] {
                return false;
            }
            j += 1;
        }
        i += 1;
    }
    true
}

/// Build the controller configuration.
///
/// Bad overrides are logged and skipped. If the result does not validate the
/// defaults are used instead, so the plant keeps being cared for.
pub fn load_config() -> ControllerConfig {
    let mut config = ControllerConfig::default();

    for (key, value) in BAKED_OVERRIDES {
        let Some(value) = value else { continue };
        match config.apply_override(key, value) {
            Ok(()) => info!("Config override {}={}", key, value),
            Err(e) => error!("Ignoring config override {}={}: {}", key, value, e),
        }
    }

    if let Err(e) = config.validate() {
        error!("{}, falling back to default configuration", e);
        return ControllerConfig::default();
    }

    config
}
