//! Desktop simulator for the planty-rs irrigation controller.
//!
//! Runs the real control cycle from `planty-core` against a simulated pot:
//! light follows a day/night curve, the soil dries out over time and gets
//! wetter while the pump runs, and the tank slowly empties. Telemetry packets
//! are decoded and logged the way a receiver would see them.
//!
//! # Environment
//!
//! | Variable              | Default | Meaning                              |
//! |-----------------------|---------|--------------------------------------|
//! | `PLANTY_SIM_CYCLES`   | 144     | Number of cycles to run (one day)    |
//! | `PLANTY_SIM_SPEEDUP`  | 600     | Simulated seconds per wall second    |
//! | `PLANTY_*`            |         | Controller config overrides          |
//!
//! Set `RUST_LOG=debug` to see every packet as it is sent.

use std::cell::RefCell;
use std::f64::consts::TAU;
use std::rc::Rc;
use std::time::Duration;

use embassy_futures::block_on;
use embedded_hal_async::delay::DelayNs;
use log::{debug, error, info, warn};

use planty_core::pump::{PumpActuator, PumpError};
use planty_core::sensors::{AirReading, SensorError, SensorSuite};
use planty_core::telemetry::{Packet, Transmitter};
use planty_core::{Controller, ControllerConfig};

// ---------------------------------------------------------------------------
// Simulation constants
// ---------------------------------------------------------------------------

const DEFAULT_CYCLES: u32 = 144;
const DEFAULT_SPEEDUP: f64 = 600.0;

const SECONDS_PER_DAY: f64 = 24.0 * 60.0 * 60.0;

/// Simulation starts shortly before sunrise.
const START_TIME_SECS: f64 = 5.0 * 60.0 * 60.0;

/// Soil probe counts gained per second while drying (higher = drier)
const DRYING_RATE: f64 = 0.04;
/// Soil probe counts lost per second of pumping
const WATERING_RATE: f64 = 25.0;
const PUMP_FLOW_LITRES_PER_SEC: f64 = 0.02;
const TANK_CAPACITY_LITRES: f64 = 2.0;

/// Every Nth air reading comes back as NaN, like a flaky DHT-style sensor.
const AIR_GLITCH_EVERY: u32 = 37;

// ---------------------------------------------------------------------------
// Simulated pot
// ---------------------------------------------------------------------------

struct Garden {
    elapsed_secs: f64,
    soil_moisture: f64,
    tank_litres: f64,
    pump_on: bool,
    air_reads: u32,
}

impl Garden {
    fn new() -> Self {
        Self {
            elapsed_secs: START_TIME_SECS,
            soil_moisture: 820.0,
            tank_litres: TANK_CAPACITY_LITRES,
            pump_on: false,
            air_reads: 0,
        }
    }

    /// Advance the pot's clock.
    fn advance(&mut self, secs: f64) {
        self.elapsed_secs += secs;
        if self.pump_on && self.tank_litres > 0.0 {
            self.soil_moisture -= WATERING_RATE * secs;
            self.tank_litres = (self.tank_litres - PUMP_FLOW_LITRES_PER_SEC * secs).max(0.0);
        } else {
            // Soil dries faster in daylight.
            let sun = self.sun();
            self.soil_moisture += DRYING_RATE * (0.5 + sun) * secs;
        }
        self.soil_moisture = self.soil_moisture.clamp(200.0, 1023.0);
    }

    /// Sun elevation in 0..=1, peaking at noon.
    fn sun(&self) -> f64 {
        let day_fraction = (self.elapsed_secs % SECONDS_PER_DAY) / SECONDS_PER_DAY;
        (-(day_fraction * TAU).cos()).max(0.0)
    }

    fn light(&self) -> u16 {
        (40.0 + 960.0 * self.sun()) as u16
    }

    fn air(&mut self) -> AirReading {
        self.air_reads += 1;
        if self.air_reads % AIR_GLITCH_EVERY == 0 {
            return AirReading {
                humidity: f32::NAN,
                temperature: f32::NAN,
            };
        }
        let sun = self.sun();
        AirReading {
            humidity: (65.0 - 20.0 * sun) as f32,
            temperature: (16.0 + 9.0 * sun) as f32,
        }
    }

    fn clock(&self) -> String {
        let secs_of_day = (self.elapsed_secs % SECONDS_PER_DAY) as u64;
        format!("{:02}:{:02}", secs_of_day / 3600, (secs_of_day % 3600) / 60)
    }
}

type SharedGarden = Rc<RefCell<Garden>>;

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

struct SimSensors(SharedGarden);

impl SensorSuite for SimSensors {
    async fn read_light(&mut self) -> Result<u16, SensorError> {
        Ok(self.0.borrow().light())
    }

    async fn read_soil_moisture(&mut self) -> Result<u16, SensorError> {
        Ok(self.0.borrow().soil_moisture as u16)
    }

    async fn read_air(&mut self) -> Result<AirReading, SensorError> {
        Ok(self.0.borrow_mut().air())
    }

    fn water_available(&mut self) -> bool {
        self.0.borrow().tank_litres > 0.0
    }
}

struct SimPump(SharedGarden);

impl PumpActuator for SimPump {
    fn set_pump(&mut self, on: bool) -> Result<(), PumpError> {
        self.0.borrow_mut().pump_on = on;
        Ok(())
    }
}

/// Stands in for the radio and the receiver on the other end.
struct ReceiverConsole {
    received: u32,
}

impl Transmitter for ReceiverConsole {
    type Error = &'static str;

    fn transmit(&mut self, value: u32, bits: u8) -> Result<(), Self::Error> {
        if bits < 32 && value >> bits != 0 {
            return Err("value wider than frame");
        }
        match Packet::from_raw(value).decode() {
            Some((tag, reading)) => {
                debug!("RX {:>5} -> {:?} = {}", value, tag, reading);
                self.received += 1;
                Ok(())
            }
            None => Err("unknown tag"),
        }
    }
}

/// Delay that advances the simulated pot and sleeps a scaled-down amount.
#[derive(Clone)]
struct SimDelay {
    garden: SharedGarden,
    speedup: f64,
}

impl SimDelay {
    fn pass(&self, secs: f64) {
        self.garden.borrow_mut().advance(secs);
        std::thread::sleep(Duration::from_secs_f64(secs / self.speedup));
    }
}

impl DelayNs for SimDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.pass(ns as f64 / 1e9);
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.pass(ms as f64 / 1e3);
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

fn load_config() -> Result<ControllerConfig, String> {
    let mut config = ControllerConfig::default();
    for (key, value) in std::env::vars() {
        if !key.starts_with("PLANTY_") || key.starts_with("PLANTY_SIM_") {
            continue;
        }
        config
            .apply_override(&key, &value)
            .map_err(|e| format!("{key}={value}: {e}"))?;
        info!("Config override {}={}", key, value);
    }
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(value) => value.parse().unwrap_or_else(|_| {
            warn!("Ignoring unparsable {}={}", key, value);
            default
        }),
        Err(_) => default,
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    env_logger::init();
    info!("Starting planty-rs simulator");

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(2);
        }
    };
    let cycles: u32 = env_or("PLANTY_SIM_CYCLES", DEFAULT_CYCLES);
    let speedup: f64 = env_or("PLANTY_SIM_SPEEDUP", DEFAULT_SPEEDUP).max(1.0);
    info!(
        "{} cycles of {} s, running {}x faster than real time",
        cycles,
        config.cycle_period().as_secs(),
        speedup
    );

    let garden: SharedGarden = Rc::new(RefCell::new(Garden::new()));
    let delay = SimDelay {
        garden: garden.clone(),
        speedup,
    };
    let mut idle = delay.clone();
    let mut controller = Controller::new(
        config,
        SimSensors(garden.clone()),
        SimPump(garden.clone()),
        ReceiverConsole { received: 0 },
        delay,
    );

    let period_secs = config.cycle_period().as_millis() as f64 / 1e3;
    let mut waterings = 0;
    let mut faults = 0;

    for cycle in 1..=cycles {
        let started = garden.borrow().elapsed_secs;
        let clock = garden.borrow().clock();

        let report = block_on(controller.run_cycle());
        if report.pumped {
            waterings += 1;
        }
        faults += report.faults.len();
        info!(
            "[{}] cycle {:>3}: {} soil={} tank={:.2} l{}",
            clock,
            cycle,
            if report.decision.is_daytime { "day  " } else { "night" },
            report.readings.soil_moisture,
            garden.borrow().tank_litres,
            if report.pumped { " WATERED" } else { "" }
        );

        // Sleep out the rest of the period, like the firmware's ticker.
        let spent = garden.borrow().elapsed_secs - started;
        let remaining = period_secs - spent;
        if remaining > 0.0 {
            block_on(idle.delay_ms((remaining * 1e3) as u32));
        }
    }

    info!(
        "Simulation finished: {} waterings, {} sensor faults, {} packets received",
        waterings,
        faults,
        controller.transmitter().received
    );
}
