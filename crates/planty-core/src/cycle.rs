//! One sense → decide → water → transmit control cycle
//!
//! The controller does not schedule itself. The firmware drives it from an
//! embassy `Ticker` and the simulator from a plain loop; either way a cycle
//! runs to completion before the next one starts.

use embedded_hal_async::delay::DelayNs;
use log::{error, info};

use crate::config::ControllerConfig;
use crate::decision::{Decision, DecisionEngine};
use crate::pump::{PumpActuator, run_pump};
use crate::reading::{Faults, ReadingAcquirer, ReadingSet};
use crate::sensors::SensorSuite;
use crate::telemetry::{TelemetryEncoder, Transmitter};

/// Summary of one completed cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub readings: ReadingSet,
    pub decision: Decision,
    pub faults: Faults,
    /// The pump ran for the full on-time
    pub pumped: bool,
    pub packets_sent: u8,
}

pub struct Controller<S, P, T, D> {
    config: ControllerConfig,
    sensors: S,
    acquirer: ReadingAcquirer,
    engine: DecisionEngine,
    pump: P,
    telemetry: TelemetryEncoder<T>,
    delay: D,
}

impl<S, P, T, D> Controller<S, P, T, D>
where
    S: SensorSuite,
    P: PumpActuator,
    T: Transmitter,
    D: DelayNs,
{
    pub fn new(config: ControllerConfig, sensors: S, pump: P, transmitter: T, delay: D) -> Self {
        Self {
            config,
            sensors,
            acquirer: ReadingAcquirer::new(),
            engine: DecisionEngine::from_config(&config),
            pump,
            telemetry: TelemetryEncoder::from_config(transmitter, &config),
            delay,
        }
    }

    pub const fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn sensors(&mut self) -> &mut S {
        &mut self.sensors
    }

    pub fn pump(&mut self) -> &mut P {
        &mut self.pump
    }

    pub fn transmitter(&mut self) -> &mut T {
        self.telemetry.transmitter()
    }

    /// Run one full cycle.
    pub async fn run_cycle(&mut self) -> CycleReport {
        let acquisition = self.acquirer.acquire(&mut self.sensors).await;
        let readings = acquisition.readings;
        let decision = self.engine.evaluate(&readings);

        info!(
            "Light: {}, Soil: {}, Air: {}%RH {}C, Water: {} -> {}, pump: {}",
            readings.light,
            readings.soil_moisture,
            readings.air_humidity,
            readings.air_temperature,
            readings.water_available,
            if decision.is_daytime { "day" } else { "night" },
            decision.pump_should_run
        );

        let pumped = if decision.pump_should_run {
            match run_pump(&mut self.pump, &mut self.delay, self.config.pump_on_time()).await {
                Ok(()) => true,
                Err(e) => {
                    error!("Watering aborted: {}", e);
                    false
                }
            }
        } else {
            false
        };

        let packets_sent = if self.config.telemetry_enabled {
            self.telemetry.send(&mut self.delay, &readings).await
        } else {
            0
        };

        info!(
            "Cycle done: {} fault(s), pumped: {}, packets sent: {}",
            acquisition.faults.len(),
            pumped,
            packets_sent
        );

        CycleReport {
            readings,
            decision,
            faults: acquisition.faults,
            pumped,
            packets_sent,
        }
    }
}
