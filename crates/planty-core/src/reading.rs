//! Per-cycle reading snapshots
//!
//! Each control cycle reads every sensor once and freezes the results into a
//! [`ReadingSet`]. Faulty readings never abort a cycle: the acquirer records
//! the fault, logs it and keeps the last known value instead.

use heapless::Vec;
use log::warn;

use crate::sensors::{SensorError, SensorSuite};

/// At most one fault per sensor input (light, soil, air) plus spare room.
pub const MAX_FAULTS: usize = 4;

/// Immutable snapshot of one cycle's readings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadingSet {
    /// Ambient light on the sensor's native scale
    pub light: u16,
    /// Air humidity in %RH
    pub air_humidity: f32,
    /// Air temperature in °C
    pub air_temperature: f32,
    /// Soil moisture on the sensor's native scale
    pub soil_moisture: u16,
    pub water_available: bool,
}

impl Default for ReadingSet {
    fn default() -> Self {
        Self {
            light: 0,
            air_humidity: 0.0,
            air_temperature: 0.0,
            soil_moisture: 0,
            water_available: true,
        }
    }
}

/// A problem detected while acquiring a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorFault {
    LightReadFailed(SensorError),
    /// The light sensor read exactly zero, which points at a wiring fault.
    LightZero,
    SoilMoistureReadFailed(SensorError),
    AirReadFailed(SensorError),
    /// The air sensor returned NaN for humidity and/or temperature.
    AirNotANumber { humidity: bool, temperature: bool },
}

pub type Faults = Vec<SensorFault, MAX_FAULTS>;

/// Result of one acquisition.
#[derive(Debug, Clone, PartialEq)]
pub struct Acquisition {
    pub readings: ReadingSet,
    pub faults: Faults,
}

/// Builds snapshots and remembers the last one for fault fallback.
#[derive(Debug, Clone, Default)]
pub struct ReadingAcquirer {
    last: ReadingSet,
}

impl ReadingAcquirer {
    pub const fn new() -> Self {
        Self {
            last: ReadingSet {
                light: 0,
                air_humidity: 0.0,
                air_temperature: 0.0,
                soil_moisture: 0,
                water_available: true,
            },
        }
    }

    /// The most recent snapshot, or all zeros before the first cycle.
    pub const fn last(&self) -> &ReadingSet {
        &self.last
    }

    /// Read every sensor once and build the next snapshot.
    pub async fn acquire<S: SensorSuite>(&mut self, sensors: &mut S) -> Acquisition {
        let mut next = self.last;
        let mut faults = Faults::new();

        match sensors.read_light().await {
            Ok(0) => {
                warn!("Light sensor reads 0, check the photoresistor wiring");
                next.light = 0;
                record(&mut faults, SensorFault::LightZero);
            }
            Ok(light) => next.light = light,
            Err(e) => {
                warn!("Light read failed, keeping {}: {}", next.light, e);
                record(&mut faults, SensorFault::LightReadFailed(e));
            }
        }

        match sensors.read_air().await {
            Ok(air) => {
                let humidity_nan = air.humidity.is_nan();
                let temperature_nan = air.temperature.is_nan();
                if !humidity_nan {
                    next.air_humidity = air.humidity;
                }
                if !temperature_nan {
                    next.air_temperature = air.temperature;
                }
                if humidity_nan || temperature_nan {
                    warn!(
                        "Air sensor returned NaN (humidity: {}, temperature: {})",
                        humidity_nan, temperature_nan
                    );
                    record(
                        &mut faults,
                        SensorFault::AirNotANumber {
                            humidity: humidity_nan,
                            temperature: temperature_nan,
                        },
                    );
                }
            }
            Err(e) => {
                warn!("Air read failed, keeping last values: {}", e);
                record(&mut faults, SensorFault::AirReadFailed(e));
            }
        }

        match sensors.read_soil_moisture().await {
            Ok(moisture) => next.soil_moisture = moisture,
            Err(e) => {
                warn!(
                    "Soil moisture read failed, keeping {}: {}",
                    next.soil_moisture, e
                );
                record(&mut faults, SensorFault::SoilMoistureReadFailed(e));
            }
        }

        next.water_available = sensors.water_available();

        self.last = next;
        Acquisition {
            readings: next,
            faults,
        }
    }
}

fn record(faults: &mut Faults, fault: SensorFault) {
    // Capacity covers every fault one acquisition can produce.
    let _ = faults.push(fault);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::AirReading;
    use embassy_futures::block_on;

    const I2C_ERROR: SensorError = SensorError::ReadFailed {
        sensor: "TEST",
        operation: "read",
        details: "bus error",
    };

    struct ScriptedSensors {
        light: Result<u16, SensorError>,
        moisture: Result<u16, SensorError>,
        air: Result<AirReading, SensorError>,
        water: bool,
    }

    impl ScriptedSensors {
        fn healthy() -> Self {
            Self {
                light: Ok(720),
                moisture: Ok(430),
                air: Ok(AirReading {
                    humidity: 55.5,
                    temperature: 21.25,
                }),
                water: true,
            }
        }
    }

    impl SensorSuite for ScriptedSensors {
        async fn read_light(&mut self) -> Result<u16, SensorError> {
            self.light
        }

        async fn read_soil_moisture(&mut self) -> Result<u16, SensorError> {
            self.moisture
        }

        async fn read_air(&mut self) -> Result<AirReading, SensorError> {
            self.air
        }

        fn water_available(&mut self) -> bool {
            self.water
        }
    }

    #[test]
    fn test_healthy_snapshot() {
        let mut acquirer = ReadingAcquirer::new();
        let acquisition = block_on(acquirer.acquire(&mut ScriptedSensors::healthy()));

        assert!(acquisition.faults.is_empty());
        assert_eq!(
            acquisition.readings,
            ReadingSet {
                light: 720,
                air_humidity: 55.5,
                air_temperature: 21.25,
                soil_moisture: 430,
                water_available: true,
            }
        );
        assert_eq!(acquirer.last(), &acquisition.readings);
    }

    #[test]
    fn test_failed_reads_keep_last_values() {
        let mut acquirer = ReadingAcquirer::new();
        let mut sensors = ScriptedSensors::healthy();
        let first = block_on(acquirer.acquire(&mut sensors)).readings;

        sensors.light = Err(I2C_ERROR);
        sensors.moisture = Err(I2C_ERROR);
        sensors.air = Err(I2C_ERROR);
        let second = block_on(acquirer.acquire(&mut sensors));

        assert_eq!(second.readings, first);
        assert_eq!(
            second.faults.as_slice(),
            &[
                SensorFault::LightReadFailed(I2C_ERROR),
                SensorFault::AirReadFailed(I2C_ERROR),
                SensorFault::SoilMoistureReadFailed(I2C_ERROR),
            ]
        );
    }

    #[test]
    fn test_first_cycle_faults_fall_back_to_zero() {
        let mut acquirer = ReadingAcquirer::new();
        let mut sensors = ScriptedSensors::healthy();
        sensors.moisture = Err(I2C_ERROR);
        sensors.air = Err(I2C_ERROR);

        let acquisition = block_on(acquirer.acquire(&mut sensors));
        assert_eq!(acquisition.readings.soil_moisture, 0);
        assert_eq!(acquisition.readings.air_humidity, 0.0);
        assert_eq!(acquisition.readings.air_temperature, 0.0);
        assert_eq!(acquisition.readings.light, 720);
    }

    #[test]
    fn test_zero_light_is_reported_but_used() {
        let mut acquirer = ReadingAcquirer::new();
        let mut sensors = ScriptedSensors::healthy();
        block_on(acquirer.acquire(&mut sensors));

        sensors.light = Ok(0);
        let acquisition = block_on(acquirer.acquire(&mut sensors));
        assert_eq!(acquisition.readings.light, 0);
        assert_eq!(acquisition.faults.as_slice(), &[SensorFault::LightZero]);
    }

    #[test]
    fn test_nan_fields_keep_last_value_individually() {
        let mut acquirer = ReadingAcquirer::new();
        let mut sensors = ScriptedSensors::healthy();
        block_on(acquirer.acquire(&mut sensors));

        sensors.air = Ok(AirReading {
            humidity: f32::NAN,
            temperature: 18.0,
        });
        let acquisition = block_on(acquirer.acquire(&mut sensors));

        assert_eq!(acquisition.readings.air_humidity, 55.5);
        assert_eq!(acquisition.readings.air_temperature, 18.0);
        assert_eq!(
            acquisition.faults.as_slice(),
            &[SensorFault::AirNotANumber {
                humidity: true,
                temperature: false
            }]
        );
    }

    #[test]
    fn test_water_flag_is_sampled_every_cycle() {
        let mut acquirer = ReadingAcquirer::new();
        let mut sensors = ScriptedSensors::healthy();
        sensors.water = false;
        assert!(!block_on(acquirer.acquire(&mut sensors)).readings.water_available);
        sensors.water = true;
        assert!(block_on(acquirer.acquire(&mut sensors)).readings.water_available);
    }
}
