#[cfg(feature = "sensor-sht40")]
mod sht40;

use core::future::Future;

use thiserror_no_std::Error;

#[cfg(feature = "sensor-sht40")]
pub use sht40::SHT40Sensor;

/// Errors that can occur while talking to a sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SensorError {
    #[error("{sensor}: {operation} failed ({details})")]
    ReadFailed {
        sensor: &'static str,
        operation: &'static str,
        details: &'static str,
    },
    #[error("{sensor}: timed out during {operation}")]
    Timeout {
        sensor: &'static str,
        operation: &'static str,
    },
}

/// Air humidity (%RH) and temperature (°C) from the ambient air sensor.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AirReading {
    pub humidity: f32,
    pub temperature: f32,
}

/// The sensors one control cycle reads from.
///
/// Light and soil moisture are reported on the sensor's native scale (raw ADC
/// counts on the reference board).
pub trait SensorSuite {
    fn read_light(&mut self) -> impl Future<Output = Result<u16, SensorError>>;

    fn read_soil_moisture(&mut self) -> impl Future<Output = Result<u16, SensorError>>;

    fn read_air(&mut self) -> impl Future<Output = Result<AirReading, SensorError>>;

    /// Whether the water tank has water.
    ///
    /// No tank level sensor is fitted on the reference board, so this reports
    /// water as always available. Boards with a level sensor override it.
    fn water_available(&mut self) -> bool {
        true
    }
}
