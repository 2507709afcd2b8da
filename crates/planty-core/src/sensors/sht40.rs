use embedded_hal_async::i2c::I2c;
use sht4x::Sht4xAsync;

use super::{AirReading, SensorError};

/// SHT40 ambient air sensor.
pub struct SHT40Sensor<I> {
    sensor: Sht4xAsync<I, embassy_time::Delay>,
}

impl<I: I2c> SHT40Sensor<I> {
    pub fn new(i2c: I) -> Self {
        Self {
            sensor: Sht4xAsync::<I, embassy_time::Delay>::new(i2c),
        }
    }

    /// Measure humidity and temperature with high repeatability.
    pub async fn read(&mut self) -> Result<AirReading, SensorError> {
        let measurement = self
            .sensor
            .measure(sht4x::Precision::High, &mut embassy_time::Delay)
            .await
            .map_err(|e| {
                log::error!("SHT40 measurement failed: {:?}", e);
                SensorError::ReadFailed {
                    sensor: "SHT40",
                    operation: "measure temperature/humidity",
                    details: "I2C communication error or sensor not responding",
                }
            })?;

        Ok(AirReading {
            humidity: measurement.humidity_percent().to_num::<f32>(),
            temperature: measurement.temperature_celsius().to_num::<f32>(),
        })
    }
}
