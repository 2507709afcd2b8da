//! Board wiring and sensor access for the planty controller
//!
//! | Function          | GPIO | Notes                                   |
//! |-------------------|------|-----------------------------------------|
//! | Photoresistor     | 1    | ADC1, divider to 3V3, brighter = higher |
//! | Soil probe        | 2    | ADC1, drier = higher                    |
//! | SHT40 SDA / SCL   | 12/11| I2C0 at 100 kHz                         |
//! | Pump relay        | 9    | active high                             |
//! | 433 MHz TX data   | 13   | OOK transmitter module                  |

use embassy_time::Timer;
use esp_hal::Blocking;
use esp_hal::analog::adc::{Adc, AdcChannel, AdcPin};
use esp_hal::peripherals::{ADC1, GPIO1, GPIO2};
use esp_hal::time::Rate;
use log::error;
use planty_core::sensors::{AirReading, SensorError, SensorSuite};

#[cfg(feature = "sensor-sht40")]
use planty_core::sensors::SHT40Sensor;

/// The pump relay board switches on a high level.
pub const PUMP_ACTIVE_LOW: bool = false;

/// Polls before a one-shot ADC conversion counts as timed out.
const ADC_MAX_POLLS: u8 = 20;
const ADC_POLL_INTERVAL_US: u64 = 50;

pub type BoardAdc = Adc<'static, ADC1<'static>, Blocking>;
pub type LightPin = AdcPin<GPIO1<'static>, ADC1<'static>>;
pub type MoisturePin = AdcPin<GPIO2<'static>, ADC1<'static>>;
pub type BoardI2c = esp_hal::i2c::master::I2c<'static, esp_hal::Async>;

/// Create the async I2C bus for the air sensor.
pub fn create_i2c_bus(
    i2c0: esp_hal::peripherals::I2C0<'static>,
    sda: esp_hal::peripherals::GPIO12<'static>,
    scl: esp_hal::peripherals::GPIO11<'static>,
) -> BoardI2c {
    esp_hal::i2c::master::I2c::new(
        i2c0,
        esp_hal::i2c::master::Config::default().with_frequency(Rate::from_khz(100)),
    )
    .unwrap()
    .with_sda(sda)
    .with_scl(scl)
    .into_async()
}

async fn sample<PIN: AdcChannel>(
    adc: &mut BoardAdc,
    pin: &mut AdcPin<PIN, ADC1<'static>>,
    sensor: &'static str,
) -> Result<u16, SensorError> {
    for _ in 0..ADC_MAX_POLLS {
        if let Ok(raw) = adc.read_oneshot(pin) {
            return Ok(raw);
        }
        Timer::after_micros(ADC_POLL_INTERVAL_US).await;
    }
    error!("{} ADC conversion did not finish", sensor);
    Err(SensorError::Timeout {
        sensor,
        operation: "ADC one-shot conversion",
    })
}

/// All sensors fitted to the reference board.
pub struct BoardSensors {
    adc: BoardAdc,
    light: LightPin,
    moisture: MoisturePin,
    #[cfg(feature = "sensor-sht40")]
    air: SHT40Sensor<BoardI2c>,
}

impl BoardSensors {
    #[cfg(feature = "sensor-sht40")]
    pub fn new(adc: BoardAdc, light: LightPin, moisture: MoisturePin, i2c: BoardI2c) -> Self {
        Self {
            adc,
            light,
            moisture,
            air: SHT40Sensor::new(i2c),
        }
    }

    #[cfg(not(feature = "sensor-sht40"))]
    pub fn new(adc: BoardAdc, light: LightPin, moisture: MoisturePin) -> Self {
        Self {
            adc,
            light,
            moisture,
        }
    }
}

impl SensorSuite for BoardSensors {
    async fn read_light(&mut self) -> Result<u16, SensorError> {
        sample(&mut self.adc, &mut self.light, "Photoresistor").await
    }

    async fn read_soil_moisture(&mut self) -> Result<u16, SensorError> {
        sample(&mut self.adc, &mut self.moisture, "Soil probe").await
    }

    #[cfg(feature = "sensor-sht40")]
    async fn read_air(&mut self) -> Result<AirReading, SensorError> {
        self.air.read().await
    }

    #[cfg(not(feature = "sensor-sht40"))]
    async fn read_air(&mut self) -> Result<AirReading, SensorError> {
        Err(SensorError::ReadFailed {
            sensor: "Air",
            operation: "measure temperature/humidity",
            details: "no air sensor fitted",
        })
    }
}
