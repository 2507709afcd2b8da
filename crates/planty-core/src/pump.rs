//! Water pump actuation

use embassy_time::Duration;
use embedded_hal::digital::{Error as _, ErrorKind, OutputPin};
use embedded_hal_async::delay::DelayNs;
use log::{error, info};
use thiserror_no_std::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PumpError {
    #[error("Pump output pin error: {0:?}")]
    Pin(ErrorKind),
}

/// Anything that can switch the pump on and off.
pub trait PumpActuator {
    fn set_pump(&mut self, on: bool) -> Result<(), PumpError>;
}

/// Pump driven from a single GPIO, usually through a relay or MOSFET.
pub struct PumpDriver<P> {
    pin: P,
    active_low: bool,
    running: bool,
}

impl<P: OutputPin> PumpDriver<P> {
    /// Wrap the pin and drive it to the "off" level.
    pub fn new(pin: P, active_low: bool) -> Result<Self, PumpError> {
        let mut driver = Self {
            pin,
            active_low,
            running: false,
        };
        driver.set_pump(false)?;
        Ok(driver)
    }

    pub const fn is_running(&self) -> bool {
        self.running
    }

    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> PumpActuator for PumpDriver<P> {
    fn set_pump(&mut self, on: bool) -> Result<(), PumpError> {
        let result = if on != self.active_low {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        result.map_err(|e| PumpError::Pin(e.kind()))?;
        self.running = on;
        Ok(())
    }
}

/// Run the pump for `duration`, then switch it off.
///
/// The off command is issued even when switching on failed so a half-driven
/// relay is never left energised.
pub async fn run_pump<A, D>(
    actuator: &mut A,
    delay: &mut D,
    duration: Duration,
) -> Result<(), PumpError>
where
    A: PumpActuator,
    D: DelayNs,
{
    if let Err(e) = actuator.set_pump(true) {
        error!("Failed to switch pump on: {}", e);
        let _ = actuator.set_pump(false);
        return Err(e);
    }

    info!("Pump ON for {} ms", duration.as_millis());
    delay.delay_ms(duration.as_millis() as u32).await;

    actuator.set_pump(false).inspect_err(|e| {
        error!("Failed to switch pump off: {}", e);
    })?;
    info!("Pump OFF");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embassy_futures::block_on;
    use embedded_hal::digital::ErrorType;

    #[derive(Default)]
    struct MockPin {
        levels: Vec<bool>,
    }

    impl ErrorType for MockPin {
        type Error = Infallible;
    }

    impl OutputPin for MockPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.levels.push(false);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.levels.push(true);
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockActuator {
        commands: Vec<bool>,
        fail_on: bool,
    }

    impl PumpActuator for MockActuator {
        fn set_pump(&mut self, on: bool) -> Result<(), PumpError> {
            self.commands.push(on);
            if on && self.fail_on {
                return Err(PumpError::Pin(ErrorKind::Other));
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct MillisDelay {
        waits_ms: Vec<u32>,
    }

    impl DelayNs for MillisDelay {
        async fn delay_ns(&mut self, _ns: u32) {}

        async fn delay_ms(&mut self, ms: u32) {
            self.waits_ms.push(ms);
        }
    }

    #[test]
    fn test_driver_starts_off() {
        let driver = PumpDriver::new(MockPin::default(), false).unwrap();
        assert!(!driver.is_running());
        assert_eq!(driver.release().levels, vec![false]);
    }

    #[test]
    fn test_active_low_inverts_levels() {
        let mut driver = PumpDriver::new(MockPin::default(), true).unwrap();
        driver.set_pump(true).unwrap();
        assert!(driver.is_running());
        driver.set_pump(false).unwrap();
        assert_eq!(driver.release().levels, vec![true, false, true]);
    }

    #[test]
    fn test_run_pump_waits_between_on_and_off() {
        let mut driver = PumpDriver::new(MockPin::default(), false).unwrap();
        let mut delay = MillisDelay::default();

        block_on(run_pump(&mut driver, &mut delay, Duration::from_secs(10))).unwrap();

        assert!(!driver.is_running());
        assert_eq!(delay.waits_ms, vec![10_000]);
        assert_eq!(driver.release().levels, vec![false, true, false]);
    }

    #[test]
    fn test_failed_start_still_switches_off() {
        let mut actuator = MockActuator {
            fail_on: true,
            ..Default::default()
        };
        let mut delay = MillisDelay::default();

        let result = block_on(run_pump(&mut actuator, &mut delay, Duration::from_secs(10)));

        assert_eq!(result, Err(PumpError::Pin(ErrorKind::Other)));
        assert_eq!(actuator.commands, vec![true, false]);
        assert!(delay.waits_ms.is_empty());
    }
}
