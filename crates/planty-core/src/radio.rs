//! On-off keyed transmitter for cheap 315/433 MHz radio modules
//!
//! Produces the pulse train understood by the common "RC switch" receivers
//! (protocol 1). Each bit is a high pulse followed by a low pulse, measured
//! in multiples of the base pulse length:
//!
//! ```text
//! bit 0:  ‾|___        high 1, low 3
//! bit 1:  ‾‾‾|_        high 3, low 1
//! sync:   ‾|_____…_    high 1, low 31
//! ```
//!
//! A frame is the value's bits MSB first followed by one sync pulse. Frames are
//! repeated back to back so a receiver that misses one still gets the packet.
//!
//! Timing uses a blocking delay: pulse edges must not be stretched by executor
//! scheduling.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{Error as _, ErrorKind, OutputPin};
use thiserror_no_std::Error;

use crate::config::ControllerConfig;
use crate::telemetry::Transmitter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RadioError {
    #[error("Value {value} does not fit in {bits} bits")]
    ValueTooWide { value: u32, bits: u8 },
    #[error("Radio data pin error: {0:?}")]
    Pin(ErrorKind),
}

/// High/low durations in base pulse lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Waveform {
    pub high: u8,
    pub low: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Protocol {
    pub pulse_us: u16,
    pub sync: Waveform,
    pub zero: Waveform,
    pub one: Waveform,
}

impl Protocol {
    /// RC switch protocol 1.
    pub const fn protocol1(pulse_us: u16) -> Self {
        Self {
            pulse_us,
            sync: Waveform { high: 1, low: 31 },
            zero: Waveform { high: 1, low: 3 },
            one: Waveform { high: 3, low: 1 },
        }
    }
}

impl Default for Protocol {
    fn default() -> Self {
        Self::protocol1(350)
    }
}

pub struct OokTransmitter<P, D> {
    pin: P,
    delay: D,
    protocol: Protocol,
    repeat: u8,
}

impl<P: OutputPin, D: DelayNs> OokTransmitter<P, D> {
    pub const fn new(pin: P, delay: D, protocol: Protocol, repeat: u8) -> Self {
        Self {
            pin,
            delay,
            protocol,
            repeat,
        }
    }

    pub const fn from_config(pin: P, delay: D, config: &ControllerConfig) -> Self {
        Self::new(
            pin,
            delay,
            Protocol::protocol1(config.radio_pulse_us),
            config.radio_repeat,
        )
    }

    pub fn release(self) -> (P, D) {
        (self.pin, self.delay)
    }

    fn pulse(&mut self, waveform: Waveform) -> Result<(), RadioError> {
        let unit = self.protocol.pulse_us as u32;
        self.pin.set_high().map_err(|e| RadioError::Pin(e.kind()))?;
        self.delay.delay_us(unit * waveform.high as u32);
        self.pin.set_low().map_err(|e| RadioError::Pin(e.kind()))?;
        self.delay.delay_us(unit * waveform.low as u32);
        Ok(())
    }

    fn send_frames(&mut self, value: u32, bits: u8) -> Result<(), RadioError> {
        for _ in 0..self.repeat {
            for bit in (0..bits).rev() {
                let waveform = if value & (1 << bit) != 0 {
                    self.protocol.one
                } else {
                    self.protocol.zero
                };
                self.pulse(waveform)?;
            }
            self.pulse(self.protocol.sync)?;
        }
        Ok(())
    }
}

impl<P: OutputPin, D: DelayNs> Transmitter for OokTransmitter<P, D> {
    type Error = RadioError;

    fn transmit(&mut self, value: u32, bits: u8) -> Result<(), RadioError> {
        let fits = match bits {
            1..=31 => value >> bits == 0,
            32 => true,
            _ => false,
        };
        if !fits {
            return Err(RadioError::ValueTooWide { value, bits });
        }

        let result = self.send_frames(value, bits);
        // Leave the carrier off whatever happened mid-frame.
        let _ = self.pin.set_low();
        result
    }
}
