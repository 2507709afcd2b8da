//! Hardware-independent core library for planty-rs
//!
//! This crate contains all platform-agnostic logic for the planty irrigation
//! controller: the irrigation decision engine, the telemetry packet encoder,
//! per-cycle reading acquisition, pump and radio drivers written against
//! `embedded-hal` traits, and the control cycle that ties them together.
//!
//! It is `#![no_std]` so it compiles on both embedded targets (ESP32-S3) and
//! desktop hosts (for the simulator and tests).

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod cycle;
pub mod decision;
pub mod pump;
pub mod radio;
pub mod reading;
pub mod sensors;
pub mod telemetry;

pub use config::ControllerConfig;
pub use cycle::{Controller, CycleReport};
pub use decision::{Comparison, Decision, DecisionEngine};
pub use reading::{ReadingAcquirer, ReadingSet, SensorFault};
pub use telemetry::{Packet, SensorTag, TelemetryEncoder, Transmitter};
