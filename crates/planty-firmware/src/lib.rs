//! ESP32-S3 firmware-specific modules for planty-rs
//!
//! This crate contains hardware-specific code that cannot compile on desktop
//! targets: ADC and I2C peripheral setup, the board's sensor suite, baked-in
//! configuration overrides and the periodic control task.

#![no_std]

pub mod config;
pub mod control;
pub mod hardware;
