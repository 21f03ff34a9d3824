#![cfg_attr(not(test), no_std)]

pub mod app;
pub mod config;
pub mod input;
pub mod motion;
pub mod mpu6050;
pub mod responses;
pub mod session;
pub mod sh1106;
pub mod ui;

#[cfg(feature = "esp32s3")]
pub mod wiring;
