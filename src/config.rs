//! Tunables for the shake detector, the session timing and the bus.
//!
//! Everything is a compile-time default; a board can override single values
//! with the `with_*` setters before handing the config to [`crate::app::App`].

use crate::mpu6050::{AccelRange, MPU6050_ALT_ADDR};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    /// 7-bit address of the accelerometer (AD0 pulled high on the breakout)
    pub mpu_address: u8,
    pub range: AccelRange,
    /// Deviation from 1g that counts as a shake
    pub shake_threshold_g: f32,
    pub cooldown_ms: u64,
    pub display_hold_ms: u64,
    pub debounce_ms: u64,
    pub poll_interval_ms: u32,
    pub i2c_khz: u32,
    /// Settle time after each wake write before PWR_MGMT_1 is read back
    pub wake_settle_ms: u32,
    pub accel_log_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mpu_address: MPU6050_ALT_ADDR,
            range: AccelRange::G8,
            shake_threshold_g: 1.5,
            cooldown_ms: 1000,
            display_hold_ms: 3000,
            debounce_ms: 50,
            poll_interval_ms: 100,
            i2c_khz: 100,
            wake_settle_ms: 100,
            accel_log_interval_ms: 500,
        }
    }
}

impl Config {
    pub fn with_mpu_address(mut self, address: u8) -> Self {
        self.mpu_address = address;
        self
    }

    pub fn with_range(mut self, range: AccelRange) -> Self {
        self.range = range;
        self
    }

    pub fn with_shake_threshold(mut self, threshold_g: f32) -> Self {
        self.shake_threshold_g = threshold_g;
        self
    }

    pub fn with_timing(mut self, cooldown_ms: u64, display_hold_ms: u64) -> Self {
        self.cooldown_ms = cooldown_ms;
        self.display_hold_ms = display_hold_ms;
        self
    }

    pub fn with_debounce(mut self, debounce_ms: u64) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }
}
