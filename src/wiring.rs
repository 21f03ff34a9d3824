// This module handles board-specific pin mappings and initialization.
//! The following wiring is assumed (ESP32-S3 DevKit):
//! - MPU6050 SDA / SH1106 SDA => GPIO8
//! - MPU6050 SCL / SH1106 SCL => GPIO9
//! - MPU6050 AD0 => 3.3V (address 0x69)
//! - BUTTON => GPIO0 (on-board BOOT button)
//! - GND => GND
//! - 3.3V => 3.3V
//! The button shorts to GND when pressed (internal pull-up).
//! Both I2C devices hang off the same two wires.

use esp_hal::gpio::{Input, InputConfig, Pull};
use esp_hal::peripherals::{Peripherals, GPIO8, GPIO9, I2C0};

pub struct I2cPins<'a> {
    pub i2c0: I2C0<'a>,
    pub sda: GPIO8<'a>,
    pub scl: GPIO9<'a>,
}

pub struct BoardPins<'a> {
    pub button: Input<'a>,
    pub i2c: I2cPins<'a>,
}

pub fn init_board_pins(p: Peripherals) -> BoardPins<'static> {
    // fallback button, active low
    let button = Input::new(p.GPIO0, InputConfig::default().with_pull(Pull::Up));

    BoardPins {
        button,
        i2c: I2cPins {
            i2c0: p.I2C0,
            sda: p.GPIO8,
            scl: p.GPIO9,
        },
    }
}
