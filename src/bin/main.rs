//! Magic 8-Ball
//! ========================================
//! needs to be run in WSL2 terminal
//! source ~/export-esp.sh
//! cargo run --release --features esp32s3
//! ========================================
//!
//! Shake the board (or press BOOT when no accelerometer answers) and an
//! answer is shown on the OLED for three seconds.

//% CHIPS: esp32s3
//% FEATURES: esp-hal/unstable

#![no_std]
#![no_main]

// Define the application description, which is placed in a special section of the binary.
// This is used by the bootloader to verify the application.
// The macro automatically fills in the fields.
esp_bootloader_esp_idf::esp_app_desc!();

// Module imports
use magic8ball::{
    app::App,
    config::Config as AppConfig,
    input::TriggerFlag,
    mpu6050::{scan_bus, Mpu6050},
    sh1106::{Sh1106, SH1106_ADDR},
    ui::{NoAudio, OledView},
    wiring::{init_board_pins, BoardPins},
};

// Core imports
use core::cell::RefCell;
use esp_backtrace as _;

// ESP-HAL imports
use esp_hal::{
    delay::Delay,
    i2c::master::{Config as I2cConfig, I2c},
    main,
    time::Rate,
    timer::systimer::{SystemTimer, Unit},
    Config,
};

use embedded_hal_bus::i2c::RefCellDevice;
use log::{error, info, LevelFilter};

// External request ingress, consumed once per poll. This board build has no
// network or serial handler, so nothing calls `TRIGGER.request()` yet and the
// loop only sees shakes (or the button).
static TRIGGER: TriggerFlag = TriggerFlag::new();

fn now_ms() -> u64 {
    let t = SystemTimer::unit_value(Unit::Unit0);
    t.saturating_mul(1000) / SystemTimer::ticks_per_second()
}

#[main]
fn main() -> ! {
    esp_println::logger::init_logger(LevelFilter::Info);
    info!("=== MAGIC 8-BALL ===");
    info!("With SH1106 OLED Display");

    // Initialize peripherals
    let peripherals = esp_hal::init(Config::default());
    let cfg = AppConfig::default();

    let BoardPins { button, i2c } = init_board_pins(peripherals);
    let mut delay = Delay::new();

    // Shared bus for the accelerometer and the OLED
    let i2c_cfg = I2cConfig::default().with_frequency(Rate::from_khz(cfg.i2c_khz));
    let bus = I2c::new(i2c.i2c0, i2c_cfg)
        .expect("I2C init failed")
        .with_sda(i2c.sda)
        .with_scl(i2c.scl);
    let bus = RefCell::new(bus);
    info!("I2C initialized at {} kHz", cfg.i2c_khz);

    scan_bus(&mut RefCellDevice::new(&bus));

    let view = match Sh1106::new(RefCellDevice::new(&bus), SH1106_ADDR, &mut delay) {
        Ok(panel) => {
            info!("SH1106 display initialized");
            Some(OledView::new(panel))
        }
        Err(e) => {
            error!("SH1106 init failed: {:?}, running headless", e);
            None
        }
    };

    let mpu = Mpu6050::new(RefCellDevice::new(&bus), cfg.mpu_address)
        .with_range(cfg.range)
        .with_wake_settle_ms(cfg.wake_settle_ms);

    let mut app = App::new(mpu, view, None::<NoAudio>, cfg);
    app.start(&mut delay);

    info!("Ask the Magic 8-Ball a question...");

    loop {
        app.tick(now_ms(), button.is_high(), TRIGGER.take());

        // Small delay to keep polling responsive
        delay.delay_millis(cfg.poll_interval_ms);
    }
}
