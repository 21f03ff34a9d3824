//! Minimal MPU6050 accelerometer bring-up over raw register access.
//! Only the accelerometer half of the chip is used; gyro, DMP and FIFO stay
//! at their reset defaults.
//!
//! Register reads are write-then-read without a stop in between
//! (`I2c::write_read`), 16-bit values are big-endian (high byte first).

use embedded_hal::{delay::DelayNs, i2c};
use log::{debug, error, info, warn};

use crate::motion::{MotionSample, MotionSensor};

pub const MPU6050_DEFAULT_ADDR: u8 = 0x68; // AD0 low
pub const MPU6050_ALT_ADDR: u8 = 0x69; // AD0 high

const REG_ACCEL_CONFIG: u8 = 0x1C;
const REG_ACCEL_XOUT_H: u8 = 0x3B;
const REG_ACCEL_YOUT_H: u8 = 0x3D;
const REG_ACCEL_ZOUT_H: u8 = 0x3F;
const REG_PWR_MGMT_1: u8 = 0x6B;
const REG_WHO_AM_I: u8 = 0x75;

// Genuine parts answer 0x68; clones (MPU6500/9250 relabels) report other
// values but share the accelerometer registers.
const WHO_AM_I_EXPECTED: u8 = 0x68;
const PWR_MGMT_SLEEP: u8 = 0x40;
const WAKE_ATTEMPTS: usize = 2;

const OLED_ADDRS: [u8; 2] = [0x3C, 0x3D];

/// Accelerometer full-scale range, ACCEL_CONFIG bits 3..4.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccelRange {
    G2 = 0,
    G4 = 1,
    G8 = 2,
    G16 = 3,
}

impl AccelRange {
    pub const ALL: [AccelRange; 4] = [AccelRange::G2, AccelRange::G4, AccelRange::G8, AccelRange::G16];

    /// Counts per g.
    pub const fn sensitivity(self) -> f32 {
        match self {
            Self::G2 => 16384.0,
            Self::G4 => 8192.0,
            Self::G8 => 4096.0,
            Self::G16 => 2048.0,
        }
    }

    pub const fn config_bits(self) -> u8 {
        (self as u8) << 3
    }

    pub const fn full_scale_g(self) -> u8 {
        match self {
            Self::G2 => 2,
            Self::G4 => 4,
            Self::G8 => 8,
            Self::G16 => 16,
        }
    }

    #[inline]
    pub fn scale(self, raw: i16) -> f32 {
        raw as f32 / self.sensitivity()
    }
}

#[derive(Debug, PartialEq)]
pub enum DriverError<E> {
    /// No ACK at the target address
    NotResponding,
    /// Sleep bit still set after the wake retry
    WakeFailed,
    Bus(E),
}

impl<E> From<E> for DriverError<E> {
    fn from(e: E) -> Self {
        DriverError::Bus(e)
    }
}

pub struct Mpu6050<I2C> {
    i2c: I2C,
    address: u8,
    initialized: bool,
    range: AccelRange,
    sensitivity: f32,
    identity: Option<u8>,
    wake_settle_ms: u32,
}

impl<I2C> Mpu6050<I2C>
where
    I2C: i2c::I2c,
{
    /// Uninitialized handle; nothing is sent on the bus until [`Self::init`].
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            initialized: false,
            range: AccelRange::G8,
            sensitivity: AccelRange::G8.sensitivity(),
            identity: None,
            wake_settle_ms: 100,
        }
    }

    /// Range applied at the end of [`Self::init`].
    pub fn with_range(mut self, range: AccelRange) -> Self {
        self.range = range;
        self.sensitivity = range.sensitivity();
        self
    }

    pub fn with_wake_settle_ms(mut self, ms: u32) -> Self {
        self.wake_settle_ms = ms;
        self
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn range(&self) -> AccelRange {
        self.range
    }

    pub fn sensitivity(&self) -> f32 {
        self.sensitivity
    }

    /// WHO_AM_I value seen during the last init, if the read got that far.
    pub fn identity(&self) -> Option<u8> {
        self.identity
    }

    /// Probe, identify, wake and configure the range.
    pub fn init(&mut self, delay: &mut impl DelayNs) -> Result<(), DriverError<I2C::Error>> {
        self.initialized = false;

        if self.probe().is_err() {
            error!("MPU6050 not responding at address 0x{:02X}", self.address);
            return Err(DriverError::NotResponding);
        }
        info!("MPU6050 responds at 0x{:02X}", self.address);

        let who = match self.who_am_i() {
            Ok(who) => who,
            Err(_) => {
                error!("MPU6050 WHO_AM_I read failed");
                return Err(DriverError::NotResponding);
            }
        };
        self.identity = Some(who);
        if who != WHO_AM_I_EXPECTED {
            // allow init to continue, clones report other ids
            warn!(
                "Unexpected WHO_AM_I 0x{:02X} (expected 0x{:02X}), continuing",
                who, WHO_AM_I_EXPECTED
            );
        } else {
            debug!("WHO_AM_I 0x{:02X}", who);
        }

        self.wake(delay)?;

        let range = self.range;
        self.set_range(range)?;

        self.initialized = true;
        info!("MPU6050 initialized, +/-{}g", range.full_scale_g());
        Ok(())
    }

    fn probe(&mut self) -> Result<(), I2C::Error> {
        self.i2c.write(self.address, &[])
    }

    // Clear PWR_MGMT_1 (sleep + clock select) and check the sleep bit, one retry.
    fn wake(&mut self, delay: &mut impl DelayNs) -> Result<(), DriverError<I2C::Error>> {
        for attempt in 1..=WAKE_ATTEMPTS {
            let pwr = self
                .write_reg(REG_PWR_MGMT_1, 0x00)
                .map_err(DriverError::Bus)
                .and_then(|()| {
                    delay.delay_ms(self.wake_settle_ms);
                    self.power_management()
                });

            match pwr {
                Ok(pwr) if pwr & PWR_MGMT_SLEEP == 0 => {
                    debug!("PWR_MGMT_1 0x{:02X}", pwr);
                    return Ok(());
                }
                Ok(pwr) => warn!("MPU6050 still in sleep mode, PWR_MGMT_1 0x{:02X} (attempt {})", pwr, attempt),
                Err(_) => warn!("PWR_MGMT_1 access failed (attempt {})", attempt),
            }
        }

        error!("MPU6050 failed to wake up");
        Err(DriverError::WakeFailed)
    }

    pub fn set_range(&mut self, range: AccelRange) -> Result<(), DriverError<I2C::Error>> {
        self.write_reg(REG_ACCEL_CONFIG, range.config_bits())?;
        self.range = range;
        self.sensitivity = range.sensitivity();
        info!("Accelerometer range set to +/-{}g", range.full_scale_g());
        Ok(())
    }

    /// Zero vector while uninitialized.
    pub fn read_sample(&mut self) -> Result<MotionSample, DriverError<I2C::Error>> {
        if !self.initialized {
            return Ok(MotionSample::ZERO);
        }

        let x = self.read_reg16(REG_ACCEL_XOUT_H)?;
        let y = self.read_reg16(REG_ACCEL_YOUT_H)?;
        let z = self.read_reg16(REG_ACCEL_ZOUT_H)?;

        Ok(MotionSample::new(
            x as f32 / self.sensitivity,
            y as f32 / self.sensitivity,
            z as f32 / self.sensitivity,
        ))
    }

    pub fn who_am_i(&mut self) -> Result<u8, DriverError<I2C::Error>> {
        self.read_reg(REG_WHO_AM_I).map_err(DriverError::Bus)
    }

    pub fn power_management(&mut self) -> Result<u8, DriverError<I2C::Error>> {
        self.read_reg(REG_PWR_MGMT_1).map_err(DriverError::Bus)
    }

    fn write_reg(&mut self, reg: u8, val: u8) -> Result<(), I2C::Error> {
        self.i2c.write(self.address, &[reg, val])
    }

    fn read_reg(&mut self, reg: u8) -> Result<u8, I2C::Error> {
        let mut out = [0u8];
        self.i2c.write_read(self.address, &[reg], &mut out)?;
        Ok(out[0])
    }

    fn read_reg16(&mut self, reg: u8) -> Result<i16, I2C::Error> {
        let mut out = [0u8; 2];
        self.i2c.write_read(self.address, &[reg], &mut out)?;
        Ok(i16::from_be_bytes(out))
    }

    pub fn into_inner(self) -> I2C {
        self.i2c
    }
}

impl<I2C> MotionSensor for Mpu6050<I2C>
where
    I2C: i2c::I2c,
{
    type Error = DriverError<I2C::Error>;

    fn initialize<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Self::Error> {
        self.init(delay)
    }

    fn set_range(&mut self, range: AccelRange) -> Result<(), Self::Error> {
        Mpu6050::set_range(self, range)
    }

    fn read_sample(&mut self) -> Result<MotionSample, Self::Error> {
        Mpu6050::read_sample(self)
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }
}

/// Ping every 7-bit address and log who answers. Returns the number of devices found.
pub fn scan_bus<I2C: i2c::I2c>(i2c: &mut I2C) -> u8 {
    info!("Scanning I2C bus...");
    let mut found = 0u8;
    for addr in 1u8..127 {
        if i2c.write(addr, &[]).is_err() {
            continue;
        }
        found += 1;
        match addr {
            MPU6050_DEFAULT_ADDR => info!("I2C device at 0x{:02X} (MPU6050, default address)", addr),
            MPU6050_ALT_ADDR => info!("I2C device at 0x{:02X} (MPU6050, alternate address)", addr),
            a if OLED_ADDRS.contains(&a) => info!("I2C device at 0x{:02X} (SH1106/SSD1306 OLED)", addr),
            _ => info!("I2C device at 0x{:02X} (unknown)", addr),
        }
    }

    if found == 0 {
        warn!("No I2C devices found");
    } else {
        info!("Found {} I2C device(s)", found);
    }
    found
}
