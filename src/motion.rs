//! Motion samples in g and the shake classifier.
//!
//! At rest the accelerometer only sees gravity, so the magnitude of a sample
//! sits near 1g whatever the orientation. The shake signal is the distance of
//! the magnitude from that resting value.

use embedded_hal::delay::DelayNs;

use crate::mpu6050::AccelRange;

/// One acceleration reading, in g.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MotionSample {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl MotionSample {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0, z: 0.0 };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn magnitude(&self) -> f32 {
        libm::sqrtf(self.x * self.x + self.y * self.y + self.z * self.z)
    }
}

/// |‖sample‖ - 1g|
#[inline]
pub fn shake_signal(sample: &MotionSample) -> f32 {
    libm::fabsf(sample.magnitude() - 1.0)
}

/// True when the sample deviates from resting gravity by strictly more than
/// `threshold_g`.
#[inline]
pub fn is_shaking(sample: &MotionSample, threshold_g: f32) -> bool {
    shake_signal(sample) > threshold_g
}

/// What the session loop needs from an accelerometer backend.
pub trait MotionSensor {
    type Error: core::fmt::Debug;

    /// Bring the device up. On error the sensor stays uninitialized and the
    /// caller is expected to fall back to the button.
    fn initialize<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Self::Error>;

    fn set_range(&mut self, range: AccelRange) -> Result<(), Self::Error>;

    /// Returns [`MotionSample::ZERO`] while uninitialized. That value means
    /// "no data", not a free-fall reading.
    fn read_sample(&mut self) -> Result<MotionSample, Self::Error>;

    fn is_initialized(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resting_flat_is_not_a_shake() {
        let sample = MotionSample::new(0.0, 0.0, 1.02);
        assert!((sample.magnitude() - 1.02).abs() < 1e-6);
        assert!(shake_signal(&sample) <= 1.5);
        assert!(!is_shaking(&sample, 1.5));
    }

    #[test]
    fn moderate_tilt_and_jiggle_stays_under_default_threshold() {
        let sample = MotionSample::new(1.2, 1.1, 1.3);
        assert!((sample.magnitude() - 2.087).abs() < 1e-3);
        assert!((shake_signal(&sample) - 1.087).abs() < 1e-3);
        assert!(!is_shaking(&sample, 1.5));
    }

    #[test]
    fn large_transient_is_a_shake() {
        let sample = MotionSample::new(2.0, -1.5, 1.0);
        assert!(is_shaking(&sample, 1.5));
    }

    #[test]
    fn threshold_boundary_is_exclusive() {
        // single axis keeps the float math exact: deviation is exactly 1.0
        let sample = MotionSample::new(0.0, 0.0, 2.0);
        assert_eq!(sample.magnitude(), 2.0);
        assert!(!is_shaking(&sample, 1.0));
        assert!(is_shaking(&sample, 0.999));
    }

    #[test]
    fn band_below_one_g_is_symmetric() {
        // free fall-ish: magnitude 0.25, deviation 0.75
        let sample = MotionSample::new(0.0, -0.25, 0.0);
        assert!(!is_shaking(&sample, 0.75));
        assert!(is_shaking(&sample, 0.5));
    }

    #[test]
    fn zero_sample_never_shakes_at_default_threshold() {
        assert!(!is_shaking(&MotionSample::ZERO, 1.5));
    }
}
