// SmartCane V1 — Signal Conditioning
//
// raw counts → (raw - zero offset) / scale factor × unit multiplier,
// clamped at zero, then optionally EMA-smoothed.

use crate::config::ConfigError;

/// Zero offset and scale factor captured at boot.  Immutable afterwards.
///
/// The sign of the scale factor follows the bridge wiring: with a negative
/// factor, readings *below* the zero offset are the loaded direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationProfile {
    zero_offset: f32,
    scale_factor: f32,
}

impl CalibrationProfile {
    pub fn new(zero_offset: f32, scale_factor: f32) -> Result<Self, ConfigError> {
        if !scale_factor.is_finite() || scale_factor == 0.0 {
            return Err(ConfigError::ScaleFactor(scale_factor));
        }
        if !zero_offset.is_finite() {
            return Err(ConfigError::ZeroOffset(zero_offset));
        }
        Ok(Self { zero_offset, scale_factor })
    }

    pub fn zero_offset(&self) -> f32 {
        self.zero_offset
    }

    pub fn scale_factor(&self) -> f32 {
        self.scale_factor
    }
}

/// EMA state, owned by the conditioner.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SmoothedSample {
    pub value: f32,
    pub is_initialized: bool,
}

pub struct SignalConditioner {
    calibration: CalibrationProfile,
    /// `unit_multiplier / scale_factor`, computed once.
    scale_unit: f32,
    alpha: f32,
    smoothed: SmoothedSample,
}

impl SignalConditioner {
    /// `alpha` must already be validated to lie in (0, 1]; 1.0 means no smoothing.
    pub fn new(calibration: CalibrationProfile, unit_multiplier: f32, alpha: f32) -> Self {
        Self {
            calibration,
            scale_unit: unit_multiplier / calibration.scale_factor,
            alpha,
            smoothed: SmoothedSample::default(),
        }
    }

    pub fn calibration(&self) -> &CalibrationProfile {
        &self.calibration
    }

    /// Offset, scale and clamp without touching the smoothing state.
    pub fn calibrate(&self, raw: f32) -> f32 {
        let value = (raw - self.calibration.zero_offset) * self.scale_unit;
        // `max` also maps NaN to 0.
        value.max(0.0)
    }

    /// Conditioned, smoothed value for one raw reading.
    pub fn condition(&mut self, raw: f32) -> f32 {
        let value = self.calibrate(raw);

        if !self.smoothed.is_initialized {
            self.smoothed = SmoothedSample { value, is_initialized: true };
        } else {
            self.smoothed.value = self.alpha * value + (1.0 - self.alpha) * self.smoothed.value;
        }
        self.smoothed.value
    }

    /// Forget the smoothing history; the next sample re-seeds it.
    pub fn reset(&mut self) {
        self.smoothed = SmoothedSample::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn conditioner(alpha: f32) -> SignalConditioner {
        let calibration = CalibrationProfile::new(1000.0, 100.0).unwrap();
        SignalConditioner::new(calibration, 1.0, alpha)
    }

    #[test]
    fn rejects_degenerate_calibration() {
        assert_eq!(CalibrationProfile::new(0.0, 0.0), Err(ConfigError::ScaleFactor(0.0)));
        assert!(CalibrationProfile::new(0.0, f32::INFINITY).is_err());
        assert!(CalibrationProfile::new(f32::NAN, 10.0).is_err());
    }

    #[test]
    fn offset_and_scale() {
        let c = conditioner(1.0);
        assert_relative_eq!(c.calibrate(1500.0), 5.0, epsilon = 1e-4);
        assert_relative_eq!(c.calibrate(1000.0), 0.0, epsilon = 1e-4);
    }

    #[test]
    fn below_offset_clamps_to_zero() {
        let mut c = conditioner(1.0);
        assert_eq!(c.condition(200.0), 0.0);
        assert_eq!(c.condition(999.9), 0.0);
    }

    #[test]
    fn negative_scale_factor_is_clamped_not_negative() {
        let calibration = CalibrationProfile::new(0.0, -7050.0).unwrap();
        let mut c = SignalConditioner::new(calibration, 1.0, 1.0);
        assert_eq!(c.condition(7050.0), 0.0);
        assert_relative_eq!(c.condition(-7050.0), 1.0, epsilon = 1e-4);
    }

    #[test]
    fn inverted_bridge_loads_below_the_zero_offset() {
        let calibration = CalibrationProfile::new(8_000.0, -7050.0).unwrap();
        let c = SignalConditioner::new(calibration, 1.0, 1.0);
        assert_relative_eq!(c.calibrate(8_000.0 - 14_100.0), 2.0, epsilon = 1e-4);
        assert_eq!(c.calibrate(8_000.0 + 14_100.0), 0.0);
    }

    #[test]
    fn first_sample_seeds_the_average() {
        let mut c = conditioner(0.15);
        assert_relative_eq!(c.condition(1800.0), 8.0, epsilon = 1e-4);
    }

    #[test]
    fn smoothing_blends_with_alpha() {
        let mut c = conditioner(0.5);
        c.condition(1400.0); // 4.0
        assert_relative_eq!(c.condition(1800.0), 6.0, epsilon = 1e-4);
        assert_relative_eq!(c.condition(1800.0), 7.0, epsilon = 1e-4);
    }

    #[test]
    fn converges_to_constant_input() {
        let mut c = conditioner(0.15);
        c.condition(1000.0);
        let mut value = 0.0;
        for _ in 0..200 {
            value = c.condition(1700.0);
        }
        assert_relative_eq!(value, 7.0, epsilon = 1e-4);
    }

    #[test]
    fn reset_reseeds() {
        let mut c = conditioner(0.15);
        c.condition(1900.0);
        c.reset();
        assert_relative_eq!(c.condition(1300.0), 3.0, epsilon = 1e-4);
    }
}
