// SmartCane V1 — Pressure & Contact Area
//
// area  = base + k · mass          (cm², pad spreads under load)
// P     = F / (area · 1e-4 m²) / 1000   (kPa)

use crate::config::{MIN_AREA_CM2, STANDARD_GRAVITY};

const CM2_TO_M2: f32 = 1.0e-4;
const PA_TO_KPA: f32 = 1.0e-3;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PressureReading {
    pub pressure_kpa: f32,
    pub contact_area_cm2: f32,
}

#[derive(Debug, Clone)]
pub struct PressureEstimator {
    base_area_cm2: f32,
    spread_cm2_per_kg: f32,
    min_area_cm2: f32,
}

impl PressureEstimator {
    /// Areas are expected to be validated by `CaneConfig::validate`; an
    /// unusable floor is replaced by [`MIN_AREA_CM2`] so the division stays finite.
    pub fn new(base_area_cm2: f32, spread_cm2_per_kg: f32, min_area_cm2: f32) -> Self {
        let min_area_cm2 = if min_area_cm2.is_finite() && min_area_cm2 > 0.0 {
            min_area_cm2
        } else {
            MIN_AREA_CM2
        };
        Self { base_area_cm2, spread_cm2_per_kg, min_area_cm2 }
    }

    /// Fixed-area model (k = 0).
    pub fn fixed(area_cm2: f32) -> Self {
        Self::new(area_cm2, 0.0, area_cm2)
    }

    pub fn contact_area_cm2(&self, mass_kg: f32) -> f32 {
        (self.base_area_cm2 + self.spread_cm2_per_kg * mass_kg).max(self.min_area_cm2)
    }

    pub fn estimate(&self, force_n: f32) -> PressureReading {
        let mass_kg = force_n / STANDARD_GRAVITY;
        let contact_area_cm2 = self.contact_area_cm2(mass_kg);
        let pressure_kpa = force_n / (contact_area_cm2 * CM2_TO_M2) * PA_TO_KPA;

        PressureReading { pressure_kpa, contact_area_cm2 }
    }
}
