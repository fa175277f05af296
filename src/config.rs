// SmartCane V1 — Hardware & System Configuration
// Target: ESP32-C3 dev board + HX711 load-cell amplifier

use thiserror::Error;

// ---------------------------------------------------------------------------
// GPIO Pin Definitions
// ---------------------------------------------------------------------------
// HX711 DOUT = GPIO2, SCK = GPIO3, LED = GPIO8 (taken as typed pins in main).
pub const PIN_BUTTON: i32 = 9;     // Session button (INPUT_PULLUP, active LOW)

// ---------------------------------------------------------------------------
// Task Stack Sizes (bytes)
// ---------------------------------------------------------------------------
pub const STACK_MQTT: usize = 6144;

// ---------------------------------------------------------------------------
// Timing (milliseconds)
// ---------------------------------------------------------------------------
pub const SAMPLE_INTERVAL_MS: u64 = 100;       // 10 Hz while logging
pub const LOOP_POLL_INTERVAL_MS: u64 = 5;      // control loop yield
pub const DEBOUNCE_MS: u64 = 50;
pub const BLINK_ON_MS: u32 = 100;
pub const BLINK_OFF_MS: u32 = 100;
pub const BLINK_COUNT: u8 = 3;                 // blinks after a payload publish
pub const HX711_READY_TIMEOUT_MS: u64 = 200;
pub const SENSOR_SETTLE_MS: u64 = 500;         // after power-up, before tare

// ---------------------------------------------------------------------------
// Calibration
// ---------------------------------------------------------------------------
pub const CALIBRATION_FACTOR: f32 = -7050.0;   // raw counts per kg, change after calibration
pub const TARE_SAMPLES: usize = 10;
pub const STANDARD_GRAVITY: f32 = 9.806_65;    // m/s²

// ---------------------------------------------------------------------------
// Filtering & contact detection
// ---------------------------------------------------------------------------
pub const EMA_ALPHA: f32 = 0.15;
pub const CONTACT_THRESHOLD_KG: f32 = 0.5;     // ~5 N

// ---------------------------------------------------------------------------
// Pad geometry
// ---------------------------------------------------------------------------
pub const BASE_AREA_CM2: f32 = 4.0;            // 4 cm² tip pad
pub const AREA_SPREAD_CM2_PER_KG: f32 = 1.25;  // pad deformation under load
pub const MIN_AREA_CM2: f32 = 0.5;

// ---------------------------------------------------------------------------
// Publish topics
// ---------------------------------------------------------------------------
pub const TOPIC_SESSION: &str = "cane_session";
pub const TOPIC_STATUS: &str = "status";
pub const TOPIC_CONTACT_START: &str = "cane_start";
pub const TOPIC_CONTACT_STOP: &str = "cane_stop";
pub const TOPIC_STEP: &str = "cane_step";
pub const MQTT_TOPIC_PREFIX: &str = "smartcane";
pub const MQTT_CLIENT_ID: &str = "smartcane-v1";

// ---------------------------------------------------------------------------
// Build-time network settings
// ---------------------------------------------------------------------------
pub const WIFI_SSID: &str = match option_env!("CANE_WIFI_SSID") {
    Some(ssid) => ssid,
    None => "",
};
pub const WIFI_PASS: &str = match option_env!("CANE_WIFI_PASS") {
    Some(pass) => pass,
    None => "",
};
pub const MQTT_URL: &str = match option_env!("CANE_MQTT_URL") {
    Some(url) => url,
    None => "mqtt://broker.local:1883",
};

/// Rejected startup configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("calibration scale factor must be finite and non-zero, got {0}")]
    ScaleFactor(f32),
    #[error("zero offset must be finite, got {0}")]
    ZeroOffset(f32),
    #[error("unit multiplier must be finite and non-zero, got {0}")]
    UnitMultiplier(f32),
    #[error("smoothing alpha must be in (0, 1], got {0}")]
    Alpha(f32),
    #[error("contact threshold must be finite, got {0}")]
    Threshold(f32),
    #[error("base contact area must be finite and > 0 cm², got {0}")]
    BaseArea(f32),
    #[error("minimum contact area must be finite and > 0 cm², got {0}")]
    MinArea(f32),
    #[error("area spread coefficient must be finite and >= 0, got {0}")]
    AreaSpread(f32),
    #[error("sample interval must be at least 1 ms")]
    SampleInterval,
    #[error("tare needs at least one sample")]
    TareSamples,
    #[error("topic `{0}` must not be empty")]
    EmptyTopic(&'static str),
}

/// Publish topic names used by the session controller.
#[derive(Debug, Clone, PartialEq)]
pub struct Topics {
    pub session: String,
    pub status: String,
    pub contact_start: String,
    pub contact_stop: String,
    pub step: String,
}

impl Default for Topics {
    fn default() -> Self {
        Self {
            session: TOPIC_SESSION.into(),
            status: TOPIC_STATUS.into(),
            contact_start: TOPIC_CONTACT_START.into(),
            contact_stop: TOPIC_CONTACT_STOP.into(),
            step: TOPIC_STEP.into(),
        }
    }
}

/// Runtime tunables, fixed at boot.
#[derive(Debug, Clone, PartialEq)]
pub struct CaneConfig {
    /// Minimum time between two logged samples.
    pub sample_interval_ms: u64,
    /// Raw counts per calibrated unit (kg); sign follows the bridge wiring.
    pub calibration_factor: f32,
    /// EMA coefficient; 1.0 disables smoothing.
    pub alpha: f32,
    /// Converts calibrated units into the signal unit (kg → N by default).
    pub unit_multiplier: f32,
    /// Contact threshold, in the conditioned signal unit.
    pub contact_threshold: f32,
    pub base_area_cm2: f32,
    pub area_spread_cm2_per_kg: f32,
    pub min_area_cm2: f32,
    pub tare_samples: usize,
    pub blink_count: u8,
    pub blink_on_ms: u32,
    pub blink_off_ms: u32,
    /// Publish `cane_start` / `cane_stop` / `cane_step` on contact edges.
    pub publish_contact_events: bool,
    pub topics: Topics,
}

impl Default for CaneConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: SAMPLE_INTERVAL_MS,
            calibration_factor: CALIBRATION_FACTOR,
            alpha: EMA_ALPHA,
            unit_multiplier: STANDARD_GRAVITY,
            contact_threshold: CONTACT_THRESHOLD_KG * STANDARD_GRAVITY,
            base_area_cm2: BASE_AREA_CM2,
            area_spread_cm2_per_kg: AREA_SPREAD_CM2_PER_KG,
            min_area_cm2: MIN_AREA_CM2,
            tare_samples: TARE_SAMPLES,
            blink_count: BLINK_COUNT,
            blink_on_ms: BLINK_ON_MS,
            blink_off_ms: BLINK_OFF_MS,
            publish_contact_events: true,
            topics: Topics::default(),
        }
    }
}

impl CaneConfig {
    /// Startup check, run once before the control loop starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_interval_ms == 0 {
            return Err(ConfigError::SampleInterval);
        }
        if !self.calibration_factor.is_finite() || self.calibration_factor == 0.0 {
            return Err(ConfigError::ScaleFactor(self.calibration_factor));
        }
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(ConfigError::Alpha(self.alpha));
        }
        if !self.unit_multiplier.is_finite() || self.unit_multiplier == 0.0 {
            return Err(ConfigError::UnitMultiplier(self.unit_multiplier));
        }
        if !self.contact_threshold.is_finite() {
            return Err(ConfigError::Threshold(self.contact_threshold));
        }
        if !self.base_area_cm2.is_finite() || self.base_area_cm2 <= 0.0 {
            return Err(ConfigError::BaseArea(self.base_area_cm2));
        }
        if !self.min_area_cm2.is_finite() || self.min_area_cm2 <= 0.0 {
            return Err(ConfigError::MinArea(self.min_area_cm2));
        }
        if !self.area_spread_cm2_per_kg.is_finite() || self.area_spread_cm2_per_kg < 0.0 {
            return Err(ConfigError::AreaSpread(self.area_spread_cm2_per_kg));
        }
        if self.tare_samples == 0 {
            return Err(ConfigError::TareSamples);
        }

        let topics = [
            ("session", &self.topics.session),
            ("status", &self.topics.status),
            ("contact_start", &self.topics.contact_start),
            ("contact_stop", &self.topics.contact_stop),
            ("step", &self.topics.step),
        ];
        for (name, topic) in topics {
            if topic.is_empty() {
                return Err(ConfigError::EmptyTopic(name));
            }
        }
        Ok(())
    }
}
