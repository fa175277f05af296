// SmartCane V1 — Force-Sensing Cane Firmware
//
// Load cell → conditioning → contact/step detection + pressure estimate →
// session buffer → JSON summary on the publish channel.
//
// Everything except `drivers` is hardware independent and runs on the host.

pub mod conditioning;
pub mod config;
pub mod contact;
pub mod controller;
pub mod events;
pub mod input;
pub mod io;
pub mod pressure;
pub mod session;
pub mod sim;

#[cfg(target_os = "espidf")]
pub mod drivers;

pub use conditioning::{CalibrationProfile, SignalConditioner};
pub use config::{CaneConfig, ConfigError};
pub use contact::{ContactEventDetector, ContactState};
pub use controller::{CaneIo, PollOutcome, SessionController, Transition};
pub use events::{ContactEvent, LiveMetrics, Mode, Visibility};
pub use pressure::{PressureEstimator, PressureReading};
pub use session::{SessionPayload, SessionRecorder};
