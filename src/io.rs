// SmartCane V1 — Collaborator Interfaces
//
// The session pipeline only talks to hardware through these traits.  The
// ESP32 drivers implement them in `drivers`, the host simulation in `sim`.

use crate::events::Visibility;

/// Strain-gauge bridge returning unscaled readings.
pub trait LoadCell {
    /// Power up the bridge; called once at boot.
    fn begin(&mut self);

    /// One raw reading (unitless ADC counts).
    fn read(&mut self) -> f32;

    /// Average `samples` readings and return them as the zero offset.
    fn tare(&mut self, samples: usize) -> f32 {
        let samples = samples.max(1);
        let sum: f32 = (0..samples).map(|_| self.read()).sum();
        sum / samples as f32
    }
}

/// Already-debounced binary input.
pub trait TriggerInput {
    fn read_level(&mut self) -> bool;
}

/// Binary indicator output (LED).
pub trait Indicator {
    fn set_level(&mut self, on: bool) -> anyhow::Result<()>;
}

/// Fire-and-forget message channel.
pub trait Publisher {
    fn publish(&mut self, topic: &str, payload: &str, visibility: Visibility) -> anyhow::Result<()>;
}

/// Monotonic millisecond clock plus a blocking delay.
pub trait Clock {
    fn now_ms(&self) -> u64;
    fn delay_ms(&mut self, ms: u32);
}
