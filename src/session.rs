// SmartCane V1 — Session Recording
//
// Buffers (timestamp, force) samples and the step count for one logging
// session, then drains both into a JSON payload in a single call:
//
//   {"steps":<int>,"force":[{"t":<ms>,"f":<N, 2 decimals>}, ...]}

use serde::ser::Error as _;
use serde::{Serialize, Serializer};
use serde_json::value::RawValue;

/// Steps completed in the current session.  Only goes up until drained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepCounter(u32);

impl StepCounter {
    pub fn increment(&mut self) {
        self.0 = self.0.saturating_add(1);
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForceSample {
    /// Milliseconds on the monotonic clock.
    pub t: u64,
    /// Force in newtons.
    #[serde(serialize_with = "two_decimals")]
    pub f: f32,
}

/// Summary of one finished session, in wire field order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionPayload {
    pub steps: u32,
    pub force: Vec<ForceSample>,
}

impl SessionPayload {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Writes the float as a bare JSON number with exactly two decimals.
fn two_decimals<S: Serializer>(value: &f32, serializer: S) -> Result<S::Ok, S::Error> {
    if !value.is_finite() {
        return Err(S::Error::custom(format!("non-finite force sample: {value}")));
    }
    let raw = RawValue::from_string(format!("{value:.2}")).map_err(S::Error::custom)?;
    raw.serialize(serializer)
}

#[derive(Debug, Default)]
pub struct SessionRecorder {
    samples: Vec<ForceSample>,
    steps: StepCounter,
}

impl SessionRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, timestamp_ms: u64, force_n: f32) {
        self.samples.push(ForceSample { t: timestamp_ms, f: force_n });
    }

    pub fn steps(&self) -> u32 {
        self.steps.get()
    }

    pub fn steps_mut(&mut self) -> &mut StepCounter {
        &mut self.steps
    }

    pub fn samples(&self) -> &[ForceSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Hand over the whole session and leave the recorder empty with zero steps.
    pub fn drain_to_payload(&mut self) -> SessionPayload {
        let taken = std::mem::take(self);
        SessionPayload { steps: taken.steps.get(), force: taken.samples }
    }

    /// Discard anything buffered (session start).
    pub fn reset(&mut self) {
        self.samples.clear();
        self.steps = StepCounter::default();
    }
}
