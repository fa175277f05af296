// SmartCane V1 — Simulated Collaborators
//
// Stand-ins for the bridge, button, LED, publish channel and clock.  Used by
// the host simulation binary and by the tests.

use std::collections::VecDeque;

use crate::events::Visibility;
use crate::io::{Clock, Indicator, LoadCell, Publisher, TriggerInput};

/// Replays queued raw readings; repeats the last one once the queue is empty.
#[derive(Debug, Clone, Default)]
pub struct ScriptedLoadCell {
    baseline: f32,
    readings: VecDeque<f32>,
    last: f32,
    started: bool,
}

impl ScriptedLoadCell {
    /// `baseline` is what `tare()` reports; readings are served in order.
    pub fn new(baseline: f32, readings: impl IntoIterator<Item = f32>) -> Self {
        Self {
            baseline,
            readings: readings.into_iter().collect(),
            last: baseline,
            started: false,
        }
    }

    pub fn remaining(&self) -> usize {
        self.readings.len()
    }

    pub fn is_started(&self) -> bool {
        self.started
    }
}

impl LoadCell for ScriptedLoadCell {
    fn begin(&mut self) {
        self.started = true;
    }

    fn read(&mut self) -> f32 {
        if let Some(raw) = self.readings.pop_front() {
            self.last = raw;
        }
        self.last
    }

    fn tare(&mut self, _samples: usize) -> f32 {
        self.baseline
    }
}

/// Button level set directly by the caller.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTrigger {
    level: bool,
}

impl ScriptedTrigger {
    pub fn set(&mut self, level: bool) {
        self.level = level;
    }
}

impl TriggerInput for ScriptedTrigger {
    fn read_level(&mut self) -> bool {
        self.level
    }
}

/// Remembers every level written to it.
#[derive(Debug, Clone, Default)]
pub struct RecordingIndicator {
    level: bool,
    history: Vec<bool>,
}

impl RecordingIndicator {
    pub fn level(&self) -> bool {
        self.level
    }

    pub fn history(&self) -> &[bool] {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

impl Indicator for RecordingIndicator {
    fn set_level(&mut self, on: bool) -> anyhow::Result<()> {
        self.level = on;
        self.history.push(on);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub topic: String,
    pub payload: String,
    pub visibility: Visibility,
}

/// Collects published messages and echoes them to the log.
#[derive(Debug, Clone, Default)]
pub struct RecordingPublisher {
    messages: Vec<Published>,
}

impl RecordingPublisher {
    pub fn messages(&self) -> &[Published] {
        &self.messages
    }

    /// Payloads published on `topic`, oldest first.
    pub fn payloads(&self, topic: &str) -> Vec<&str> {
        self.messages
            .iter()
            .filter(|m| m.topic == topic)
            .map(|m| m.payload.as_str())
            .collect()
    }
}

impl Publisher for RecordingPublisher {
    fn publish(&mut self, topic: &str, payload: &str, visibility: Visibility) -> anyhow::Result<()> {
        log::info!("publish [{}] {} = {}", visibility.as_str(), topic, payload);
        self.messages.push(Published {
            topic: topic.to_owned(),
            payload: payload.to_owned(),
            visibility,
        });
        Ok(())
    }
}

/// Manually advanced clock; `delay_ms` just moves time forward.
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    now_ms: u64,
}

impl SimClock {
    pub fn advance(&mut self, ms: u64) {
        self.now_ms += ms;
    }
}

impl Clock for SimClock {
    fn now_ms(&self) -> u64 {
        self.now_ms
    }

    fn delay_ms(&mut self, ms: u32) {
        self.advance(u64::from(ms));
    }
}
