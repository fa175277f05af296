// SmartCane V1 — Button Debounce
//
// Debounced level tracker for the session button.  Designed to be polled
// from the control loop; the hardware wrapper lives in `drivers::button`.

use crate::config::DEBOUNCE_MS;

#[derive(Debug, Clone)]
pub struct Debouncer {
    window_ms: u64,

    last_raw: bool,
    last_change_ms: u64,
    stable: bool,
}

impl Debouncer {
    pub fn new(window_ms: u64, initial: bool, now_ms: u64) -> Self {
        Self {
            window_ms,
            last_raw: initial,
            last_change_ms: now_ms,
            stable: initial,
        }
    }

    pub fn with_default_window(initial: bool, now_ms: u64) -> Self {
        Self::new(DEBOUNCE_MS, initial, now_ms)
    }

    /// Feed the raw pin level, get the debounced one back.
    pub fn update(&mut self, raw: bool, now_ms: u64) -> bool {
        if raw != self.last_raw {
            self.last_raw = raw;
            self.last_change_ms = now_ms;
        }

        // Signal still bouncing — keep the previous stable level.
        if now_ms.saturating_sub(self.last_change_ms) >= self.window_ms {
            self.stable = self.last_raw;
        }
        self.stable
    }

    pub fn level(&self) -> bool {
        self.stable
    }
}
