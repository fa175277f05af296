// SmartCane V1 — Monotonic Clock

use esp_idf_hal::delay::FreeRtos;

use crate::io::Clock;

/// Milliseconds since boot, from the 64-bit esp_timer.
pub fn now_ms() -> u64 {
    let us = unsafe { esp_idf_sys::esp_timer_get_time() };
    us.max(0) as u64 / 1000
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EspClock;

impl Clock for EspClock {
    fn now_ms(&self) -> u64 {
        now_ms()
    }

    fn delay_ms(&mut self, ms: u32) {
        FreeRtos::delay_ms(ms);
    }
}
