// SmartCane V1 — Session Button
//
// Active-LOW push button with internal pull-up.  Reports `true` while the
// button is (stably) pressed.

use esp_idf_hal::gpio::{AnyInputPin, Input, PinDriver};

use crate::config::*;
use crate::drivers::clock::now_ms;
use crate::input::Debouncer;
use crate::io::TriggerInput;

pub struct SessionButton<'d> {
    pin: PinDriver<'d, AnyInputPin, Input>,
    debouncer: Debouncer,
}

impl<'d> SessionButton<'d> {
    pub fn new(pin: PinDriver<'d, AnyInputPin, Input>) -> Self {
        configure_pullup();
        let pressed = pin.is_low();
        Self {
            pin,
            debouncer: Debouncer::with_default_window(pressed, now_ms()),
        }
    }
}

impl TriggerInput for SessionButton<'_> {
    fn read_level(&mut self) -> bool {
        let pressed = self.pin.is_low(); // active LOW
        self.debouncer.update(pressed, now_ms())
    }
}

/// `PinDriver::input` on a downgraded pin cannot set the pull mode, so go
/// through the raw GPIO API.
fn configure_pullup() {
    let ret = unsafe {
        esp_idf_sys::gpio_set_pull_mode(PIN_BUTTON, esp_idf_sys::gpio_pull_mode_t_GPIO_PULLUP_ONLY)
    };
    if ret != esp_idf_sys::ESP_OK {
        log::error!("Button pull-up config failed ({})", ret);
    }
}
