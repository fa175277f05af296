// SmartCane V1 — Status LED Driver
//
// Simple GPIO-driven indicator: on while a session is logging.

use esp_idf_hal::gpio::{AnyOutputPin, Output, PinDriver};

use crate::io::Indicator;

pub struct StatusLed<'d> {
    pin: PinDriver<'d, AnyOutputPin, Output>,
}

impl<'d> StatusLed<'d> {
    pub fn new(pin: PinDriver<'d, AnyOutputPin, Output>) -> Self {
        Self { pin }
    }
}

impl Indicator for StatusLed<'_> {
    fn set_level(&mut self, on: bool) -> anyhow::Result<()> {
        if on {
            self.pin.set_high()?;
        } else {
            self.pin.set_low()?;
        }
        Ok(())
    }
}
