// SmartCane V1 — HX711 Load-Cell Bridge Driver
//
// Bit-banged two-wire interface (DOUT / PD_SCK), channel A at gain 128.
// Register-less part, so the whole driver is clock pulses and timing.

use std::thread;
use std::time::{Duration, Instant};

use anyhow::bail;
use esp_idf_hal::delay::Ets;
use esp_idf_hal::gpio::{AnyInputPin, AnyOutputPin, Input, Output, PinDriver};

use crate::config::*;
use crate::io::LoadCell;

const DATA_BITS: u32 = 24;
const GAIN_128_PULSES: u32 = 1; // extra pulses after the data word

pub struct Hx711<'d> {
    dout: PinDriver<'d, AnyInputPin, Input>,
    sck: PinDriver<'d, AnyOutputPin, Output>,
    /// Returned when a conversion is not ready in time.
    last: f32,
}

impl<'d> Hx711<'d> {
    pub fn new(dout: PinDriver<'d, AnyInputPin, Input>, sck: PinDriver<'d, AnyOutputPin, Output>) -> Self {
        Self { dout, sck, last: 0.0 }
    }

    /// DOUT goes low once a conversion is available.
    pub fn is_ready(&self) -> bool {
        self.dout.is_low()
    }

    fn wait_ready(&self) -> bool {
        let timeout = Duration::from_millis(HX711_READY_TIMEOUT_MS);
        let start = Instant::now();
        while !self.is_ready() {
            if start.elapsed() > timeout {
                return false;
            }
            thread::sleep(Duration::from_millis(1));
        }
        true
    }

    /// One signed 24-bit conversion.
    pub fn read_raw(&mut self) -> anyhow::Result<i32> {
        if !self.wait_ready() {
            bail!("HX711 not ready after {} ms", HX711_READY_TIMEOUT_MS);
        }

        // An interrupt stretching a high SCK phase past 60 µs would power the
        // chip down mid-word.
        let word = esp_idf_hal::interrupt::free(|| -> anyhow::Result<u32> {
            let mut word: u32 = 0;
            for _ in 0..DATA_BITS {
                self.sck.set_high()?;
                Ets::delay_us(1);
                word = (word << 1) | u32::from(self.dout.is_high());
                self.sck.set_low()?;
                Ets::delay_us(1);
            }
            for _ in 0..GAIN_128_PULSES {
                self.sck.set_high()?;
                Ets::delay_us(1);
                self.sck.set_low()?;
                Ets::delay_us(1);
            }
            Ok(word)
        })?;

        // Sign-extend the 24-bit two's complement value.
        Ok(((word << 8) as i32) >> 8)
    }

    /// SCK low wakes the chip (held high > 60 µs powers it down).
    pub fn power_up(&mut self) -> anyhow::Result<()> {
        self.sck.set_low()?;
        Ok(())
    }
}

impl LoadCell for Hx711<'_> {
    fn begin(&mut self) {
        if let Err(e) = self.power_up() {
            log::error!("HX711 power-up failed: {}", e);
        }
        thread::sleep(Duration::from_millis(SENSOR_SETTLE_MS));
        log::info!("HX711 initialised (channel A, gain 128)");
    }

    fn read(&mut self) -> f32 {
        match self.read_raw() {
            Ok(raw) => self.last = raw as f32,
            Err(e) => log::warn!("HX711 read error: {}", e),
        }
        self.last
    }
}
