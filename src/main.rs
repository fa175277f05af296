// SmartCane V1 — Firmware Entry Point
//
// Boot sequence:
//   1. Bring up logging, Wi-Fi and the MQTT uplink (serial fallback).
//   2. Power the HX711, let it settle, tare.
//   3. Validate configuration and announce "Force cane started".
//   4. Run the control loop: poll button, sample while logging.
//
// A button press starts a logging session; the next press stops it and
// publishes the JSON summary.
//
// On a host build the same controller runs against simulated hardware.

#[cfg(target_os = "espidf")]
fn main() -> anyhow::Result<()> {
    firmware::run()
}

#[cfg(not(target_os = "espidf"))]
fn main() -> anyhow::Result<()> {
    host::run()
}

#[cfg(target_os = "espidf")]
mod firmware {
    use std::thread;
    use std::time::Duration;

    use esp_idf_hal::gpio::{InputPin, OutputPin, PinDriver};
    use esp_idf_hal::prelude::*;
    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use esp_idf_svc::nvs::EspDefaultNvsPartition;

    use smartcane::config::*;
    use smartcane::drivers::button::SessionButton;
    use smartcane::drivers::clock::EspClock;
    use smartcane::drivers::hx711::Hx711;
    use smartcane::drivers::led::StatusLed;
    use smartcane::drivers::net::{self, MqttPublisher, Uplink};
    use smartcane::{CaneConfig, CaneIo, SessionController};

    pub fn run() -> anyhow::Result<()> {
        // Link esp-idf-sys runtime patches and initialise logging.
        esp_idf_svc::sys::link_patches();
        esp_idf_svc::log::EspLogger::initialize_default();
        log::info!("SmartCane V1 firmware starting…");

        // ---- Peripherals ------------------------------------------------------
        let peripherals = Peripherals::take()?;
        let sysloop = EspSystemEventLoop::take()?;
        let nvs = EspDefaultNvsPartition::take()?;

        // ---- Uplink -----------------------------------------------------------
        // The Wi-Fi driver must outlive the loop; keep it bound.
        let mut _wifi = None;
        let uplink = if WIFI_SSID.is_empty() {
            log::warn!("No Wi-Fi credentials baked in — publishing to serial only");
            Uplink::Serial
        } else {
            match net::connect_wifi(peripherals.modem, sysloop, nvs)
                .and_then(|wifi| Ok((wifi, MqttPublisher::connect(MQTT_URL)?)))
            {
                Ok((wifi, mqtt)) => {
                    _wifi = Some(wifi);
                    Uplink::Mqtt(mqtt)
                }
                Err(e) => {
                    log::error!("Uplink failed ({}) — publishing to serial only", e);
                    Uplink::Serial
                }
            }
        };

        // ---- GPIO -------------------------------------------------------------
        let dout = PinDriver::input(peripherals.pins.gpio2.downgrade_input())?;
        let sck = PinDriver::output(peripherals.pins.gpio3.downgrade_output())?;
        let led = PinDriver::output(peripherals.pins.gpio8.downgrade_output())?;
        let button = PinDriver::input(peripherals.pins.gpio9.downgrade_input())?; // PIN_BUTTON

        let io = CaneIo {
            load_cell: Hx711::new(dout, sck),
            trigger: SessionButton::new(button),
            indicator: StatusLed::new(led),
            publisher: uplink,
            clock: EspClock,
        };

        // ---- Calibrate & validate ---------------------------------------------
        let mut controller = SessionController::boot(CaneConfig::default(), io)?;
        log::info!("Boot complete — press the button to start a session");

        // ---- Control loop -----------------------------------------------------
        let poll_interval = Duration::from_millis(LOOP_POLL_INTERVAL_MS);
        loop {
            controller.poll();
            thread::sleep(poll_interval);
        }
    }
}

#[cfg(not(target_os = "espidf"))]
mod host {
    use smartcane::config::*;
    use smartcane::io::Clock;
    use smartcane::sim::{RecordingIndicator, RecordingPublisher, ScriptedLoadCell, ScriptedTrigger, SimClock};
    use smartcane::{CaneConfig, CaneIo, SessionController, Transition};

    const BASELINE_RAW: f32 = 8_400.0;

    /// Cane load in kg over one stride, one value per sample.  The long
    /// unloaded tail lets the smoothed signal fall back under the threshold.
    const STRIDE_KG: [f32; 16] = [
        0.0, 0.6, 2.4, 3.4, 3.0, 1.2, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0,
    ];

    pub fn run() -> anyhow::Result<()> {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
        log::info!("SmartCane V1 host simulation");

        let config = CaneConfig::default();
        let readings = STRIDE_KG
            .iter()
            .cycle()
            .take(STRIDE_KG.len() * 3)
            .map(|kg| BASELINE_RAW + kg * config.calibration_factor);

        let io = CaneIo {
            load_cell: ScriptedLoadCell::new(BASELINE_RAW, readings),
            trigger: ScriptedTrigger::default(),
            indicator: RecordingIndicator::default(),
            publisher: RecordingPublisher::default(),
            clock: SimClock::default(),
        };
        let mut controller = SessionController::boot(config, io)?;

        press(&mut controller);
        while controller.io().load_cell.remaining() > 0 {
            controller.io_mut().clock.delay_ms(LOOP_POLL_INTERVAL_MS as u32);
            controller.poll();
        }

        match press(&mut controller) {
            Some(Transition::Finished(payload)) => println!("{}", payload.to_json()?),
            other => anyhow::bail!("session did not finish: {:?}", other),
        }
        Ok(())
    }

    type HostController =
        SessionController<ScriptedLoadCell, ScriptedTrigger, RecordingIndicator, RecordingPublisher, SimClock>;

    fn press(controller: &mut HostController) -> Option<Transition> {
        controller.io_mut().trigger.set(false);
        controller.poll();
        controller.io_mut().trigger.set(true);
        controller.poll().transition
    }
}
