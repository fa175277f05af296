// SmartCane V1 — Session Controller
//
// Idle --(button rising edge)--> Logging --(button rising edge)--> Idle
//
// One `poll()` per control-loop iteration:
//   1. read the debounced trigger level and react to a low → high edge;
//   2. while logging, take a sample once `sample_interval_ms` has elapsed.
// Nothing in here sleeps except the short LED blink after a publish.

use crate::conditioning::{CalibrationProfile, SignalConditioner};
use crate::config::{CaneConfig, ConfigError, STANDARD_GRAVITY};
use crate::contact::{ContactEventDetector, ContactState};
use crate::events::{ContactEvent, LiveMetrics, Mode, Visibility};
use crate::io::{Clock, Indicator, LoadCell, Publisher, TriggerInput};
use crate::pressure::PressureEstimator;
use crate::session::{SessionPayload, SessionRecorder};

/// External collaborators driven by the controller.
pub struct CaneIo<L, T, I, P, C> {
    pub load_cell: L,
    pub trigger: T,
    pub indicator: I,
    pub publisher: P,
    pub clock: C,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Started,
    Finished(SessionPayload),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleOutcome {
    pub timestamp_ms: u64,
    pub metrics: LiveMetrics,
    pub contact: Option<ContactEvent>,
}

/// What a single `poll()` did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PollOutcome {
    pub transition: Option<Transition>,
    pub sample: Option<SampleOutcome>,
}

pub struct SessionController<L, T, I, P, C> {
    config: CaneConfig,
    io: CaneIo<L, T, I, P, C>,

    conditioner: SignalConditioner,
    detector: ContactEventDetector,
    estimator: PressureEstimator,
    recorder: SessionRecorder,

    mode: Mode,
    last_trigger: Option<bool>,
    last_sample_ms: Option<u64>,
    metrics: LiveMetrics,
}

impl<L, T, I, P, C> SessionController<L, T, I, P, C>
where
    L: LoadCell,
    T: TriggerInput,
    I: Indicator,
    P: Publisher,
    C: Clock,
{
    /// Validate the configuration and build the pipeline around a known calibration.
    pub fn new(
        config: CaneConfig,
        calibration: CalibrationProfile,
        io: CaneIo<L, T, I, P, C>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let conditioner = SignalConditioner::new(calibration, config.unit_multiplier, config.alpha);
        let detector = ContactEventDetector::new(config.contact_threshold);
        let estimator = PressureEstimator::new(
            config.base_area_cm2,
            config.area_spread_cm2_per_kg,
            config.min_area_cm2,
        );

        Ok(Self {
            config,
            io,
            conditioner,
            detector,
            estimator,
            recorder: SessionRecorder::new(),
            mode: Mode::Idle,
            last_trigger: None,
            last_sample_ms: None,
            metrics: LiveMetrics::default(),
        })
    }

    /// Boot path: validate, power the bridge, tare, announce.
    pub fn boot(config: CaneConfig, mut io: CaneIo<L, T, I, P, C>) -> anyhow::Result<Self> {
        config.validate()?;

        io.load_cell.begin();
        let zero_offset = io.load_cell.tare(config.tare_samples);
        let calibration = CalibrationProfile::new(zero_offset, config.calibration_factor)?;
        log::info!(
            "Calibrated: zero offset {:.1}, factor {:.1}",
            calibration.zero_offset(),
            calibration.scale_factor()
        );

        let mut controller = Self::new(config, calibration, io)?;
        controller.set_indicator(false);
        let status = controller.config.topics.status.clone();
        controller.publish(&status, "Force cane started", Visibility::Private);
        log::info!("Force cane firmware loaded");
        Ok(controller)
    }

    pub fn poll(&mut self) -> PollOutcome {
        let mut outcome = PollOutcome::default();

        let level = self.io.trigger.read_level();
        let rising = self.last_trigger == Some(false) && level;
        self.last_trigger = Some(level);

        if rising {
            outcome.transition = Some(match self.mode {
                Mode::Idle => {
                    self.start_session();
                    Transition::Started
                }
                Mode::Logging => Transition::Finished(self.finish_session()),
            });
        }

        if self.mode == Mode::Logging {
            let now = self.io.clock.now_ms();
            let due = self
                .last_sample_ms
                .map_or(true, |last| now.saturating_sub(last) >= self.config.sample_interval_ms);
            if due {
                outcome.sample = Some(self.sample(now));
            }
        }

        outcome
    }

    fn start_session(&mut self) {
        self.recorder.reset();
        self.detector.reset();
        self.conditioner.reset();
        self.last_sample_ms = None;
        self.metrics = LiveMetrics::default();
        self.mode = Mode::Logging;

        self.set_indicator(true);
        let topic = self.config.topics.status.clone();
        self.publish(&topic, "Logging Started", Visibility::Private);
        log::info!("Session started");
    }

    fn finish_session(&mut self) -> SessionPayload {
        self.mode = Mode::Idle;
        self.set_indicator(false);
        let topic = self.config.topics.status.clone();
        self.publish(&topic, "Logging Stopped", Visibility::Private);

        let payload = self.recorder.drain_to_payload();
        match payload.to_json() {
            Ok(json) => {
                let topic = self.config.topics.session.clone();
                self.publish(&topic, &json, Visibility::Private);
            }
            Err(e) => log::warn!("Session payload encoding failed: {}", e),
        }
        self.blink();

        let status = format!(
            "Session complete: {} steps, {} samples",
            payload.steps,
            payload.force.len()
        );
        let topic = self.config.topics.status.clone();
        self.publish(&topic, &status, Visibility::Private);
        log::info!("{}", status);

        payload
    }

    fn sample(&mut self, now: u64) -> SampleOutcome {
        self.last_sample_ms = Some(now);

        let raw = self.io.load_cell.read();
        let force_n = self.conditioner.condition(raw);
        self.recorder.append(now, force_n);
        let contact = self.detector.evaluate(force_n, self.recorder.steps_mut());

        let pressure = self.estimator.estimate(force_n);
        self.metrics = LiveMetrics {
            weight_kg: force_n / STANDARD_GRAVITY,
            force_n,
            pressure_kpa: pressure.pressure_kpa,
            contact_area_cm2: pressure.contact_area_cm2,
            steps: self.recorder.steps(),
        };

        log::debug!(
            "kg: {:.3}   F: {:.2} N   P: {:.2} kPa   Area: {:.2} cm^2   Steps: {}",
            self.metrics.weight_kg,
            self.metrics.force_n,
            self.metrics.pressure_kpa,
            self.metrics.contact_area_cm2,
            self.metrics.steps
        );

        if let Some(event) = contact {
            self.announce_contact(event);
        }

        SampleOutcome { timestamp_ms: now, metrics: self.metrics, contact }
    }

    fn announce_contact(&mut self, event: ContactEvent) {
        let kg = format!("{:.3}", self.metrics.weight_kg);
        match event {
            ContactEvent::ContactStart => log::info!("START detected."),
            ContactEvent::ContactEnd => log::info!("STOP detected. Step {}", self.metrics.steps),
        }

        if !self.config.publish_contact_events {
            return;
        }
        match event {
            ContactEvent::ContactStart => {
                let topic = self.config.topics.contact_start.clone();
                self.publish(&topic, &kg, Visibility::Private);
            }
            ContactEvent::ContactEnd => {
                let topic = self.config.topics.contact_stop.clone();
                self.publish(&topic, &kg, Visibility::Private);
                let topic = self.config.topics.step.clone();
                let steps = self.metrics.steps.to_string();
                self.publish(&topic, &steps, Visibility::Private);
            }
        }
    }

    fn blink(&mut self) {
        for _ in 0..self.config.blink_count {
            self.set_indicator(true);
            self.io.clock.delay_ms(self.config.blink_on_ms);
            self.set_indicator(false);
            self.io.clock.delay_ms(self.config.blink_off_ms);
        }
    }

    fn set_indicator(&mut self, on: bool) {
        if let Err(e) = self.io.indicator.set_level(on) {
            log::warn!("Indicator write failed: {}", e);
        }
    }

    fn publish(&mut self, topic: &str, payload: &str, visibility: Visibility) {
        if let Err(e) = self.io.publisher.publish(topic, payload, visibility) {
            log::warn!("Publish to `{}` failed: {}", topic, e);
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn contact_state(&self) -> ContactState {
        self.detector.state()
    }

    pub fn metrics(&self) -> &LiveMetrics {
        &self.metrics
    }

    pub fn recorder(&self) -> &SessionRecorder {
        &self.recorder
    }

    pub fn calibration(&self) -> &CalibrationProfile {
        self.conditioner.calibration()
    }

    pub fn config(&self) -> &CaneConfig {
        &self.config
    }

    pub fn io(&self) -> &CaneIo<L, T, I, P, C> {
        &self.io
    }

    pub fn io_mut(&mut self) -> &mut CaneIo<L, T, I, P, C> {
        &mut self.io
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{RecordingIndicator, RecordingPublisher, ScriptedLoadCell, ScriptedTrigger, SimClock};

    type TestController =
        SessionController<ScriptedLoadCell, ScriptedTrigger, RecordingIndicator, RecordingPublisher, SimClock>;

    fn io(readings: &[f32]) -> CaneIo<ScriptedLoadCell, ScriptedTrigger, RecordingIndicator, RecordingPublisher, SimClock> {
        CaneIo {
            load_cell: ScriptedLoadCell::new(0.0, readings.iter().copied()),
            trigger: ScriptedTrigger::default(),
            indicator: RecordingIndicator::default(),
            publisher: RecordingPublisher::default(),
            clock: SimClock::default(),
        }
    }

    fn unit_config() -> CaneConfig {
        CaneConfig {
            alpha: 1.0,
            unit_multiplier: 1.0,
            contact_threshold: 5.0,
            blink_count: 2,
            ..CaneConfig::default()
        }
    }

    fn controller(readings: &[f32]) -> TestController {
        let calibration = CalibrationProfile::new(0.0, 1.0).unwrap();
        SessionController::new(unit_config(), calibration, io(readings)).unwrap()
    }

    fn press(ctl: &mut TestController) -> PollOutcome {
        ctl.io_mut().trigger.set(false);
        ctl.poll();
        ctl.io_mut().trigger.set(true);
        ctl.poll()
    }

    #[test]
    fn rejects_invalid_config() {
        let calibration = CalibrationProfile::new(0.0, 1.0).unwrap();
        let config = CaneConfig { base_area_cm2: 0.0, ..CaneConfig::default() };
        assert!(SessionController::new(config, calibration, io(&[])).is_err());
    }

    #[test]
    fn held_button_at_boot_does_not_start_a_session() {
        let mut ctl = controller(&[1.0]);
        ctl.io_mut().trigger.set(true);

        let outcome = ctl.poll();

        assert_eq!(outcome, PollOutcome::default());
        assert_eq!(ctl.mode(), Mode::Idle);
    }

    #[test]
    fn idle_controller_does_not_sample() {
        let mut ctl = controller(&[9.0]);
        for _ in 0..5 {
            ctl.io_mut().clock.advance(500);
            assert!(ctl.poll().sample.is_none());
        }
        assert!(ctl.recorder().is_empty());
    }

    #[test]
    fn rising_edge_starts_logging_and_lights_indicator() {
        let mut ctl = controller(&[2.0]);

        let outcome = press(&mut ctl);

        assert_eq!(outcome.transition, Some(Transition::Started));
        assert_eq!(ctl.mode(), Mode::Logging);
        assert!(ctl.io().indicator.level());
        assert_eq!(ctl.io().publisher.payloads("status"), vec!["Logging Started"]);
        // First sample is taken right away.
        assert_eq!(outcome.sample.map(|s| s.timestamp_ms), Some(0));
    }

    #[test]
    fn holding_the_button_is_a_single_trigger() {
        let mut ctl = controller(&[2.0]);
        press(&mut ctl);

        for _ in 0..3 {
            ctl.io_mut().clock.advance(10);
            assert!(ctl.poll().transition.is_none());
        }
        assert_eq!(ctl.mode(), Mode::Logging);
    }

    #[test]
    fn sampling_follows_the_interval() {
        let mut ctl = controller(&[1.0, 1.0, 1.0, 1.0]);
        press(&mut ctl);

        ctl.io_mut().clock.advance(60);
        assert!(ctl.poll().sample.is_none());
        ctl.io_mut().clock.advance(40);
        assert_eq!(ctl.poll().sample.map(|s| s.timestamp_ms), Some(100));
        ctl.io_mut().clock.advance(99);
        assert!(ctl.poll().sample.is_none());

        assert_eq!(ctl.recorder().len(), 2);
    }

    #[test]
    fn contact_edges_are_published() {
        let mut ctl = controller(&[3.0, 8.0, 3.0]);
        press(&mut ctl);
        ctl.io_mut().clock.advance(100);
        let start = ctl.poll().sample.and_then(|s| s.contact);
        ctl.io_mut().clock.advance(100);
        let end = ctl.poll().sample.and_then(|s| s.contact);

        assert_eq!(start, Some(ContactEvent::ContactStart));
        assert_eq!(end, Some(ContactEvent::ContactEnd));

        let publisher = &ctl.io().publisher;
        // 8 N and 3 N expressed in kilograms
        assert_eq!(publisher.payloads("cane_start"), vec!["0.816"]);
        assert_eq!(publisher.payloads("cane_stop"), vec!["0.306"]);
        assert_eq!(publisher.payloads("cane_step"), vec!["1"]);
        assert_eq!(ctl.metrics().steps, 1);
    }

    #[test]
    fn contact_edges_can_be_silenced() {
        let calibration = CalibrationProfile::new(0.0, 1.0).unwrap();
        let config = CaneConfig { publish_contact_events: false, ..unit_config() };
        let mut ctl = SessionController::new(config, calibration, io(&[8.0, 1.0])).unwrap();
        press(&mut ctl);
        ctl.io_mut().clock.advance(100);
        ctl.poll();

        assert_eq!(ctl.recorder().steps(), 1);
        let topics: Vec<_> = ctl.io().publisher.messages().iter().map(|m| m.topic.as_str()).collect();
        assert_eq!(topics, vec!["status"]);
    }

    #[test]
    fn stop_turns_indicator_off_before_publishing_then_blinks() {
        let mut ctl = controller(&[6.0]);
        press(&mut ctl);
        ctl.io_mut().indicator.clear_history();

        let outcome = press(&mut ctl);

        assert!(matches!(outcome.transition, Some(Transition::Finished(_))));
        assert_eq!(ctl.mode(), Mode::Idle);
        // off, then two blinks
        assert_eq!(ctl.io().indicator.history(), &[false, true, false, true, false]);
        assert!(!ctl.io().indicator.level());
        assert_eq!(ctl.io().clock.now_ms(), 400);

        let topics: Vec<_> = ctl.io().publisher.messages().iter().map(|m| m.topic.as_str()).collect();
        assert_eq!(topics, vec!["status", "cane_start", "status", "cane_session", "status"]);
        assert_eq!(
            ctl.io().publisher.payloads("status"),
            vec!["Logging Started", "Logging Stopped", "Session complete: 0 steps, 1 samples"]
        );
    }

    #[test]
    fn new_session_starts_from_scratch() {
        let mut ctl = controller(&[8.0, 1.0, 2.0]);
        press(&mut ctl);
        ctl.io_mut().clock.advance(100);
        ctl.poll();
        press(&mut ctl);

        ctl.io_mut().clock.advance(100);
        press(&mut ctl);

        assert_eq!(ctl.recorder().steps(), 0);
        assert_eq!(ctl.recorder().len(), 1);
        assert_eq!(ctl.contact_state(), ContactState::NoContact);
    }

    #[test]
    fn metrics_follow_the_last_sample() {
        let calibration = CalibrationProfile::new(0.0, 1.0).unwrap();
        let config = CaneConfig { alpha: 1.0, unit_multiplier: 1.0, ..CaneConfig::default() };
        let mut ctl = SessionController::new(config, calibration, io(&[10.0])).unwrap();

        press(&mut ctl);

        let metrics = ctl.metrics();
        approx::assert_relative_eq!(metrics.force_n, 10.0);
        approx::assert_relative_eq!(metrics.weight_kg, 1.019_716, epsilon = 1e-5);
        approx::assert_relative_eq!(metrics.contact_area_cm2, 5.2746, epsilon = 1e-3);
        approx::assert_relative_eq!(metrics.pressure_kpa, 18.96, epsilon = 1e-2);
    }

    #[test]
    fn boot_tares_and_announces() {
        let config = CaneConfig { calibration_factor: 100.0, ..unit_config() };
        let mut io = io(&[]);
        io.load_cell = ScriptedLoadCell::new(8_400.0, [8_900.0]);

        let mut ctl = SessionController::boot(config, io).unwrap();

        assert!(ctl.io().load_cell.is_started());
        approx::assert_relative_eq!(ctl.calibration().zero_offset(), 8_400.0);
        assert_eq!(ctl.io().publisher.payloads("status"), vec!["Force cane started"]);

        let outcome = press(&mut ctl);
        approx::assert_relative_eq!(outcome.sample.unwrap().metrics.force_n, 5.0, epsilon = 1e-4);
        assert_eq!(
            ctl.io().publisher.payloads("status"),
            vec!["Force cane started", "Logging Started"]
        );
    }

    #[test]
    fn boot_rejects_zero_calibration_factor() {
        let config = CaneConfig { calibration_factor: 0.0, ..CaneConfig::default() };
        assert!(SessionController::boot(config, io(&[])).is_err());
    }
}
