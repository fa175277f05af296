// SmartCane V1 — Contact / Step Detection
//
// Two-state machine on a single threshold:
//   NoContact --(signal >= threshold)--> InContact
//   InContact --(signal <  threshold)--> NoContact   (+1 step)
//
// There is no hysteresis band: a signal hovering at the threshold toggles on
// every crossing and each release counts as a step.

use crate::events::ContactEvent;
use crate::session::StepCounter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContactState {
    #[default]
    NoContact,
    InContact,
}

#[derive(Debug, Clone)]
pub struct ContactEventDetector {
    threshold: f32,
    state: ContactState,
}

impl ContactEventDetector {
    pub fn new(threshold: f32) -> Self {
        Self { threshold, state: ContactState::NoContact }
    }

    pub fn state(&self) -> ContactState {
        self.state
    }

    /// Feed one conditioned sample.  Steps are counted on release.
    pub fn evaluate(&mut self, signal: f32, steps: &mut StepCounter) -> Option<ContactEvent> {
        let above = signal >= self.threshold;

        match (self.state, above) {
            (ContactState::NoContact, true) => {
                self.state = ContactState::InContact;
                Some(ContactEvent::ContactStart)
            }
            (ContactState::InContact, false) => {
                self.state = ContactState::NoContact;
                steps.increment();
                Some(ContactEvent::ContactEnd)
            }
            _ => None,
        }
    }

    pub fn reset(&mut self) {
        self.state = ContactState::NoContact;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ContactEvent::*;

    fn run(detector: &mut ContactEventDetector, steps: &mut StepCounter, signal: &[f32]) -> Vec<Option<ContactEvent>> {
        signal.iter().map(|&s| detector.evaluate(s, steps)).collect()
    }

    #[test]
    fn one_contact_is_one_step() {
        let mut detector = ContactEventDetector::new(5.0);
        let mut steps = StepCounter::default();

        let events = run(&mut detector, &mut steps, &[0.0, 6.0, 6.0, 2.0]);

        assert_eq!(events, vec![None, Some(ContactStart), None, Some(ContactEnd)]);
        assert_eq!(steps.get(), 1);
        assert_eq!(detector.state(), ContactState::NoContact);
    }

    #[test]
    fn contact_start_does_not_count() {
        let mut detector = ContactEventDetector::new(5.0);
        let mut steps = StepCounter::default();

        assert_eq!(detector.evaluate(9.0, &mut steps), Some(ContactStart));
        assert_eq!(steps.get(), 0);
        assert_eq!(detector.state(), ContactState::InContact);
    }

    #[test]
    fn threshold_is_inclusive() {
        let threshold = 5.0_f32;
        let mut detector = ContactEventDetector::new(threshold);
        let mut steps = StepCounter::default();
        let just_below = threshold - 1e-4;

        assert_eq!(detector.evaluate(just_below, &mut steps), None);
        assert_eq!(detector.evaluate(threshold, &mut steps), Some(ContactStart));
        assert_eq!(detector.evaluate(threshold, &mut steps), None);
        assert_eq!(detector.evaluate(just_below, &mut steps), Some(ContactEnd));
    }

    #[test]
    fn oscillation_at_threshold_counts_every_release() {
        let mut detector = ContactEventDetector::new(5.0);
        let mut steps = StepCounter::default();

        run(&mut detector, &mut steps, &[5.0, 4.99, 5.0, 4.99, 5.0, 4.99]);

        assert_eq!(steps.get(), 3);
    }

    #[test]
    fn reset_drops_open_contact() {
        let mut detector = ContactEventDetector::new(5.0);
        let mut steps = StepCounter::default();

        detector.evaluate(7.0, &mut steps);
        detector.reset();

        assert_eq!(detector.evaluate(1.0, &mut steps), None);
        assert_eq!(steps.get(), 0);
    }
}
