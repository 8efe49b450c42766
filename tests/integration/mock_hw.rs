//! Mock adapters for integration tests.
//!
//! Records every actuator call so tests can assert on the full pulse
//! history without touching real GPIO registers.  The clock is set by
//! hand so boost expiry can be tested without sleeping.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use vmc::app::events::AppEvent;
use vmc::app::ports::{ActuatorPort, ClockPort, EventSink};
use vmc::app::shared::SharedController;
use vmc::fsm::OutputLine;

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorCall {
    Pulse(OutputLine),
    Pause,
    Busy(bool),
}

// ── ManualClock ───────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

#[allow(dead_code)]
impl ManualClock {
    pub fn at(secs: u64) -> Arc<Self> {
        Arc::new(Self {
            now: AtomicU64::new(secs),
        })
    }

    pub fn now(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }

    pub fn set(&self, secs: u64) {
        self.now.store(secs, Ordering::SeqCst);
    }

    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl ClockPort for ManualClock {
    fn now_secs(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

// ── MockHardware ──────────────────────────────────────────────

/// Ingress activity to replay from inside `pulse`, as if the HTTP task
/// ran while the relay was held.
pub struct Observer {
    pub controller: Arc<SharedController>,
    pub clock: Arc<ManualClock>,
    /// Token submitted on the first pulse.
    pub submit_on_first_pulse: Option<&'static str>,
    /// Clock advance applied after each pulse (pulse width in seconds).
    pub secs_per_pulse: u64,
}

pub struct MockHardware {
    pub calls: Vec<ActuatorCall>,
    /// Mode label seen by a concurrent query at each pulse.
    pub labels_during_pulses: Vec<&'static str>,
    observer: Option<Observer>,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            labels_during_pulses: Vec::new(),
            observer: None,
        }
    }

    pub fn observed(observer: Observer) -> Self {
        Self {
            observer: Some(observer),
            ..Self::new()
        }
    }

    pub fn pulses(&self) -> Vec<OutputLine> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                ActuatorCall::Pulse(line) => Some(*line),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
        self.labels_during_pulses.clear();
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl ActuatorPort for MockHardware {
    fn pulse(&mut self, line: OutputLine) {
        let first = !self
            .calls
            .iter()
            .any(|c| matches!(c, ActuatorCall::Pulse(_)));
        self.calls.push(ActuatorCall::Pulse(line));

        if let Some(obs) = &mut self.observer {
            let label = obs.controller.query_mode(obs.clock.now_secs());
            self.labels_during_pulses.push(label);
            if first {
                if let Some(token) = obs.submit_on_first_pulse.take() {
                    obs.controller
                        .submit(token)
                        .expect("observer token must be valid");
                }
            }
            obs.clock.advance(obs.secs_per_pulse);
        }
    }

    fn pause(&mut self) {
        self.calls.push(ActuatorCall::Pause);
    }

    fn set_busy(&mut self, busy: bool) {
        self.calls.push(ActuatorCall::Busy(busy));
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&AppEvent> {
        self.events.last()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(*event);
    }
}
