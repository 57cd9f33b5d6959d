//! Mock adapters for integration tests.
//!
//! `MockHardware` answers pings from a script (or a fixed distance) and
//! records every output call so tests can assert on the full command
//! history without touching real GPIO.

use std::collections::{HashMap, VecDeque};

use tankwatch::app::events::AppEvent;
use tankwatch::app::ports::{EventSink, OutputPort, RangingPort, StoragePort};
use tankwatch::config::SPEED_OF_SOUND_CM_PER_US;
use tankwatch::error::{PersistenceError, SensorError};
use tankwatch::sensors::RawSample;
use tankwatch::storage::ConfigStore;

/// Echo duration that reads back as `cm`.
pub fn us_for_cm(cm: f32) -> u32 {
    (cm * 2.0 / SPEED_OF_SOUND_CM_PER_US).round() as u32
}

// ── Output call record ────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputCall {
    Buzzer(bool),
    Relay(bool),
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    /// Per-ping results consumed first; `None` is an echo timeout.
    pub script: VecDeque<Option<u32>>,
    /// Answer once the script is exhausted; `None` times out.
    pub steady_us: Option<u32>,
    pub calls: Vec<OutputCall>,
    pub pings: usize,
    pub buzzer: bool,
    pub relay: bool,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn at_distance(cm: f32) -> Self {
        Self {
            script: VecDeque::new(),
            steady_us: Some(us_for_cm(cm)),
            calls: Vec::new(),
            pings: 0,
            buzzer: false,
            relay: false,
        }
    }

    pub fn silent() -> Self {
        Self { steady_us: None, ..Self::at_distance(0.0) }
    }

    pub fn set_distance(&mut self, cm: f32) {
        self.steady_us = Some(us_for_cm(cm));
    }

    pub fn go_silent(&mut self) {
        self.steady_us = None;
    }

    /// Queue one round where `timeouts` of `iterations` pings fail.
    pub fn script_round(&mut self, cm: f32, iterations: usize, timeouts: usize) {
        for i in 0..iterations {
            self.script.push_back(if i < timeouts { None } else { Some(us_for_cm(cm)) });
        }
    }
}

impl RangingPort for MockHardware {
    fn measure_once(&mut self) -> Result<RawSample, SensorError> {
        self.pings += 1;
        let step = self.script.pop_front().unwrap_or(self.steady_us);
        step.map(RawSample::new).ok_or(SensorError::EchoTimeout)
    }
}

impl OutputPort for MockHardware {
    fn set_buzzer(&mut self, on: bool) {
        self.buzzer = on;
        self.calls.push(OutputCall::Buzzer(on));
    }

    fn set_relay(&mut self, on: bool) {
        self.relay = on;
        self.calls.push(OutputCall::Relay(on));
    }
}

// ── MockStorage ───────────────────────────────────────────────

#[derive(Default)]
pub struct MockStorage {
    pub store: HashMap<String, Vec<u8>>,
    pub fail_writes: bool,
    pub writes: usize,
}

#[allow(dead_code)]
impl MockStorage {
    pub fn with_raw(namespace: &str, key: &str, bytes: &[u8]) -> Self {
        let mut s = Self::default();
        s.store.insert(format!("{namespace}::{key}"), bytes.to_vec());
        s
    }
}

impl StoragePort for MockStorage {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, PersistenceError> {
        match self.store.get(&format!("{namespace}::{key}")) {
            Some(v) => {
                let n = v.len().min(buf.len());
                buf[..n].copy_from_slice(&v[..n]);
                Ok(n)
            }
            None => Err(PersistenceError::NotFound),
        }
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), PersistenceError> {
        if self.fail_writes {
            return Err(PersistenceError::IoError);
        }
        self.writes += 1;
        self.store.insert(format!("{namespace}::{key}"), data.to_vec());
        Ok(())
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        self.store.contains_key(&format!("{namespace}::{key}"))
    }
}

pub type MockFlagStore = ConfigStore<MockStorage>;

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

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(*event);
    }
}
