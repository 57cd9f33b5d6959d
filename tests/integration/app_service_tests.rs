//! Integration tests for the AppService → sampling → actuators pipeline.
//!
//! These run on the host and drive full control cycles through mock
//! adapters: scripted pings in, recorded output calls and events out.

use super::mock_hw::{MockHardware, RecordingSink};

use tankwatch::app::events::AppEvent;
use tankwatch::app::service::AppService;
use tankwatch::config::{MAX_RELAY_ON_MS, MEDIAN_ITERATIONS, SystemConfig};
use tankwatch::control::EnableFlags;
use tankwatch::error::SensorError;
use tankwatch::safety::StatusFault;
use tankwatch::sensors::FillPercentage;

fn make_app() -> (AppService, RecordingSink) {
    let mut app = AppService::new(SystemConfig::default(), EnableFlags::default()).unwrap();
    let mut sink = RecordingSink::new();
    app.start(&mut sink);
    (app, sink)
}

fn whole(fill: Option<FillPercentage>) -> Option<u8> {
    fill.map(FillPercentage::whole)
}

#[test]
fn start_emits_boot_flags() {
    let (_app, sink) = make_app();
    assert_eq!(sink.events, vec![AppEvent::Started(EnableFlags::default())]);
}

#[test]
fn one_cycle_uses_one_round_of_pings() {
    let (mut app, mut sink) = make_app();
    let mut hw = MockHardware::at_distance(60.0);
    app.tick(&mut hw, &mut sink, 0);
    assert_eq!(hw.pings, MEDIAN_ITERATIONS);
}

#[test]
fn low_level_keeps_outputs_off() {
    let (mut app, mut sink) = make_app();
    let mut hw = MockHardware::at_distance(40.0);
    let snap = app.tick(&mut hw, &mut sink, 0);
    assert_eq!(whole(snap.fill), Some(81));
    assert!(!hw.buzzer && !hw.relay);
    assert!(!snap.stale);
}

#[test]
fn buzzer_band_sounds_buzzer_only() {
    let (mut app, mut sink) = make_app();
    let mut hw = MockHardware::at_distance(28.0);
    let snap = app.tick(&mut hw, &mut sink, 0);
    assert_eq!(whole(snap.fill), Some(96));
    assert!(hw.buzzer);
    assert!(!hw.relay);
    assert_eq!(sink.count(|e| *e == AppEvent::BuzzerChanged(true)), 1);
}

#[test]
fn near_full_engages_relay() {
    let (mut app, mut sink) = make_app();
    let mut hw = MockHardware::at_distance(26.0);
    let snap = app.tick(&mut hw, &mut sink, 0);
    assert_eq!(whole(snap.fill), Some(99));
    assert!(hw.buzzer && hw.relay);
    assert_eq!(app.controller().state().relay_on_since, Some(0));
}

#[test]
fn change_events_fire_once_per_transition() {
    let (mut app, mut sink) = make_app();
    let mut hw = MockHardware::at_distance(28.0);
    for t in 0..5 {
        app.tick(&mut hw, &mut sink, t * 1000);
    }
    assert_eq!(sink.count(|e| matches!(e, AppEvent::BuzzerChanged(_))), 1);

    hw.set_distance(60.0);
    app.tick(&mut hw, &mut sink, 6000);
    assert_eq!(sink.count(|e| *e == AppEvent::BuzzerChanged(false)), 1);
}

#[test]
fn buzzer_holds_inside_hysteresis_band() {
    let (mut app, mut sink) = make_app();
    let mut hw = MockHardware::at_distance(28.0); // 96 %
    app.tick(&mut hw, &mut sink, 0);
    assert!(hw.buzzer);

    hw.set_distance(30.53); // 93 %
    app.tick(&mut hw, &mut sink, 1000);
    assert!(hw.buzzer, "93 % is within the margin below 95 %");

    hw.set_distance(32.11); // 91 %
    app.tick(&mut hw, &mut sink, 2000);
    assert!(!hw.buzzer);
}

#[test]
fn failed_round_keeps_previous_reading_and_outputs() {
    let (mut app, mut sink) = make_app();
    let mut hw = MockHardware::at_distance(28.0);
    app.tick(&mut hw, &mut sink, 0);
    assert!(hw.buzzer);

    // 6 of 10 pings time out.
    hw.script_round(28.0, MEDIAN_ITERATIONS, 6);
    let snap = app.tick(&mut hw, &mut sink, 1000);

    assert!(snap.stale);
    assert_eq!(snap.consecutive_skips, 1);
    assert_eq!(whole(snap.fill), Some(96), "prior level retained");
    assert!(hw.buzzer, "outputs retained");
    assert!(snap.status_flags & StatusFault::ReadingStale.mask() != 0);
    assert!(sink.events.contains(&AppEvent::CycleSkipped {
        consecutive: 1,
        error: SensorError::InsufficientData { valid: 4, iterations: 10 },
    }));
}

#[test]
fn half_the_pings_is_still_a_reading() {
    let (mut app, mut sink) = make_app();
    let mut hw = MockHardware::at_distance(40.0);
    hw.script_round(40.0, MEDIAN_ITERATIONS, 5);
    let snap = app.tick(&mut hw, &mut sink, 0);
    assert!(!snap.stale);
    assert_eq!(app.last_reading().map(|r| r.valid_samples), Some(5));
}

#[test]
fn recovery_clears_stale_and_skip_count() {
    let (mut app, mut sink) = make_app();
    let mut hw = MockHardware::silent();
    for t in 0..3 {
        app.tick(&mut hw, &mut sink, t * 1000);
    }
    assert_eq!(app.snapshot().consecutive_skips, 3);
    assert_eq!(app.snapshot().fill, None);

    hw.set_distance(40.0);
    let snap = app.tick(&mut hw, &mut sink, 3000);
    assert!(!snap.stale);
    assert_eq!(snap.consecutive_skips, 0);
    assert_eq!(snap.status_flags & StatusFault::ReadingStale.mask(), 0);
}

#[test]
fn relay_released_by_safety_bound() {
    let (mut app, mut sink) = make_app();
    let mut hw = MockHardware::at_distance(26.0);
    app.tick(&mut hw, &mut sink, 0);
    assert!(hw.relay);

    app.tick(&mut hw, &mut sink, MAX_RELAY_ON_MS - 1);
    assert!(hw.relay);

    let snap = app.tick(&mut hw, &mut sink, MAX_RELAY_ON_MS);
    assert!(!hw.relay);
    assert!(snap.safety_timeout_fired);
    assert!(snap.status_flags & StatusFault::RelayTimeout.mask() != 0);
    assert_eq!(sink.count(|e| *e == AppEvent::SafetyTimeout), 1);
    assert!(hw.buzzer, "buzzer is unaffected by the relay bound");
}

#[test]
fn safety_latch_holds_until_level_drops() {
    let (mut app, mut sink) = make_app();
    let mut hw = MockHardware::at_distance(26.0);
    app.tick(&mut hw, &mut sink, 0);
    app.tick(&mut hw, &mut sink, MAX_RELAY_ON_MS);

    for i in 1..=5 {
        app.tick(&mut hw, &mut sink, MAX_RELAY_ON_MS + i * 1000);
        assert!(!hw.relay, "relay must not re-engage on a stuck reading");
    }

    hw.set_distance(40.0);
    let snap = app.tick(&mut hw, &mut sink, MAX_RELAY_ON_MS + 10_000);
    assert!(!snap.safety_timeout_fired);

    hw.set_distance(26.0);
    app.tick(&mut hw, &mut sink, MAX_RELAY_ON_MS + 11_000);
    assert!(hw.relay);
}

#[test]
fn safety_bound_applies_while_sensor_is_dead() {
    let (mut app, mut sink) = make_app();
    let mut hw = MockHardware::at_distance(26.0);
    app.tick(&mut hw, &mut sink, 0);
    assert!(hw.relay);

    hw.go_silent();
    app.tick(&mut hw, &mut sink, 1000);
    assert!(hw.relay, "a skipped cycle keeps outputs");

    let snap = app.tick(&mut hw, &mut sink, MAX_RELAY_ON_MS);
    assert!(snap.stale);
    assert!(!hw.relay);
    assert!(snap.safety_timeout_fired);
}
