//! Button edge → ISR queue → main-loop toggle path.

use super::mock_hw::{MockFlagStore, MockHardware, MockStorage, RecordingSink};

use tankwatch::app::commands::AppCommand;
use tankwatch::app::events::AppEvent;
use tankwatch::app::ports::FlagStore;
use tankwatch::app::service::AppService;
use tankwatch::config::SystemConfig;
use tankwatch::control::EnableFlags;
use tankwatch::drivers::button::{DEBOUNCE_MS, InterruptRouter};
use tankwatch::events::{ToggleEvent, ToggleQueue};

struct Rig {
    app: AppService,
    hw: MockHardware,
    store: MockFlagStore,
    sink: RecordingSink,
}

fn rig(cm: f32) -> Rig {
    let mut app = AppService::new(SystemConfig::default(), EnableFlags::default()).unwrap();
    let mut sink = RecordingSink::new();
    app.start(&mut sink);
    Rig {
        app,
        hw: MockHardware::at_distance(cm),
        store: MockFlagStore::new(MockStorage::default()),
        sink,
    }
}

#[test]
fn button_press_toggles_buzzer_flag() {
    let mut r = rig(60.0);
    let queue = ToggleQueue::new();
    let router = InterruptRouter::new(&queue, DEBOUNCE_MS);

    router.on_edge(ToggleEvent::Buzzer, 100);
    let applied = r.app.drain_toggles(&queue, &mut r.hw, &mut r.store, &mut r.sink, 100);

    assert_eq!(applied, 1);
    assert!(!r.app.controller().flags().buzzer_enabled);
    assert!(queue.is_empty());
    assert!(r.sink.events.contains(&AppEvent::FlagsChanged(EnableFlags {
        buzzer_enabled: false,
        self_stop_enabled: true,
    })));
}

#[test]
fn switch_bounce_toggles_once() {
    let mut r = rig(60.0);
    let queue = ToggleQueue::new();
    let router = InterruptRouter::new(&queue, DEBOUNCE_MS);

    for t in [1000, 1003, 1011, 1030, 1049] {
        router.on_edge(ToggleEvent::SelfStop, t);
    }
    r.app.drain_toggles(&queue, &mut r.hw, &mut r.store, &mut r.sink, 1100);
    assert!(!r.app.controller().flags().self_stop_enabled);
}

#[test]
fn presses_between_drains_coalesce() {
    let mut r = rig(60.0);
    let queue = ToggleQueue::new();
    let router = InterruptRouter::new(&queue, DEBOUNCE_MS);

    router.on_edge(ToggleEvent::Buzzer, 0);
    router.on_edge(ToggleEvent::Buzzer, 200);
    router.on_edge(ToggleEvent::SelfStop, 210);
    let applied = r.app.drain_toggles(&queue, &mut r.hw, &mut r.store, &mut r.sink, 300);

    assert_eq!(applied, 2);
    assert_eq!(
        r.app.controller().flags(),
        EnableFlags { buzzer_enabled: false, self_stop_enabled: false }
    );
}

#[test]
fn disabling_buzzer_silences_it_immediately() {
    let mut r = rig(28.0);
    r.app.tick(&mut r.hw, &mut r.sink, 0);
    assert!(r.hw.buzzer);

    r.app.handle_command(AppCommand::ToggleBuzzer, &mut r.hw, &mut r.store, &mut r.sink, 10);
    assert!(!r.hw.buzzer, "output applied without waiting for the next cycle");

    // Stays silent on later cycles even though the level is still high.
    r.app.tick(&mut r.hw, &mut r.sink, 1000);
    assert!(!r.hw.buzzer);
}

#[test]
fn disabling_self_stop_releases_relay() {
    let mut r = rig(26.0);
    r.app.tick(&mut r.hw, &mut r.sink, 0);
    assert!(r.hw.relay);

    r.app.handle_command(AppCommand::ToggleSelfStop, &mut r.hw, &mut r.store, &mut r.sink, 500);
    assert!(!r.hw.relay);
    assert_eq!(r.app.controller().state().relay_on_since, None);
}

#[test]
fn re_enabling_restores_decision_for_current_level() {
    let mut r = rig(26.0);
    r.app.tick(&mut r.hw, &mut r.sink, 0);
    let before = (r.hw.buzzer, r.hw.relay);

    r.app.handle_command(AppCommand::ToggleSelfStop, &mut r.hw, &mut r.store, &mut r.sink, 100);
    r.app.handle_command(AppCommand::ToggleSelfStop, &mut r.hw, &mut r.store, &mut r.sink, 200);

    assert_eq!((r.hw.buzzer, r.hw.relay), before);
    assert_eq!(r.app.controller().flags(), EnableFlags::default());
    assert_eq!(r.store.load(), Ok(EnableFlags::default()));
}

#[test]
fn toggle_pair_inside_relay_margin_keeps_pump_stopped() {
    let mut r = rig(26.0);
    r.app.tick(&mut r.hw, &mut r.sink, 0);
    assert!(r.hw.relay);

    // About 97%: below the stop threshold but above its release point.
    r.hw.set_distance(27.4);
    r.app.tick(&mut r.hw, &mut r.sink, 1000);
    assert!(r.hw.relay);

    r.app.handle_command(AppCommand::ToggleSelfStop, &mut r.hw, &mut r.store, &mut r.sink, 1100);
    assert!(!r.hw.relay);
    r.app.handle_command(AppCommand::ToggleSelfStop, &mut r.hw, &mut r.store, &mut r.sink, 1200);
    assert!(r.hw.relay);
    assert_eq!(r.app.controller().state().relay_on_since, Some(1200));
}

#[test]
fn toggle_pair_inside_buzzer_margin_keeps_alarm() {
    let mut r = rig(28.0);
    r.app.tick(&mut r.hw, &mut r.sink, 0);
    assert!(r.hw.buzzer);

    // About 93%: below the buzzer threshold but above its release point.
    r.hw.set_distance(30.5);
    r.app.tick(&mut r.hw, &mut r.sink, 1000);
    assert!(r.hw.buzzer);

    r.app.handle_command(AppCommand::ToggleBuzzer, &mut r.hw, &mut r.store, &mut r.sink, 1100);
    r.app.handle_command(AppCommand::ToggleBuzzer, &mut r.hw, &mut r.store, &mut r.sink, 1200);
    assert!(r.hw.buzzer);
}

#[test]
fn every_toggle_is_persisted() {
    let mut r = rig(60.0);
    r.app.handle_command(AppCommand::ToggleBuzzer, &mut r.hw, &mut r.store, &mut r.sink, 0);
    r.app.handle_command(AppCommand::ToggleSelfStop, &mut r.hw, &mut r.store, &mut r.sink, 0);

    assert_eq!(r.store.storage().writes, 2);
    assert_eq!(
        r.store.load(),
        Ok(EnableFlags { buzzer_enabled: false, self_stop_enabled: false })
    );
    assert!(!r.app.is_flags_dirty());
}
