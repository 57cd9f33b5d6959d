//! Boot-time flag loading and save-failure handling.

use super::mock_hw::{MockFlagStore, MockHardware, MockStorage, RecordingSink};

use tankwatch::app::commands::AppCommand;
use tankwatch::app::events::AppEvent;
use tankwatch::app::ports::FlagStore;
use tankwatch::app::service::AppService;
use tankwatch::config::SystemConfig;
use tankwatch::control::EnableFlags;
use tankwatch::error::PersistenceError;
use tankwatch::safety::StatusFault;
use tankwatch::storage::{FLAGS_KEY, FLAGS_NAMESPACE};

#[test]
fn first_boot_uses_defaults_and_requests_save() {
    let store = MockFlagStore::new(MockStorage::default());
    let (flags, boot_save) = AppService::load_flags(&store);
    assert_eq!(flags, EnableFlags::default());
    assert!(boot_save);
}

#[test]
fn stored_flags_survive_restart() {
    let mut store = MockFlagStore::new(MockStorage::default());
    let saved = EnableFlags { buzzer_enabled: false, self_stop_enabled: true };
    store.save(&saved).unwrap();

    let (flags, boot_save) = AppService::load_flags(&store);
    assert_eq!(flags, saved);
    assert!(!boot_save);

    let app = AppService::new(SystemConfig::default(), flags).unwrap();
    assert!(!app.snapshot().buzzer_enabled);
}

#[test]
fn corrupt_record_falls_back_to_defaults() {
    let store = MockFlagStore::new(MockStorage::with_raw(FLAGS_NAMESPACE, FLAGS_KEY, &[9, 9]));
    assert_eq!(store.load(), Err(PersistenceError::Corrupted));

    let (flags, boot_save) = AppService::load_flags(&store);
    assert_eq!(flags, EnableFlags::default());
    assert!(boot_save);
}

#[test]
fn boot_save_writes_defaults_back() {
    let mut store = MockFlagStore::new(MockStorage::default());
    let mut sink = RecordingSink::new();
    let (flags, boot_save) = AppService::load_flags(&store);
    let mut app = AppService::new(SystemConfig::default(), flags).unwrap();
    assert!(boot_save);

    app.mark_flags_dirty();
    assert!(app.force_save_if_dirty(&mut store, &mut sink));
    assert_eq!(store.load(), Ok(EnableFlags::default()));
}

#[test]
fn failed_save_keeps_toggle_and_marks_dirty() {
    let mut store = MockFlagStore::new(MockStorage { fail_writes: true, ..Default::default() });
    let mut hw = MockHardware::at_distance(60.0);
    let mut sink = RecordingSink::new();
    let mut app = AppService::new(SystemConfig::default(), EnableFlags::default()).unwrap();

    app.handle_command(AppCommand::ToggleBuzzer, &mut hw, &mut store, &mut sink, 0);

    assert!(!app.controller().flags().buzzer_enabled, "toggle applies in RAM");
    assert!(app.is_flags_dirty());
    assert!(sink.events.contains(&AppEvent::PersistFailed(PersistenceError::IoError)));

    let snap = app.tick(&mut hw, &mut sink, 1000);
    assert!(snap.status_flags & StatusFault::PersistencePending.mask() != 0);
}

#[test]
fn flush_retries_pending_save() {
    let mut store = MockFlagStore::new(MockStorage { fail_writes: true, ..Default::default() });
    let mut hw = MockHardware::at_distance(60.0);
    let mut sink = RecordingSink::new();
    let mut app = AppService::new(SystemConfig::default(), EnableFlags::default()).unwrap();

    app.handle_command(AppCommand::ToggleSelfStop, &mut hw, &mut store, &mut sink, 0);
    assert!(app.is_flags_dirty());

    store.storage_mut().fail_writes = false;
    app.handle_command(AppCommand::FlushFlags, &mut hw, &mut store, &mut sink, 10);

    assert!(!app.is_flags_dirty());
    assert_eq!(
        store.load(),
        Ok(EnableFlags { buzzer_enabled: true, self_stop_enabled: false })
    );
}

#[test]
fn flush_without_changes_does_not_write() {
    let mut store = MockFlagStore::new(MockStorage::default());
    let mut hw = MockHardware::at_distance(60.0);
    let mut sink = RecordingSink::new();
    let mut app = AppService::new(SystemConfig::default(), EnableFlags::default()).unwrap();

    app.handle_command(AppCommand::FlushFlags, &mut hw, &mut store, &mut sink, 0);
    assert_eq!(store.storage().writes, 0);
}
