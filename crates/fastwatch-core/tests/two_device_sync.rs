//! End-to-end sync between two simulated devices.
//!
//! Each device owns a real store, mutation service, and ingress; the only
//! link between them is the in-memory hub standing in for the platform data
//! layer. Tests drain inboxes explicitly, so batching, reordering, and
//! duplicate delivery are all driven from here.

use std::sync::Arc;
use std::time::Duration;

use fastwatch_core::sync::HubEndpoint;
use fastwatch_core::{
    CommandOutcome, InMemoryWorkQueue, MutationService, NoopHooks, NotificationScheduler,
    RemoteChannel, SessionStore, SyncCommand, SyncHub, SyncIngress, TransitionEngine,
    TransitionKind,
};

struct Device {
    store: Arc<SessionStore>,
    service: MutationService,
    ingress: SyncIngress,
    endpoint: Arc<HubEndpoint>,
    queue: Arc<InMemoryWorkQueue>,
}

fn device(hub: &SyncHub, id: &str) -> Device {
    let store = Arc::new(SessionStore::open_memory().unwrap());
    let queue = Arc::new(InMemoryWorkQueue::new());
    let endpoint = Arc::new(hub.endpoint(id));
    let engine = Arc::new(TransitionEngine::new(
        store.clone(),
        NotificationScheduler::new(queue.clone()),
        Box::new(NoopHooks),
    ));
    let service = MutationService::new(store.clone(), endpoint.clone(), engine.clone());
    let ingress = SyncIngress::new(store.clone(), engine, Some(id.to_string()));
    Device {
        store,
        service,
        ingress,
        endpoint,
        queue,
    }
}

impl Device {
    /// Deliver everything queued for this device as one batch.
    fn pump(&self) -> Option<TransitionKind> {
        let batch = self.endpoint.drain_changes();
        self.ingress.apply_batch(&batch).map(|t| t.kind())
    }
}

/// Writes on the same device must get strictly increasing timestamps, and
/// cross-device tests below rely on distinct clocks; a short pause keeps the
/// two devices' wall clocks from colliding on the same millisecond.
fn tick() {
    std::thread::sleep(Duration::from_millis(5));
}

#[test]
fn start_propagates_to_companion() {
    let hub = SyncHub::new();
    let phone = device(&hub, "phone");
    let watch = device(&hub, "watch");

    phone.service.start_fasting("16:8").unwrap();
    assert_eq!(watch.pump(), Some(TransitionKind::Started));

    assert_eq!(watch.store.read(), phone.store.read());
    assert!(watch.store.read().is_fasting);
    // The companion schedules its own goal alarms from the synced snapshot.
    assert_eq!(watch.queue.pending_count(), 2);
}

#[test]
fn full_cycle_records_history_on_both_devices() {
    let hub = SyncHub::new();
    let phone = device(&hub, "phone");
    let watch = device(&hub, "watch");

    phone.service.start_fasting("16:8").unwrap();
    watch.pump();
    tick();

    watch.service.stop_fasting().unwrap();
    assert_eq!(phone.pump(), Some(TransitionKind::Stopped));

    let phone_history = phone.store.history_all().unwrap();
    let watch_history = watch.store.history_all().unwrap();
    assert_eq!(phone_history.len(), 1);
    assert_eq!(watch_history.len(), 1);
    assert_eq!(
        phone_history[0].start_time_epoch_ms,
        watch_history[0].start_time_epoch_ms
    );
    assert!(!phone.store.read().is_fasting);
    assert_eq!(phone.queue.pending_count(), 0);
}

#[test]
fn batched_start_and_stop_applies_only_the_newest() {
    let hub = SyncHub::new();
    let phone = device(&hub, "phone");
    let watch = device(&hub, "watch");

    // The watch is offline while the phone starts and stops a fast.
    phone.service.start_fasting("16:8").unwrap();
    tick();
    phone.service.stop_fasting().unwrap();

    // Both events arrive in one batch; only the stop snapshot applies, and
    // since the watch never saw the active state this is not a completion.
    assert_eq!(watch.pump(), Some(TransitionKind::UpdatedInactive));
    assert_eq!(watch.store.read(), phone.store.read());
    assert!(watch.store.history_all().unwrap().is_empty());
    assert_eq!(phone.store.history_all().unwrap().len(), 1);
}

#[test]
fn duplicate_delivery_is_rejected_as_stale() {
    let hub = SyncHub::new();
    let phone = device(&hub, "phone");
    let watch = device(&hub, "watch");

    phone.service.start_fasting("16:8").unwrap();
    tick();
    phone.service.stop_fasting().unwrap();

    watch.pump();
    let first_count = watch.store.history_all().unwrap().len();

    // The transport redelivers an old batch: everything is at or below the
    // high-water mark now, so nothing reapplies.
    phone.service.sync_current_state().unwrap();
    let replay = watch.endpoint.drain_changes();
    assert!(watch.ingress.apply_batch(&replay).is_some());
    assert!(watch.ingress.apply_batch(&replay).is_none());

    assert_eq!(watch.store.history_all().unwrap().len(), first_count);
}

#[test]
fn conflicting_starts_converge_to_the_newest_writer() {
    let hub = SyncHub::new();
    let phone = device(&hub, "phone");
    let watch = device(&hub, "watch");

    phone.service.start_fasting("16:8").unwrap();
    tick();
    watch.service.start_fasting("18:6").unwrap();

    // Cross-deliver. The watch wrote later, so its goal wins on both sides.
    phone.pump();
    watch.pump();

    assert_eq!(phone.store.read(), watch.store.read());
    assert_eq!(phone.store.read().goal_id, "18:6");
    assert!(phone.store.read().is_fasting);
}

#[test]
fn manual_sync_recovers_a_missed_publish() {
    let hub = SyncHub::new();
    let phone = device(&hub, "phone");
    let watch = device(&hub, "watch");

    phone.service.start_fasting("16:8").unwrap();
    // The publish is lost in transit.
    watch.endpoint.drain_changes();
    assert!(!watch.store.read().is_fasting);

    tick();
    phone.service.sync_current_state().unwrap();
    assert_eq!(watch.pump(), Some(TransitionKind::Started));
    assert!(watch.store.read().is_fasting);
    assert_eq!(watch.store.read().start_time, phone.store.read().start_time);
}

#[test]
fn watch_button_commands_the_phone() {
    let hub = SyncHub::new();
    let phone = device(&hub, "phone");
    let watch = device(&hub, "watch");

    watch
        .endpoint
        .send_command(&SyncCommand::StartFasting { start_time_ms: 4242 })
        .unwrap();

    for command in phone.endpoint.drain_commands() {
        let outcome = phone.service.handle_command(command.unwrap()).unwrap();
        assert!(matches!(outcome, CommandOutcome::Applied(_)));
    }

    assert!(phone.store.read().is_fasting);
    assert_eq!(phone.store.read().start_time, 4242);

    // The command handler's own publish brings the watch in line.
    watch.pump();
    assert_eq!(watch.store.read(), phone.store.read());
}
