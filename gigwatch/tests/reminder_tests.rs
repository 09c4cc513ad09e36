//! Reminder timer integration tests
//!
//! Timer tests run on a paused tokio clock and drive the scheduler directly.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use gigwatch::models::{Band, Concert};
use gigwatch::services::{NotificationPermission, ReminderScheduler};
use gigwatch_common::events::{EventBus, TrackerEvent};
use gigwatch::Tracker;
use helpers::{raw, store_with_bands, tracker_with, RecordingNotifier, ScriptedGateway};

const DAY: Duration = Duration::from_secs(86_400);

fn concert_in_days(id: &str, days: i64, reminder_days: Option<u32>) -> Concert {
    let date = (Utc::now() + chrono::Duration::days(days)).to_rfc3339();
    let mut concert = Concert::from_raw(raw("Low", &date, "USA"), id.to_string(), false);
    concert.reminder_days = reminder_days;
    concert
}

#[tokio::test(start_paused = true)]
async fn test_reminder_fires_once_at_fire_time() {
    let notifier = Arc::new(RecordingNotifier::new(NotificationPermission::Granted));
    let bus = EventBus::new(16);
    let mut events = bus.subscribe();
    let mut scheduler = ReminderScheduler::new(notifier.clone()).with_event_bus(bus);

    let scheduled = scheduler.reschedule(&[concert_in_days("c1", 10, Some(7))]);
    assert_eq!(scheduled, 1);
    assert!(scheduler.is_scheduled("c1"));

    tokio::time::sleep(2 * DAY).await;
    assert!(notifier.shown().is_empty());

    tokio::time::sleep(DAY + Duration::from_secs(60)).await;
    tokio::task::yield_now().await;

    let shown = notifier.shown();
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].title, "Low plays in 7 days");
    assert!(!scheduler.is_scheduled("c1"));

    assert!(matches!(
        events.recv().await.unwrap(),
        TrackerEvent::RemindersScheduled { scheduled: 1, .. }
    ));
    match events.recv().await.unwrap() {
        TrackerEvent::ReminderFired { concert_id, band_name, .. } => {
            assert_eq!(concert_id, "c1");
            assert_eq!(band_name, "Low");
        }
        other => panic!("unexpected event {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_past_fire_time_schedules_nothing() {
    let notifier = Arc::new(RecordingNotifier::new(NotificationPermission::Granted));
    let mut scheduler = ReminderScheduler::new(notifier.clone());

    assert_eq!(scheduler.reschedule(&[concert_in_days("c1", 3, Some(7))]), 0);

    tokio::time::sleep(10 * DAY).await;
    assert!(notifier.shown().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_reschedule_is_idempotent() {
    let notifier = Arc::new(RecordingNotifier::new(NotificationPermission::Granted));
    let mut scheduler = ReminderScheduler::new(notifier.clone());
    let concerts = vec![
        concert_in_days("c1", 10, Some(1)),
        concert_in_days("c2", 40, Some(30)),
        concert_in_days("c3", 20, None),
    ];

    assert_eq!(scheduler.reschedule(&concerts), 2);
    assert_eq!(scheduler.reschedule(&concerts), 2);
    assert_eq!(scheduler.scheduled_count(), 2);

    tokio::time::sleep(11 * DAY).await;
    tokio::task::yield_now().await;

    assert_eq!(notifier.shown().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_cleared_reminder_never_fires() {
    let notifier = Arc::new(RecordingNotifier::new(NotificationPermission::Granted));
    let mut scheduler = ReminderScheduler::new(notifier.clone());

    let mut concert = concert_in_days("c1", 10, Some(7));
    scheduler.reschedule(std::slice::from_ref(&concert));
    concert.reminder_days = None;
    assert_eq!(scheduler.reschedule(std::slice::from_ref(&concert)), 0);

    tokio::time::sleep(10 * DAY).await;
    assert!(notifier.shown().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_dropping_scheduler_cancels_timers() {
    let notifier = Arc::new(RecordingNotifier::new(NotificationPermission::Granted));
    let mut scheduler = ReminderScheduler::new(notifier.clone());
    scheduler.reschedule(&[concert_in_days("c1", 10, Some(7))]);
    drop(scheduler);

    tokio::time::sleep(10 * DAY).await;
    assert!(notifier.shown().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_without_permission_no_timers() {
    for permission in [NotificationPermission::Denied, NotificationPermission::Default] {
        let notifier = Arc::new(RecordingNotifier::new(permission));
        let mut scheduler = ReminderScheduler::new(notifier.clone());

        assert_eq!(scheduler.reschedule(&[concert_in_days("c1", 10, Some(7))]), 0);

        tokio::time::sleep(10 * DAY).await;
        assert!(notifier.shown().is_empty());
    }
}

#[tokio::test]
async fn test_tracker_reschedules_on_changes() {
    let gateway = Arc::new(ScriptedGateway::new());
    let date = (Utc::now() + chrono::Duration::days(20)).to_rfc3339();
    gateway.push_concerts(vec![raw("Low", &date, "USA")]);
    let mut tracker = tracker_with(&[Band::new("Low")], gateway).await;

    let notifier = Arc::new(RecordingNotifier::new(NotificationPermission::Granted));
    assert_eq!(tracker.attach_scheduler(ReminderScheduler::new(notifier)), 0);

    tracker.refresh().await.unwrap();
    let id = tracker.state().concerts[0].id.clone();

    tracker.set_reminder(&id, Some(15)).await.unwrap();
    assert!(tracker.scheduler().unwrap().is_scheduled(&id));

    tracker.set_reminder(&id, None).await.unwrap();
    assert!(!tracker.scheduler().unwrap().is_scheduled(&id));

    tracker.set_reminder(&id, Some(1)).await.unwrap();
    tracker.remove_band("Low").await.unwrap();
    assert_eq!(tracker.scheduler().unwrap().scheduled_count(), 0);

    tracker.shutdown();
}

#[tokio::test]
async fn test_reload_picks_up_reminders_set_elsewhere() {
    let store = store_with_bands(&[Band::new("Low")]).await;
    let gateway = Arc::new(ScriptedGateway::new());
    let date = (Utc::now() + chrono::Duration::days(20)).to_rfc3339();
    gateway.push_concerts(vec![raw("Low", &date, "USA")]);

    let mut editor = Tracker::load(store.clone(), gateway.clone(), EventBus::new(16)).await.unwrap();
    editor.refresh().await.unwrap();
    let id = editor.state().concerts[0].id.clone();

    let mut watcher = Tracker::load(store.clone(), gateway, EventBus::new(16)).await.unwrap();
    let notifier = Arc::new(RecordingNotifier::new(NotificationPermission::Granted));
    assert_eq!(watcher.attach_scheduler(ReminderScheduler::new(notifier)), 0);
    assert!(!watcher.reload().await.unwrap());

    editor.set_reminder(&id, Some(15)).await.unwrap();
    assert!(!watcher.scheduler().unwrap().is_scheduled(&id));

    assert!(watcher.reload().await.unwrap());
    assert_eq!(watcher.state().concert(&id).unwrap().reminder_days, Some(15));
    assert!(watcher.scheduler().unwrap().is_scheduled(&id));
    assert!(!watcher.reload().await.unwrap());

    editor.remove_band("Low").await.unwrap();
    assert!(watcher.reload().await.unwrap());
    assert!(watcher.state().bands.is_empty());
    assert_eq!(watcher.scheduler().unwrap().scheduled_count(), 0);

    watcher.shutdown();
    editor.shutdown();
}
