//! Reminder scheduling
//!
//! Every change to the concert collection or to a reminder runs the same
//! idempotent step: cancel every timer, then plan and spawn one timer per
//! concert whose reminder fires strictly in the future. Past fire times are
//! skipped, never fired late.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinHandle;

use gigwatch_common::events::{EventBus, TrackerEvent};

use super::notifier::{Notification, NotificationPermission, Notifier};
use crate::models::Concert;

/// One reminder due in the future
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedReminder {
    pub concert_id: String,
    pub band_name: String,
    pub fire_at: DateTime<Utc>,
    /// Time left until `fire_at`, measured from the planning instant
    pub delay: std::time::Duration,
    pub notification: Notification,
}

fn reminder_notification(concert: &Concert, days: u32) -> Notification {
    let when = if days == 1 {
        "tomorrow".to_string()
    } else {
        format!("in {} days", days)
    };
    Notification {
        title: format!("{} plays {}", concert.band_name, when),
        body: format!(
            "{} at {}, {} ({}) on {}",
            concert.band_name, concert.venue, concert.city, concert.country, concert.date
        ),
    }
}

/// Reminders that should be scheduled at `now`
pub fn plan_reminders(concerts: &[Concert], now: DateTime<Utc>) -> Vec<PlannedReminder> {
    concerts
        .iter()
        .filter_map(|concert| {
            let days = concert.reminder_days?;
            let fire_at = concert.reminder_fire_time()?;
            if fire_at <= now {
                tracing::trace!(concert_id = %concert.id, %fire_at, "Reminder time already passed");
                return None;
            }
            let delay = (fire_at - now).to_std().ok()?;
            Some(PlannedReminder {
                concert_id: concert.id.clone(),
                band_name: concert.band_name.clone(),
                fire_at,
                delay,
                notification: reminder_notification(concert, days),
            })
        })
        .collect()
}

/// Owns the live reminder timers, keyed by concert id
///
/// Must be used from within a tokio runtime. Dropping the scheduler aborts
/// every timer.
pub struct ReminderScheduler {
    notifier: Arc<dyn Notifier>,
    event_bus: Option<EventBus>,
    timers: HashMap<String, JoinHandle<()>>,
}

impl ReminderScheduler {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            notifier,
            event_bus: None,
            timers: HashMap::new(),
        }
    }

    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    /// Cancel all timers and schedule afresh against the current time
    pub fn reschedule(&mut self, concerts: &[Concert]) -> usize {
        self.reschedule_at(concerts, gigwatch_common::time::now())
    }

    /// Cancel all timers and schedule afresh, planning relative to `now`
    ///
    /// Returns the number of live timers.
    pub fn reschedule_at(&mut self, concerts: &[Concert], now: DateTime<Utc>) -> usize {
        self.cancel_all();

        if self.notifier.permission() != NotificationPermission::Granted {
            tracing::debug!("Notification permission not granted, no reminders scheduled");
            return 0;
        }

        for reminder in plan_reminders(concerts, now) {
            let notifier = Arc::clone(&self.notifier);
            let event_bus = self.event_bus.clone();
            let concert_id = reminder.concert_id.clone();

            tracing::debug!(
                concert_id = %reminder.concert_id,
                fire_at = %reminder.fire_at,
                "Scheduling reminder"
            );

            let handle = tokio::spawn(async move {
                tokio::time::sleep(reminder.delay).await;
                notifier.notify(&reminder.notification);
                if let Some(bus) = event_bus {
                    bus.emit_lossy(TrackerEvent::ReminderFired {
                        concert_id: reminder.concert_id,
                        band_name: reminder.band_name,
                        timestamp: gigwatch_common::time::now(),
                    });
                }
            });

            // Ids are unique per collection; a leftover handle is still aborted
            if let Some(previous) = self.timers.insert(concert_id, handle) {
                previous.abort();
            }
        }

        let scheduled = self.timers.len();
        if let Some(bus) = &self.event_bus {
            bus.emit_lossy(TrackerEvent::RemindersScheduled {
                scheduled,
                timestamp: now,
            });
        }
        tracing::info!(scheduled, "Reminders rescheduled");
        scheduled
    }

    /// Abort every live timer
    pub fn cancel_all(&mut self) {
        for (_, handle) in self.timers.drain() {
            handle.abort();
        }
    }

    /// Number of timers that have not fired yet
    pub fn scheduled_count(&self) -> usize {
        self.timers.values().filter(|handle| !handle.is_finished()).count()
    }

    pub fn is_scheduled(&self, concert_id: &str) -> bool {
        self.timers
            .get(concert_id)
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for ReminderScheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
