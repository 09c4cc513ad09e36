//! Notification surface for concert reminders

/// Whether the user allows reminders to be shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationPermission {
    Granted,
    Denied,
    /// Not asked yet
    Default,
}

/// A reminder ready to display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

/// Displays reminders
pub trait Notifier: Send + Sync {
    fn permission(&self) -> NotificationPermission;

    /// Ask for permission; returns the resulting state
    fn request_permission(&self) -> NotificationPermission {
        self.permission()
    }

    fn notify(&self, notification: &Notification);
}

/// Notifier writing reminders to the log and stdout
///
/// Permission comes from the `[notifications] enabled` config switch.
pub struct LogNotifier {
    permission: NotificationPermission,
}

impl LogNotifier {
    pub fn new(permission: NotificationPermission) -> Self {
        Self { permission }
    }

    pub fn from_config(enabled: bool) -> Self {
        Self::new(if enabled {
            NotificationPermission::Granted
        } else {
            NotificationPermission::Denied
        })
    }
}

impl Notifier for LogNotifier {
    fn permission(&self) -> NotificationPermission {
        self.permission
    }

    fn notify(&self, notification: &Notification) {
        tracing::info!(title = %notification.title, "Reminder: {}", notification.body);
        println!("🔔 {}\n   {}", notification.title, notification.body);
    }
}
