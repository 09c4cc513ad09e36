//! Tracker services
//!
//! - AI gateway seam and its Gemini implementation
//! - Reconciliation of fetched concerts with the band library
//! - Filter/sort pipeline
//! - Reminder planning and timers
//! - Band discovery (text, URL, folder)

pub mod band_importer;
pub mod concert_filter;
pub mod folder_scanner;
pub mod gateway;
pub mod gemini_client;
pub mod notifier;
pub mod reconciler;
pub mod reminder_scheduler;

pub use band_importer::{discover_bands, ImportSelection, ImportSource};
pub use concert_filter::{available_countries, filter_concerts};
pub use folder_scanner::scan_band_folders;
pub use gateway::{ConcertGateway, GatewayError};
pub use gemini_client::GeminiClient;
pub use notifier::{LogNotifier, Notification, NotificationPermission, Notifier};
pub use reconciler::{apply_favorites, merge_new_bands, reconcile, FavoriteIndex};
pub use reminder_scheduler::{plan_reminders, PlannedReminder, ReminderScheduler};
