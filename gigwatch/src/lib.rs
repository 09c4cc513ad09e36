//! gigwatch library interface
//!
//! Concert tracker: a band library with favorites, AI-discovered concerts,
//! reconciliation, filtering, reminders and ticket tracking.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
pub mod tracker;

pub use crate::error::{TrackerError, TrackerResult};
pub use crate::state::{reduce, Action, Effects, ErrorIndicator, ErrorKind, TrackerState, Transition};
pub use crate::tracker::{RefreshOutcome, Tracker};
