//! # gigwatch Common Library
//!
//! Shared code for the gigwatch binaries:
//! - Error and result types
//! - Configuration loading and root folder resolution
//! - Event types (TrackerEvent enum) and the EventBus
//! - Time and UUID utilities

pub mod config;
pub mod error;
pub mod events;
pub mod time;
pub mod uuid_utils;

pub use error::{Error, Result};
