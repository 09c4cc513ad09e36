//! Domain models: bands, concerts and filter criteria

pub mod band;
pub mod concert;
pub mod filter;

pub use band::{distinct_names, seed_bands, Band, BandKey};
pub use concert::{
    validate_reminder_days, Concert, ConcertIdentity, RawConcert, REMINDER_DAY_OPTIONS,
};
pub use filter::{ConcertFilter, StatusFilter};
