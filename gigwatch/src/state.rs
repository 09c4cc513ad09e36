//! Tracker state and its pure transitions
//!
//! [`TrackerState`] is an immutable snapshot. [`reduce`] maps a snapshot and
//! an [`Action`] to the next snapshot plus the [`Effects`] the caller must
//! run (persistence, reminder rescheduling). Nothing here performs I/O.

use crate::error::{TrackerError, TrackerResult};
use crate::models::{
    validate_reminder_days, Band, BandKey, Concert, ConcertFilter, RawConcert, StatusFilter,
};
use crate::services::{apply_favorites, merge_new_bands, reconcile};

/// Class of the error shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Blocking: fix configuration first
    Configuration,
    /// Dismissible: the AI service failed, data was kept
    Upstream,
}

/// Error indicator held in state until dismissed or a refresh succeeds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorIndicator {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&TrackerError> for ErrorIndicator {
    fn from(err: &TrackerError) -> Self {
        let kind = if err.is_configuration() {
            ErrorKind::Configuration
        } else {
            ErrorKind::Upstream
        };
        Self {
            kind,
            message: err.to_string(),
        }
    }
}

/// Snapshot of everything the user sees
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackerState {
    pub bands: Vec<Band>,
    pub concerts: Vec<Concert>,
    pub filter: ConcertFilter,
    /// A refresh is in flight
    pub loading: bool,
    pub error: Option<ErrorIndicator>,
}

impl TrackerState {
    pub fn new(bands: Vec<Band>, concerts: Vec<Concert>) -> Self {
        Self {
            bands,
            concerts,
            ..Self::default()
        }
    }

    pub fn band(&self, name: &str) -> Option<&Band> {
        let key = BandKey::new(name);
        self.bands.iter().find(|band| band.key() == key)
    }

    pub fn concert(&self, concert_id: &str) -> Option<&Concert> {
        self.concerts.iter().find(|concert| concert.id == concert_id)
    }

    pub fn band_names(&self) -> Vec<String> {
        self.bands.iter().map(|band| band.name.clone()).collect()
    }
}

/// State transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    AddBand(String),
    /// Bulk import; one transition however many names are added
    AddBands(Vec<String>),
    RemoveBand(String),
    ToggleFavorite(String),
    SetStatusFilter(StatusFilter),
    /// Empty string means any country
    SetCountryFilter(String),
    RefreshStarted,
    RefreshSucceeded(Vec<RawConcert>),
    RefreshFailed(ErrorIndicator),
    DismissError,
    /// `None` clears the reminder
    SetReminder {
        concert_id: String,
        days: Option<u32>,
    },
    TogglePurchased {
        concert_id: String,
    },
}

/// Side effects requested by a transition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Effects {
    pub persist_bands: bool,
    pub persist_concerts: bool,
    pub reschedule: bool,
}

impl Effects {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::none()
    }
}

/// Result of a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: TrackerState,
    pub effects: Effects,
}

impl Transition {
    fn unchanged(state: &TrackerState) -> Self {
        Self {
            state: state.clone(),
            effects: Effects::none(),
        }
    }
}

fn band_not_found(name: &str) -> TrackerError {
    TrackerError::NotFound(format!("Band '{}' is not in the library", name.trim()))
}

fn concert_not_found(concert_id: &str) -> TrackerError {
    TrackerError::NotFound(format!("Concert '{}' does not exist", concert_id))
}

/// Apply one action to a snapshot
pub fn reduce(state: &TrackerState, action: Action) -> TrackerResult<Transition> {
    match action {
        Action::AddBand(name) => Ok(add_bands(state, &[name])),
        Action::AddBands(names) => Ok(add_bands(state, &names)),

        Action::RemoveBand(name) => {
            let key = BandKey::new(&name);
            if !state.bands.iter().any(|band| band.key() == key) {
                return Err(band_not_found(&name));
            }

            let bands: Vec<Band> = state.bands.iter().filter(|b| b.key() != key).cloned().collect();
            let concerts: Vec<Concert> = state
                .concerts
                .iter()
                .filter(|c| c.band_key() != key)
                .cloned()
                .collect();
            let concerts_changed = concerts.len() != state.concerts.len();

            Ok(Transition {
                state: TrackerState {
                    bands,
                    concerts,
                    ..state.clone()
                },
                effects: Effects {
                    persist_bands: true,
                    persist_concerts: concerts_changed,
                    reschedule: concerts_changed,
                },
            })
        }

        Action::ToggleFavorite(name) => {
            let key = BandKey::new(&name);
            if !state.bands.iter().any(|band| band.key() == key) {
                return Err(band_not_found(&name));
            }

            let bands: Vec<Band> = state
                .bands
                .iter()
                .map(|band| {
                    if band.key() == key {
                        Band {
                            is_favorite: !band.is_favorite,
                            ..band.clone()
                        }
                    } else {
                        band.clone()
                    }
                })
                .collect();
            let concerts = apply_favorites(&bands, &state.concerts);

            Ok(Transition {
                state: TrackerState {
                    bands,
                    concerts,
                    ..state.clone()
                },
                effects: Effects {
                    persist_bands: true,
                    persist_concerts: true,
                    reschedule: false,
                },
            })
        }

        Action::SetStatusFilter(status) => {
            let mut next = state.clone();
            next.filter.status = status;
            Ok(Transition {
                state: next,
                effects: Effects::none(),
            })
        }

        Action::SetCountryFilter(country) => {
            let mut next = state.clone();
            next.filter.set_country(country);
            Ok(Transition {
                state: next,
                effects: Effects::none(),
            })
        }

        Action::RefreshStarted => Ok(Transition {
            state: TrackerState {
                loading: true,
                error: None,
                ..state.clone()
            },
            effects: Effects::none(),
        }),

        Action::RefreshSucceeded(raw) => {
            let concerts = reconcile(&state.bands, raw, &state.concerts);
            Ok(Transition {
                state: TrackerState {
                    concerts,
                    loading: false,
                    error: None,
                    ..state.clone()
                },
                effects: Effects {
                    persist_bands: false,
                    persist_concerts: true,
                    reschedule: true,
                },
            })
        }

        // Concerts are left exactly as they were
        Action::RefreshFailed(indicator) => Ok(Transition {
            state: TrackerState {
                loading: false,
                error: Some(indicator),
                ..state.clone()
            },
            effects: Effects::none(),
        }),

        Action::DismissError => Ok(Transition {
            state: TrackerState {
                error: None,
                ..state.clone()
            },
            effects: Effects::none(),
        }),

        Action::SetReminder { concert_id, days } => {
            let days = days.map(validate_reminder_days).transpose()?;
            update_concert(state, &concert_id, |concert| concert.reminder_days = days).map(
                |state| Transition {
                    state,
                    effects: Effects {
                        persist_bands: false,
                        persist_concerts: true,
                        reschedule: true,
                    },
                },
            )
        }

        Action::TogglePurchased { concert_id } => update_concert(state, &concert_id, |concert| {
            concert.ticket_purchased = !concert.ticket_purchased
        })
        .map(|state| Transition {
            state,
            effects: Effects {
                persist_bands: false,
                persist_concerts: true,
                reschedule: false,
            },
        }),
    }
}

fn add_bands<S: AsRef<str>>(state: &TrackerState, names: &[S]) -> Transition {
    let bands = merge_new_bands(&state.bands, names);
    if bands.len() == state.bands.len() {
        return Transition::unchanged(state);
    }

    Transition {
        state: TrackerState {
            bands,
            ..state.clone()
        },
        effects: Effects {
            persist_bands: true,
            persist_concerts: false,
            reschedule: false,
        },
    }
}

fn update_concert(
    state: &TrackerState,
    concert_id: &str,
    update: impl FnOnce(&mut Concert),
) -> TrackerResult<TrackerState> {
    let index = state
        .concerts
        .iter()
        .position(|concert| concert.id == concert_id)
        .ok_or_else(|| concert_not_found(concert_id))?;

    let mut next = state.clone();
    update(&mut next.concerts[index]);
    Ok(next)
}
