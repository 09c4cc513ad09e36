//! Tracker controller
//!
//! Owns the current [`TrackerState`] and runs the effects each transition
//! asks for: persistence through [`LibraryStore`], reminder rescheduling and
//! event emission. All state changes go through [`reduce`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use gigwatch_common::events::{EventBus, TrackerEvent};
use gigwatch_common::time;
use tracing::{debug, info, warn};

use crate::db::LibraryStore;
use crate::error::{TrackerError, TrackerResult};
use crate::models::{seed_bands, Concert, StatusFilter};
use crate::services::{
    apply_favorites, available_countries, discover_bands, filter_concerts, ConcertGateway,
    ImportSelection, ImportSource, ReminderScheduler,
};
use crate::state::{reduce, Action, Effects, ErrorIndicator, TrackerState, Transition};

/// What a refresh produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Concerts replaced with `count` reconciled records
    Updated { count: usize },
    /// The AI service found no concerts
    Empty,
    /// Library is empty; concerts cleared without a fetch
    NoBands,
}

pub struct Tracker {
    state: TrackerState,
    store: LibraryStore,
    gateway: Arc<dyn ConcertGateway>,
    scheduler: Option<ReminderScheduler>,
    event_bus: EventBus,
}

impl Tracker {
    /// Load bands and concerts from the store
    ///
    /// First start (no stored bands) seeds the library and persists it.
    pub async fn load(
        store: LibraryStore,
        gateway: Arc<dyn ConcertGateway>,
        event_bus: EventBus,
    ) -> TrackerResult<Self> {
        let bands = match store.load_bands().await? {
            Some(bands) => bands,
            None => {
                let bands = seed_bands();
                info!(count = bands.len(), "No stored library, seeding default bands");
                if let Err(e) = store.save_bands(&bands).await {
                    warn!("Failed to persist seed bands: {}", e);
                }
                bands
            }
        };

        let concerts = apply_favorites(&bands, &store.load_concerts().await?);
        info!(
            bands = bands.len(),
            concerts = concerts.len(),
            "Tracker state loaded"
        );

        Ok(Self {
            state: TrackerState::new(bands, concerts),
            store,
            gateway,
            scheduler: None,
            event_bus,
        })
    }

    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Install the reminder scheduler and plan reminders for current concerts
    pub fn attach_scheduler(&mut self, scheduler: ReminderScheduler) -> usize {
        let scheduler = self.scheduler.insert(scheduler);
        scheduler.reschedule(&self.state.concerts)
    }

    pub fn scheduler(&self) -> Option<&ReminderScheduler> {
        self.scheduler.as_ref()
    }

    /// Apply an action and run its effects
    ///
    /// A rejected action leaves state untouched. Persistence failures are
    /// logged; the new state is kept.
    pub async fn dispatch(&mut self, action: Action) -> TrackerResult<Effects> {
        let Transition { state, effects } = reduce(&self.state, action)?;
        self.state = state;
        self.run_effects(effects).await;
        Ok(effects)
    }

    async fn run_effects(&mut self, effects: Effects) {
        if effects.persist_bands {
            if let Err(e) = self.store.save_bands(&self.state.bands).await {
                warn!("Failed to persist bands: {}", e);
            }
            self.event_bus.emit_lossy(TrackerEvent::BandsChanged {
                band_count: self.state.bands.len(),
                timestamp: time::now(),
            });
        }

        if effects.persist_concerts {
            if let Err(e) = self.store.save_concerts(&self.state.concerts).await {
                warn!("Failed to persist concerts: {}", e);
            }
        }

        if effects.reschedule {
            match self.scheduler.as_mut() {
                Some(scheduler) => {
                    scheduler.reschedule(&self.state.concerts);
                }
                None => debug!("No reminder scheduler attached"),
            }
        }
    }

    /// Pick up library changes another process wrote to the store
    ///
    /// Returns `true` when stored bands or concerts differed from memory; the
    /// state is replaced and reminders are replanned. Filter, loading flag
    /// and error indicator are kept.
    pub async fn reload(&mut self) -> TrackerResult<bool> {
        let Some(bands) = self.store.load_bands().await? else {
            return Ok(false);
        };
        let concerts = apply_favorites(&bands, &self.store.load_concerts().await?);

        if bands == self.state.bands && concerts == self.state.concerts {
            return Ok(false);
        }

        debug!(
            bands = bands.len(),
            concerts = concerts.len(),
            "Stored library changed, reloading"
        );
        self.state.bands = bands;
        self.state.concerts = concerts;
        self.run_effects(Effects {
            reschedule: true,
            ..Effects::default()
        })
        .await;
        Ok(true)
    }

    /// Fetch concerts for every band and reconcile them into state
    ///
    /// On failure the previous concerts are kept, the error indicator is set
    /// and the error is returned.
    pub async fn refresh(&mut self) -> TrackerResult<RefreshOutcome> {
        if self.state.bands.is_empty() {
            info!("Library is empty, clearing concerts");
            self.dispatch(Action::RefreshSucceeded(Vec::new())).await?;
            return Ok(RefreshOutcome::NoBands);
        }

        self.dispatch(Action::RefreshStarted).await?;
        let names = self.state.band_names();
        info!(bands = names.len(), "Refreshing concerts");

        match self.gateway.fetch_concerts(&names).await {
            Ok(raw) => {
                let fetched = raw.len();
                self.dispatch(Action::RefreshSucceeded(raw)).await?;
                let count = self.state.concerts.len();
                info!(fetched, count, "Concerts refreshed");

                self.event_bus.emit_lossy(TrackerEvent::ConcertsRefreshed {
                    concert_count: count,
                    timestamp: time::now(),
                });

                Ok(if count == 0 {
                    RefreshOutcome::Empty
                } else {
                    RefreshOutcome::Updated { count }
                })
            }
            Err(e) => {
                let err = TrackerError::from(e);
                warn!("Concert refresh failed: {}", err);

                self.dispatch(Action::RefreshFailed(ErrorIndicator::from(&err)))
                    .await?;
                self.event_bus.emit_lossy(TrackerEvent::RefreshFailed {
                    message: err.to_string(),
                    timestamp: time::now(),
                });
                Err(err)
            }
        }
    }

    /// Returns `true` when the band was new
    pub async fn add_band(&mut self, name: &str) -> TrackerResult<bool> {
        let effects = self.dispatch(Action::AddBand(name.to_string())).await?;
        Ok(effects.persist_bands)
    }

    /// Returns the number of bands actually added
    pub async fn add_bands(&mut self, names: Vec<String>) -> TrackerResult<usize> {
        let before = self.state.bands.len();
        self.dispatch(Action::AddBands(names)).await?;
        Ok(self.state.bands.len() - before)
    }

    pub async fn remove_band(&mut self, name: &str) -> TrackerResult<()> {
        self.dispatch(Action::RemoveBand(name.to_string())).await?;
        Ok(())
    }

    /// Returns the band's new favorite flag
    pub async fn toggle_favorite(&mut self, name: &str) -> TrackerResult<bool> {
        self.dispatch(Action::ToggleFavorite(name.to_string())).await?;
        self.state
            .band(name)
            .map(|band| band.is_favorite)
            .ok_or_else(|| TrackerError::NotFound(format!("Band '{}' is not in the library", name)))
    }

    pub async fn set_reminder(&mut self, concert_id: &str, days: Option<u32>) -> TrackerResult<()> {
        self.dispatch(Action::SetReminder {
            concert_id: concert_id.to_string(),
            days,
        })
        .await?;
        Ok(())
    }

    /// Returns the concert's new purchased flag
    pub async fn toggle_purchased(&mut self, concert_id: &str) -> TrackerResult<bool> {
        self.dispatch(Action::TogglePurchased {
            concert_id: concert_id.to_string(),
        })
        .await?;
        self.state
            .concert(concert_id)
            .map(|concert| concert.ticket_purchased)
            .ok_or_else(|| TrackerError::NotFound(format!("Concert '{}' does not exist", concert_id)))
    }

    pub async fn set_status_filter(&mut self, status: StatusFilter) -> TrackerResult<()> {
        self.dispatch(Action::SetStatusFilter(status)).await?;
        Ok(())
    }

    pub async fn set_country_filter(&mut self, country: &str) -> TrackerResult<()> {
        self.dispatch(Action::SetCountryFilter(country.to_string())).await?;
        Ok(())
    }

    pub async fn dismiss_error(&mut self) -> TrackerResult<()> {
        self.dispatch(Action::DismissError).await?;
        Ok(())
    }

    /// Find candidate bands; nothing is added until [`Self::import_selection`]
    pub async fn discover_bands(&self, source: &ImportSource) -> TrackerResult<ImportSelection> {
        discover_bands(self.gateway.as_ref(), source).await
    }

    /// Add the selected names; returns how many were new
    pub async fn import_selection(&mut self, selection: &ImportSelection) -> TrackerResult<usize> {
        let names = selection.selected_names();
        if names.is_empty() {
            return Ok(0);
        }
        let added = self.add_bands(names).await?;
        info!(added, selected = selection.selected_count(), "Imported bands");
        Ok(added)
    }

    /// Concerts passing the current filter, sorted by date
    pub fn visible_concerts(&self, now: DateTime<Utc>) -> Vec<&Concert> {
        filter_concerts(&self.state.concerts, &self.state.filter, now)
    }

    pub fn countries(&self) -> Vec<String> {
        available_countries(&self.state.concerts)
    }

    /// Cancel pending reminders
    pub fn shutdown(&mut self) {
        if let Some(scheduler) = self.scheduler.as_mut() {
            scheduler.cancel_all();
        }
        info!("Tracker shut down");
    }
}
