//! Reconciliation of fetched concerts with the local band library
//!
//! Every function here is pure: it takes snapshots and returns new
//! collections, leaving persistence to the caller.

use std::collections::{HashMap, HashSet};

use gigwatch_common::uuid_utils;

use crate::models::{distinct_names, Band, BandKey, Concert, ConcertIdentity, RawConcert};

/// Favorite flag per canonical band key
///
/// The first band with a given key wins, matching a front-to-back search of
/// the library.
#[derive(Debug, Clone, Default)]
pub struct FavoriteIndex {
    favorites: HashMap<BandKey, bool>,
}

impl FavoriteIndex {
    pub fn from_bands(bands: &[Band]) -> Self {
        let mut favorites = HashMap::with_capacity(bands.len());
        for band in bands {
            favorites.entry(band.key()).or_insert(band.is_favorite);
        }
        Self { favorites }
    }

    /// False for bands that are not in the library
    pub fn is_favorite(&self, key: &BandKey) -> bool {
        self.favorites.get(key).copied().unwrap_or(false)
    }
}

/// Turn fetched records into the new concert collection
///
/// - `is_favorite` comes from the band library (false for unknown bands)
/// - ids: the source id, else the id of the matching previous concert, else
///   a fresh UUID; ids are unique within the result
/// - `reminder_days` and `ticket_purchased` carry over from the previous
///   concert matched by id, then by band key + date
pub fn reconcile(bands: &[Band], raw: Vec<RawConcert>, previous: &[Concert]) -> Vec<Concert> {
    let favorites = FavoriteIndex::from_bands(bands);

    let previous_by_id: HashMap<&str, &Concert> =
        previous.iter().map(|c| (c.id.as_str(), c)).collect();
    let mut previous_by_identity: HashMap<ConcertIdentity, &Concert> = HashMap::new();
    for concert in previous {
        previous_by_identity.entry(concert.identity()).or_insert(concert);
    }

    let mut used_ids: HashSet<String> = HashSet::with_capacity(raw.len());
    let mut claimed: HashSet<&str> = HashSet::with_capacity(previous.len());
    let mut concerts = Vec::with_capacity(raw.len());

    for record in raw {
        let is_favorite = favorites.is_favorite(&record.band_key());

        let unclaimed = |prior: &&Concert| !claimed.contains(prior.id.as_str());
        let matched = record
            .source_id()
            .and_then(|id| previous_by_id.get(id).copied())
            .filter(unclaimed)
            .or_else(|| {
                previous_by_identity
                    .get(&record.identity())
                    .copied()
                    .filter(unclaimed)
            });
        if let Some(prior) = matched {
            claimed.insert(prior.id.as_str());
        }

        let id = [record.source_id(), matched.map(|prior| prior.id.as_str())]
            .into_iter()
            .flatten()
            .find(|id| !used_ids.contains(*id))
            .map(str::to_string)
            .unwrap_or_else(|| fresh_id(&used_ids));
        used_ids.insert(id.clone());

        let mut concert = Concert::from_raw(record, id, is_favorite);
        if let Some(prior) = matched {
            concert.reminder_days = prior.reminder_days;
            concert.ticket_purchased = prior.ticket_purchased;
        }
        concerts.push(concert);
    }

    tracing::debug!(
        concerts = concerts.len(),
        carried = concerts
            .iter()
            .filter(|c| c.reminder_days.is_some() || c.ticket_purchased)
            .count(),
        "Reconciled fetched concerts"
    );

    concerts
}

fn fresh_id(used_ids: &HashSet<String>) -> String {
    loop {
        let id = uuid_utils::generate_string();
        if !used_ids.contains(&id) {
            return id;
        }
    }
}

/// Re-derive `is_favorite` for an existing concert collection
pub fn apply_favorites(bands: &[Band], concerts: &[Concert]) -> Vec<Concert> {
    let favorites = FavoriteIndex::from_bands(bands);
    concerts
        .iter()
        .map(|concert| Concert {
            is_favorite: favorites.is_favorite(&concert.band_key()),
            ..concert.clone()
        })
        .collect()
}

/// Append candidate names missing from the library as non-favorite bands
///
/// Blank names and names already present (under any casing, in the library
/// or earlier in the candidate list) are skipped.
pub fn merge_new_bands<S: AsRef<str>>(bands: &[Band], candidates: &[S]) -> Vec<Band> {
    let existing: HashSet<BandKey> = bands.iter().map(Band::key).collect();

    let additions: Vec<Band> = distinct_names(candidates)
        .into_iter()
        .filter(|name| !existing.contains(&BandKey::new(name)))
        .map(|name| Band::new(&name))
        .collect();

    let mut merged = Vec::with_capacity(bands.len() + additions.len());
    merged.extend_from_slice(bands);
    merged.extend(additions);
    merged
}
