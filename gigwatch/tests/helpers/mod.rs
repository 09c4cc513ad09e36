//! Shared fixtures for gigwatch integration tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use gigwatch::db::{init_memory_pool, LibraryStore};
use gigwatch::models::{Band, RawConcert};
use gigwatch::services::{
    ConcertGateway, GatewayError, Notification, NotificationPermission, Notifier,
};
use gigwatch::Tracker;
use gigwatch_common::events::EventBus;

/// Gateway answering from a queue of scripted replies
#[derive(Default)]
pub struct ScriptedGateway {
    concert_replies: Mutex<VecDeque<Result<Vec<RawConcert>, GatewayError>>>,
    text_bands: Vec<String>,
    url_bands: Vec<String>,
    fetch_calls: AtomicUsize,
    last_request: Mutex<Vec<String>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text_bands(mut self, names: &[&str]) -> Self {
        self.text_bands = names.iter().map(|n| n.to_string()).collect();
        self
    }

    pub fn with_url_bands(mut self, names: &[&str]) -> Self {
        self.url_bands = names.iter().map(|n| n.to_string()).collect();
        self
    }

    pub fn push_concerts(&self, concerts: Vec<RawConcert>) {
        self.concert_replies.lock().unwrap().push_back(Ok(concerts));
    }

    pub fn push_error(&self, error: GatewayError) {
        self.concert_replies.lock().unwrap().push_back(Err(error));
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Vec<String> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl ConcertGateway for ScriptedGateway {
    async fn fetch_concerts(&self, band_names: &[String]) -> Result<Vec<RawConcert>, GatewayError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = band_names.to_vec();
        self.concert_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn extract_bands_from_text(&self, _text: &str) -> Result<Vec<String>, GatewayError> {
        Ok(self.text_bands.clone())
    }

    async fn extract_bands_from_url(&self, _url: &str) -> Result<Vec<String>, GatewayError> {
        Ok(self.url_bands.clone())
    }
}

/// Notifier that keeps every notification it is asked to show
pub struct RecordingNotifier {
    permission: NotificationPermission,
    shown: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new(permission: NotificationPermission) -> Self {
        Self {
            permission,
            shown: Mutex::new(Vec::new()),
        }
    }

    pub fn shown(&self) -> Vec<Notification> {
        self.shown.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn permission(&self) -> NotificationPermission {
        self.permission
    }

    fn notify(&self, notification: &Notification) {
        self.shown.lock().unwrap().push(notification.clone());
    }
}

pub fn raw(band: &str, date: &str, country: &str) -> RawConcert {
    RawConcert {
        band_name: band.to_string(),
        date: date.to_string(),
        city: "City".to_string(),
        country: country.to_string(),
        venue: "Hall".to_string(),
        ticket_url: "https://tickets.example/1".to_string(),
        id: None,
    }
}

/// In-memory store preloaded with `bands`
pub async fn store_with_bands(bands: &[Band]) -> LibraryStore {
    let pool = init_memory_pool().await.unwrap();
    let store = LibraryStore::new(pool);
    store.save_bands(bands).await.unwrap();
    store
}

pub async fn tracker_with(bands: &[Band], gateway: Arc<ScriptedGateway>) -> Tracker {
    let store = store_with_bands(bands).await;
    Tracker::load(store, gateway, EventBus::new(100)).await.unwrap()
}
