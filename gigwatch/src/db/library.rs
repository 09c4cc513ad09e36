//! Persistence of the band library and the concert collection

use gigwatch_common::Result;
use sqlx::SqlitePool;

use super::kv_store::{get_document, set_document};
use crate::models::{Band, Concert};

const BANDS_KEY: &str = "bands";
const CONCERTS_KEY: &str = "concerts";

/// Band and concert collections, one document each
///
/// No transaction spans the two keys.
#[derive(Clone)]
pub struct LibraryStore {
    db: SqlitePool,
}

impl LibraryStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// `None` until the library has been saved once
    pub async fn load_bands(&self) -> Result<Option<Vec<Band>>> {
        get_document(&self.db, BANDS_KEY).await
    }

    pub async fn save_bands(&self, bands: &[Band]) -> Result<()> {
        set_document(&self.db, BANDS_KEY, bands).await?;
        tracing::debug!(count = bands.len(), "Saved bands");
        Ok(())
    }

    /// Empty when nothing has been stored yet
    pub async fn load_concerts(&self) -> Result<Vec<Concert>> {
        Ok(get_document(&self.db, CONCERTS_KEY).await?.unwrap_or_default())
    }

    pub async fn save_concerts(&self, concerts: &[Concert]) -> Result<()> {
        set_document(&self.db, CONCERTS_KEY, concerts).await?;
        tracing::debug!(count = concerts.len(), "Saved concerts");
        Ok(())
    }
}
