//! Band model and canonical band identity

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Canonical band identity: trimmed, lower-cased name
///
/// Every lookup and comparison between band names goes through this key so
/// that "Radiohead", " radiohead" and "RADIOHEAD" are the same band.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BandKey(String);

impl BandKey {
    pub fn new(name: &str) -> Self {
        Self(name.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the source name was empty or whitespace only
    pub fn is_blank(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for BandKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for BandKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A tracked artist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Band {
    /// Display name as entered or imported
    pub name: String,
    #[serde(default)]
    pub is_favorite: bool,
}

impl Band {
    /// New non-favorite band; surrounding whitespace is dropped from the name
    pub fn new(name: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            is_favorite: false,
        }
    }

    pub fn favorite(name: &str) -> Self {
        Self {
            is_favorite: true,
            ..Self::new(name)
        }
    }

    pub fn key(&self) -> BandKey {
        BandKey::new(&self.name)
    }
}

/// Library used on first start, before anything has been stored
pub fn seed_bands() -> Vec<Band> {
    vec![
        Band::favorite("Radiohead"),
        Band::new("Tame Impala"),
        Band::favorite("Arctic Monkeys"),
        Band::new("The Strokes"),
    ]
}

/// Trim names, drop blanks and keep the first spelling of each band key
pub fn distinct_names<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    names
        .into_iter()
        .filter_map(|name| {
            let name = name.as_ref().trim();
            let key = BandKey::new(name);
            (!key.is_blank() && seen.insert(key)).then(|| name.to_string())
        })
        .collect()
}
