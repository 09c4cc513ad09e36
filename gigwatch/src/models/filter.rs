//! Concert filter criteria

use gigwatch_common::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Status predicate of the concert filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    /// Every concert
    #[default]
    All,
    /// Concerts of favorite bands
    Favorites,
    /// Concerts with a purchased ticket
    Purchased,
    /// Concerts within the next 30 days
    #[serde(rename = "next30")]
    Next30Days,
    /// Concerts within the next 90 days
    #[serde(rename = "next90")]
    Next90Days,
}

impl StatusFilter {
    /// Length of the upcoming window in days, for time-window statuses
    pub fn window_days(self) -> Option<u32> {
        match self {
            StatusFilter::Next30Days => Some(30),
            StatusFilter::Next90Days => Some(90),
            StatusFilter::All | StatusFilter::Favorites | StatusFilter::Purchased => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Favorites => "favorites",
            StatusFilter::Purchased => "purchased",
            StatusFilter::Next30Days => "next30",
            StatusFilter::Next90Days => "next90",
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "favorites" | "favourites" => Ok(StatusFilter::Favorites),
            "purchased" => Ok(StatusFilter::Purchased),
            "next30" | "30days" => Ok(StatusFilter::Next30Days),
            "next90" | "90days" => Ok(StatusFilter::Next90Days),
            other => Err(Error::InvalidInput(format!(
                "Unknown status filter '{}' (expected all, favorites, purchased, next30, next90)",
                other
            ))),
        }
    }
}

/// Combined filter: status AND country
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConcertFilter {
    pub status: StatusFilter,
    /// Exact country to match; `None` matches any country
    pub country: Option<String>,
}

impl ConcertFilter {
    pub fn new(status: StatusFilter) -> Self {
        Self {
            status,
            country: None,
        }
    }

    /// Restrict to one country (exact value); an empty string means any country
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.set_country(country);
        self
    }

    pub fn set_country(&mut self, country: impl Into<String>) {
        let country = country.into();
        self.country = if country.is_empty() { None } else { Some(country) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_and_display_agree() {
        for status in [
            StatusFilter::All,
            StatusFilter::Favorites,
            StatusFilter::Purchased,
            StatusFilter::Next30Days,
            StatusFilter::Next90Days,
        ] {
            assert_eq!(status.to_string().parse::<StatusFilter>().unwrap(), status);
        }
    }

    #[test]
    fn test_status_parse_aliases_and_errors() {
        assert_eq!("30days".parse::<StatusFilter>().unwrap(), StatusFilter::Next30Days);
        assert_eq!(" Favorites ".parse::<StatusFilter>().unwrap(), StatusFilter::Favorites);
        assert!(matches!("soon".parse::<StatusFilter>(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_window_days() {
        assert_eq!(StatusFilter::Next30Days.window_days(), Some(30));
        assert_eq!(StatusFilter::Next90Days.window_days(), Some(90));
        assert_eq!(StatusFilter::Favorites.window_days(), None);
    }

    #[test]
    fn test_empty_country_means_any() {
        let filter = ConcertFilter::default().with_country("");
        assert_eq!(filter.country, None);

        let filter = ConcertFilter::default().with_country("Norway");
        assert_eq!(filter.country.as_deref(), Some("Norway"));
    }

    #[test]
    fn test_country_kept_verbatim() {
        assert_eq!(
            ConcertFilter::default().with_country("Norway ").country.as_deref(),
            Some("Norway ")
        );
        assert_eq!(
            ConcertFilter::default().with_country("All").country.as_deref(),
            Some("All")
        );
    }
}
