//! AI gateway seam
//!
//! The tracker only talks to the generative-AI service through
//! [`ConcertGateway`], so tests can swap in a scripted implementation.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::RawConcert;

/// AI gateway errors
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(
        "Gemini API key not configured. Set GIGWATCH_GEMINI_API_KEY (or GEMINI_API_KEY), \
         or add gemini_api_key to ~/.config/gigwatch/gigwatch.toml"
    )]
    MissingApiKey,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Generative-AI operations the tracker depends on
#[async_trait]
pub trait ConcertGateway: Send + Sync {
    /// Upcoming concerts for the given bands; an empty list is a valid answer
    async fn fetch_concerts(&self, band_names: &[String]) -> Result<Vec<RawConcert>, GatewayError>;

    /// Distinct artist names found in a free-form text dump
    async fn extract_bands_from_text(&self, text: &str) -> Result<Vec<String>, GatewayError>;

    /// Artist names found on the page behind a URL
    async fn extract_bands_from_url(&self, url: &str) -> Result<Vec<String>, GatewayError>;
}
