//! Configuration resolution for gigwatch
//!
//! Gemini API key priority: ENV (`GIGWATCH_GEMINI_API_KEY`, then
//! `GEMINI_API_KEY`) → TOML (`gemini_api_key`).

use gigwatch_common::config::TomlConfig;
use gigwatch_common::{Error, Result};
use tracing::{info, warn};

use crate::services::gemini_client::DEFAULT_MODEL;

/// Preferred environment variable for the Gemini key
pub const GEMINI_KEY_ENV: &str = "GIGWATCH_GEMINI_API_KEY";

/// Generic fallback shared with other Gemini tooling
pub const GEMINI_KEY_FALLBACK_ENV: &str = "GEMINI_API_KEY";

/// Model override
pub const GEMINI_MODEL_ENV: &str = "GIGWATCH_GEMINI_MODEL";

/// Resolve the Gemini API key from environment and TOML
pub fn resolve_gemini_api_key(toml_config: &TomlConfig) -> Result<String> {
    let mut sources = Vec::new();

    let env_key = std::env::var(GEMINI_KEY_ENV).ok().filter(|k| is_valid_key(k));
    if env_key.is_some() {
        sources.push(GEMINI_KEY_ENV);
    }

    let fallback_key = std::env::var(GEMINI_KEY_FALLBACK_ENV)
        .ok()
        .filter(|k| is_valid_key(k));
    if fallback_key.is_some() {
        sources.push(GEMINI_KEY_FALLBACK_ENV);
    }

    let toml_key = toml_config
        .gemini_api_key
        .as_ref()
        .filter(|k| is_valid_key(k));
    if toml_key.is_some() {
        sources.push("TOML");
    }

    if sources.len() > 1 {
        warn!(
            "Gemini API key found in multiple sources: {}. Using {} (highest priority).",
            sources.join(", "),
            sources[0]
        );
    }

    if let Some(key) = env_key {
        info!("Gemini API key loaded from {}", GEMINI_KEY_ENV);
        return Ok(key.trim().to_string());
    }

    if let Some(key) = fallback_key {
        info!("Gemini API key loaded from {}", GEMINI_KEY_FALLBACK_ENV);
        return Ok(key.trim().to_string());
    }

    if let Some(key) = toml_key {
        info!("Gemini API key loaded from TOML config");
        return Ok(key.trim().to_string());
    }

    Err(Error::Config(format!(
        "Gemini API key not configured. Please configure using one of:\n\
         1. Environment: {}=your-key-here (or {})\n\
         2. TOML config: ~/.config/gigwatch/gigwatch.toml (gemini_api_key = \"your-key\")",
        GEMINI_KEY_ENV, GEMINI_KEY_FALLBACK_ENV
    )))
}

/// Model name: ENV → TOML → built-in default
pub fn resolve_gemini_model(toml_config: &TomlConfig) -> String {
    std::env::var(GEMINI_MODEL_ENV)
        .ok()
        .filter(|m| is_valid_key(m))
        .or_else(|| toml_config.gemini_model.clone().filter(|m| is_valid_key(m)))
        .map(|m| m.trim().to_string())
        .unwrap_or_else(|| DEFAULT_MODEL.to_string())
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}
