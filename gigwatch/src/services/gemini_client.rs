//! Gemini API client
//!
//! Implements [`ConcertGateway`] on top of the Gemini `generateContent`
//! endpoint. Concert and text extraction requests ask for JSON with a
//! response schema; URL extraction uses the search tool, which does not allow
//! a schema, so that reply is a comma-separated list.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

use super::gateway::{ConcertGateway, GatewayError};
use crate::models::{distinct_names, RawConcert};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const USER_AGENT: &str = concat!("gigwatch/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Model used when none is configured
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// generateContent request body
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: Value,
}

/// generateContent response body (only the fields we read)
#[derive(Debug, Clone, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

impl GenerateContentRequest {
    fn prompt(prompt: String) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part { text: Some(prompt) }],
            }],
            generation_config: None,
            tools: None,
        }
    }

    fn with_json_schema(mut self, schema: Value) -> Self {
        self.generation_config = Some(GenerationConfig {
            response_mime_type: "application/json".to_string(),
            response_schema: schema,
        });
        self
    }

    fn with_search_tool(mut self) -> Self {
        self.tools = Some(vec![json!({ "googleSearch": {} })]);
        self
    }
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|part| part.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

fn concert_list_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "bandName": { "type": "STRING", "description": "Name of the band." },
                "date": { "type": "STRING", "description": "Concert date, ISO 8601 (YYYY-MM-DDTHH:mm:ssZ)." },
                "city": { "type": "STRING", "description": "City hosting the concert." },
                "country": { "type": "STRING", "description": "Country hosting the concert." },
                "venue": { "type": "STRING", "description": "Venue name." },
                "ticketUrl": { "type": "STRING", "description": "Fictional ticket purchase URL." }
            },
            "required": ["bandName", "date", "city", "country", "venue", "ticketUrl"]
        }
    })
}

fn name_list_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": { "type": "STRING", "description": "An artist name" }
    })
}

fn concerts_prompt(band_names: &[String], today: &str) -> String {
    format!(
        "Act as a concert listings service. Today is {today}. For each of these artists, \
         list 3 to 5 realistic upcoming concerts scheduled within the next 12 months and \
         never in the past: {names}. Spread the shows across cities in North America, \
         Europe and Australia, with venues sized for each artist's popularity. \
         Only include the artists listed.",
        today = today,
        names = band_names.join(", ")
    )
}

fn text_extraction_prompt(text: &str) -> String {
    format!(
        "Extract every distinct artist name from the music library or playlist dump below. \
         Skip track titles, album names, durations and other metadata, and skip generic \
         terms that are not artists. Return a JSON array of strings without duplicates.\n\
         ---\n{}\n---",
        text
    )
}

fn url_extraction_prompt(url: &str) -> String {
    format!(
        "Open this public music playlist or library page: {}\n\
         Collect the distinct artist names listed on it, ignoring track titles, album \
         names and descriptions. Reply with nothing but the names as one comma-separated \
         list, for example: Artist A, Artist B, Artist C",
        url
    )
}

/// Remove a surrounding Markdown code fence (```json ... ```), if any
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or(rest);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Parse a concert-list reply; blank text means no concerts
pub fn parse_concert_payload(text: &str) -> Result<Vec<RawConcert>, GatewayError> {
    let body = strip_code_fence(text);
    if body.is_empty() {
        tracing::warn!("Gemini returned an empty concert payload");
        return Ok(Vec::new());
    }
    serde_json::from_str(body).map_err(|e| GatewayError::Parse(e.to_string()))
}

/// Parse a JSON array of names; blank text means no names
pub fn parse_name_array(text: &str) -> Result<Vec<String>, GatewayError> {
    let body = strip_code_fence(text);
    if body.is_empty() {
        tracing::warn!("Gemini returned an empty name list");
        return Ok(Vec::new());
    }
    let names: Vec<String> =
        serde_json::from_str(body).map_err(|e| GatewayError::Parse(e.to_string()))?;
    Ok(distinct_names(names))
}

/// Split a comma-separated reply into trimmed, non-blank names
pub fn parse_comma_separated(text: &str) -> Vec<String> {
    strip_code_fence(text)
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Error for a non-success HTTP status; 429 is reported as rate limiting
fn status_error(status: reqwest::StatusCode, body: String) -> GatewayError {
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        GatewayError::RateLimited
    } else {
        GatewayError::Api(status.as_u16(), body)
    }
}

/// Gemini API client
pub struct GeminiClient {
    http_client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl GeminiClient {
    /// A missing key is accepted here and reported on first use
    pub fn new(api_key: Option<String>, model: Option<String>) -> Result<Self, GatewayError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: GEMINI_BASE_URL.to_string(),
        })
    }

    /// Point the client at another endpoint (proxies, tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    async fn generate(&self, request: &GenerateContentRequest) -> Result<String, GatewayError> {
        let api_key = self.api_key.as_deref().ok_or(GatewayError::MissingApiKey)?;

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        tracing::debug!(model = %self.model, "Querying Gemini API");

        let response = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(status_error(status, error_text));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Parse(e.to_string()))?;

        Ok(body.text())
    }
}

#[async_trait]
impl ConcertGateway for GeminiClient {
    async fn fetch_concerts(&self, band_names: &[String]) -> Result<Vec<RawConcert>, GatewayError> {
        let today = gigwatch_common::time::now().format("%Y-%m-%d").to_string();
        let request = GenerateContentRequest::prompt(concerts_prompt(band_names, &today))
            .with_json_schema(concert_list_schema());

        let text = self.generate(&request).await.map_err(|e| {
            tracing::error!(error = %e, "Fetching concerts from Gemini failed");
            e
        })?;

        let concerts = parse_concert_payload(&text)?;
        tracing::info!(bands = band_names.len(), concerts = concerts.len(), "Fetched concerts");
        Ok(concerts)
    }

    async fn extract_bands_from_text(&self, text: &str) -> Result<Vec<String>, GatewayError> {
        let request = GenerateContentRequest::prompt(text_extraction_prompt(text))
            .with_json_schema(name_list_schema());

        let reply = self.generate(&request).await.map_err(|e| {
            tracing::error!(error = %e, "Extracting bands from text failed");
            e
        })?;

        parse_name_array(&reply)
    }

    async fn extract_bands_from_url(&self, url: &str) -> Result<Vec<String>, GatewayError> {
        let request = GenerateContentRequest::prompt(url_extraction_prompt(url)).with_search_tool();

        let reply = self.generate(&request).await.map_err(|e| {
            tracing::error!(error = %e, url = %url, "Extracting bands from URL failed");
            e
        })?;

        Ok(parse_comma_separated(&reply))
    }
}
