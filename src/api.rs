/// Synchronous client for the well **suggest** endpoint.
///
/// Issues `GET {api_root}/suggest?query={sanitized}` with the API key in an
/// `x-api-key` header and returns the wells from the JSON envelope.
///
/// ### Notes
/// - The query is reduced to ASCII letters and digits before it is sent.
///   Spaces and hyphens disappear too, so `"Wel l-42!"` is sent as `Wel42`.
/// - Requests are bounded by the configured timeout (default 5000 ms). A
///   timed-out request is reported as a failure and never retried.
///
/// Typical usage:
/// ```no_run
/// # use well_search::Client;
/// let client = Client::new("my-api-key", 5000)?;
/// if let Some(found) = client.suggest("Wel l-42!")? {
///     println!("{} wells found", found.count());
/// }
/// # Ok::<(), anyhow::Error>(())
/// ```
use crate::error::{SettingsError, SuggestError};
use crate::models::{Envelope, Suggestions};
use crate::settings::Settings;
use log::debug;
use reqwest::blocking::Client as HttpClient;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::redirect::Policy;
use std::time::Duration;

pub const DEFAULT_API_ROOT: &str = "https://api.querypark.com/v1/";
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Clone)]
pub struct Client {
    pub base_url: String,
    timeout_ms: u64,
    http: HttpClient,
}

/// Strip every character outside `[A-Za-z0-9]`.
pub fn sanitize_query(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_alphanumeric).collect()
}

/// Decode a suggest response body.
///
/// ### Errors
/// - `MalformedResponse` when the body is not a JSON envelope, or `ok` is
///   true but the payload is missing
/// - `ApiRejected` when `ok` is false or absent, carrying the server message
pub fn parse_envelope(body: &str) -> Result<Suggestions, SuggestError> {
    let envelope: Envelope = serde_json::from_str(body)
        .map_err(|e| SuggestError::MalformedResponse(e.to_string()))?;
    if !envelope.ok {
        return Err(SuggestError::ApiRejected(
            envelope
                .message
                .unwrap_or_else(|| "request rejected".to_string()),
        ));
    }
    let payload = envelope
        .payload
        .ok_or_else(|| SuggestError::MalformedResponse("missing payload".to_string()))?;
    Ok(Suggestions {
        wells: payload.wells,
        message: envelope.message,
    })
}

impl Client {
    /// Build a client against the default API root.
    ///
    /// ### Errors
    /// `SettingsError::InvalidApiKey` when the key cannot be sent as a header.
    pub fn new(api_key: &str, timeout_ms: u64) -> Result<Self, SettingsError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut key = HeaderValue::from_str(api_key)
            .map_err(|e| SettingsError::InvalidApiKey(e.to_string()))?;
        key.set_sensitive(true);
        headers.insert(API_KEY_HEADER, key);

        let http = HttpClient::builder()
            .timeout(Duration::from_millis(timeout_ms)) // total request timeout
            .redirect(Policy::limited(5)) // cap redirects
            .user_agent(concat!("well_search/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(|e| SettingsError::HttpClient(e.to_string()))?;
        Ok(Self {
            base_url: DEFAULT_API_ROOT.into(),
            timeout_ms,
            http,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, SettingsError> {
        Ok(Self::new(&settings.api_key, settings.timeout_ms)?.with_base_url(&settings.api_root))
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// URL for an already sanitized query.
    pub fn suggest_url(&self, query: &str) -> String {
        format!("{}/suggest?query={}", self.base_url.trim_end_matches('/'), query)
    }

    /// Fetch suggestions for raw user input.
    ///
    /// Returns `Ok(None)` without touching the network when the input is
    /// empty or sanitizes to nothing.
    pub fn suggest(&self, raw: &str) -> Result<Option<Suggestions>, SuggestError> {
        let query = sanitize_query(raw);
        if query.is_empty() {
            return Ok(None);
        }
        self.fetch(&query).map(Some)
    }

    fn fetch(&self, query: &str) -> Result<Suggestions, SuggestError> {
        let url = self.suggest_url(query);
        debug!("GET {url}");

        let resp = self.http.get(&url).send().map_err(|e| self.transport_error(e))?;
        let status = resp.status();
        let body = resp.text().map_err(|e| self.transport_error(e))?;

        match parse_envelope(&body) {
            Err(SuggestError::MalformedResponse(_)) if !status.is_success() => Err(
                SuggestError::NetworkFailure(format!("request failed with HTTP {status}")),
            ),
            other => other,
        }
    }

    fn transport_error(&self, e: reqwest::Error) -> SuggestError {
        if e.is_timeout() {
            SuggestError::NetworkTimeout {
                timeout_ms: self.timeout_ms,
            }
        } else {
            SuggestError::NetworkFailure(e.to_string())
        }
    }
}
