//! Error types shared by the suggestion, export and settings paths.
use thiserror::Error;

/// Failure of a single suggestion request.
///
/// Every variant degrades to an empty result list in the session; none of
/// them are retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SuggestError {
    #[error("request timed out after {timeout_ms} ms")]
    NetworkTimeout { timeout_ms: u64 },
    #[error("network error: {0}")]
    NetworkFailure(String),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("{0}")]
    ApiRejected(String),
}

/// A record the parser could not normalize.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot parse well {uuid:?}: {reason}")]
pub struct ParseError {
    pub uuid: String,
    pub reason: String,
}

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("xlsx error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    #[error("cannot move finished file into place: {0}")]
    Persist(#[from] tempfile::PersistError),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("region {region:?}: {source}")]
    Parse {
        region: String,
        #[source]
        source: ParseError,
    },
    #[error(transparent)]
    Write(#[from] WriteError),
    #[error("spreadsheet writer reported that no file was created")]
    WriterDeclined,
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error("an API key is required (set --api-key, WELLS_API_KEY or api_key in the config file)")]
    MissingApiKey,
    #[error("API key is not a valid header value: {0}")]
    InvalidApiKey(String),
    #[error("cannot build http client: {0}")]
    HttpClient(String),
}
