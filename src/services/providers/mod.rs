/// Movie metadata provider abstraction
///
/// A provider turns a title into a [`DetailRecord`] for display. Lookups sit on
/// the request path, so providers bound every call with a timeout and never
/// fail: whatever goes wrong is logged as a [`FetchError`] and the caller gets
/// the fallback record.
use crate::models::DetailRecord;

pub mod omdb;

pub use omdb::OmdbProvider;

/// Why a metadata lookup produced the fallback record
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("provider did not answer in time")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("provider returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed provider response: {0}")]
    Malformed(String),

    #[error("provider has no match: {0}")]
    NoMatch(String),

    #[error("provider is not configured")]
    NotConfigured,
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if e.is_decode() {
            FetchError::Malformed(e.to_string())
        } else if let Some(status) = e.status() {
            FetchError::Status(status)
        } else {
            FetchError::Transport(e.to_string())
        }
    }
}

/// Trait for movie metadata providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Fetch display metadata for an exact title; always yields a usable record
    async fn fetch_details(&self, title: &str) -> DetailRecord;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
