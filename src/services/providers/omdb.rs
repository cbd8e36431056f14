/// OMDb API provider
///
/// Looks titles up with `GET {api_url}/?t={title}&apikey={key}` and maps the
/// response fields (`Poster`, `Plot`, `imdbRating`, `Runtime`, `Director`,
/// `Year`) onto a [`DetailRecord`].
use std::time::Duration;

use reqwest::Client as HttpClient;

use crate::{
    config::Config,
    models::{ApiMovie, DetailRecord},
    services::providers::{FetchError, MetadataProvider},
};

#[derive(Clone)]
pub struct OmdbProvider {
    http_client: HttpClient,
    api_key: Option<String>,
    api_url: String,
    default_poster: String,
}

impl OmdbProvider {
    pub fn new(
        api_key: Option<String>,
        api_url: String,
        default_poster: String,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            api_key,
            api_url,
            default_poster,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Self::new(
            config.omdb_api_key.clone(),
            config.omdb_api_url.clone(),
            config.default_poster.clone(),
            config.metadata_timeout(),
        )
    }

    /// Single lookup attempt; every failure cause stays distinguishable
    async fn try_fetch(&self, title: &str) -> Result<DetailRecord, FetchError> {
        let api_key = self.api_key.as_deref().ok_or(FetchError::NotConfigured)?;
        let url = format!("{}/", self.api_url.trim_end_matches('/'));

        let response = self
            .http_client
            .get(&url)
            .query(&[("t", title), ("apikey", api_key)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        let body = response.text().await?;
        let movie: ApiMovie =
            serde_json::from_str(&body).map_err(|e| FetchError::Malformed(e.to_string()))?;

        if !movie.is_match() {
            return Err(FetchError::NoMatch(
                movie.error.unwrap_or_else(|| "no error message".to_string()),
            ));
        }

        Ok(DetailRecord::from_api(movie, &self.default_poster))
    }
}

#[async_trait::async_trait]
impl MetadataProvider for OmdbProvider {
    async fn fetch_details(&self, title: &str) -> DetailRecord {
        match self.try_fetch(title).await {
            Ok(record) => {
                tracing::debug!(title = %title, provider = self.name(), "Fetched title details");
                record
            }
            Err(FetchError::NotConfigured) => DetailRecord::fallback(&self.default_poster),
            Err(e) => {
                tracing::warn!(
                    title = %title,
                    provider = self.name(),
                    error = %e,
                    "Metadata lookup failed, using fallback record"
                );
                DetailRecord::fallback(&self.default_poster)
            }
        }
    }

    fn name(&self) -> &'static str {
        "omdb"
    }
}
