use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::data::MatrixSource;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Directory holding the catalog and similarity matrix artifacts
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Number of row shards the similarity matrix was split into
    #[serde(default = "default_shard_count")]
    pub shard_count: usize,

    /// File name prefix of each shard; the shard index and `.bin` are appended
    #[serde(default = "default_shard_prefix")]
    pub shard_prefix: String,

    /// Unsharded whole-matrix file, used when any shard is missing
    #[serde(default = "default_matrix_file")]
    pub matrix_file: String,

    /// Ordered title list aligned with the matrix rows
    #[serde(default = "default_catalog_file")]
    pub catalog_file: String,

    /// OMDb API base URL
    #[serde(default = "default_omdb_api_url")]
    pub omdb_api_url: String,

    /// OMDb API key. Without one every lookup yields the fallback record.
    #[serde(default)]
    pub omdb_api_key: Option<String>,

    /// Per-lookup budget for the metadata provider
    #[serde(default = "default_metadata_timeout_ms")]
    pub metadata_timeout_ms: u64,

    /// Poster shown when the provider has none
    #[serde(default = "default_poster")]
    pub default_poster: String,

    /// Number of recommendations returned when the caller does not ask for a count
    #[serde(default = "default_k")]
    pub default_k: usize,

    /// Upper bound on provider lookups in flight across all requests
    #[serde(default = "default_max_concurrent_lookups")]
    pub max_concurrent_lookups: usize,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("artifacts")
}

fn default_shard_count() -> usize {
    10
}

fn default_shard_prefix() -> String {
    "sim_".to_string()
}

fn default_matrix_file() -> String {
    "similarity.bin".to_string()
}

fn default_catalog_file() -> String {
    "movie_list.json".to_string()
}

fn default_omdb_api_url() -> String {
    "https://www.omdbapi.com".to_string()
}

fn default_metadata_timeout_ms() -> u64 {
    1500
}

pub fn default_poster() -> String {
    "https://images.unsplash.com/photo-1536440136628-849c177e76a1?w=500&q=80".to_string()
}

fn default_k() -> usize {
    5
}

fn default_max_concurrent_lookups() -> usize {
    8
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            shard_count: default_shard_count(),
            shard_prefix: default_shard_prefix(),
            matrix_file: default_matrix_file(),
            catalog_file: default_catalog_file(),
            omdb_api_url: default_omdb_api_url(),
            omdb_api_key: None,
            metadata_timeout_ms: default_metadata_timeout_ms(),
            default_poster: default_poster(),
            default_k: default_k(),
            max_concurrent_lookups: default_max_concurrent_lookups(),
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Where the similarity matrix shards and fallback file live
    pub fn matrix_source(&self) -> MatrixSource {
        MatrixSource {
            dir: self.data_dir.clone(),
            shard_prefix: self.shard_prefix.clone(),
            shard_count: self.shard_count,
            fallback_file: self.matrix_file.clone(),
        }
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.data_dir.join(&self.catalog_file)
    }

    pub fn metadata_timeout(&self) -> Duration {
        Duration::from_millis(self.metadata_timeout_ms)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
