use serde::Serialize;

pub mod details;

pub use details::{trailer_search_url, ApiMovie, DetailRecord};

/// A ranked similar title
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Recommendation {
    pub title: String,
    /// Similarity as a percentage, 0-100
    pub match_score: u8,
    /// Raw similarity score from the matrix
    pub similarity: f32,
}

/// A recommendation with its display metadata attached
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedRecommendation {
    #[serde(flatten)]
    pub recommendation: Recommendation,
    pub details: DetailRecord,
    pub trailer_url: String,
}
