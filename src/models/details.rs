use reqwest::Url;
use serde::{Deserialize, Serialize};

const PLOT_FALLBACK: &str = "Plot details unavailable.";
const RATING_FALLBACK: &str = "N/A";
const RUNTIME_FALLBACK: &str = "--";
const DIRECTOR_FALLBACK: &str = "Unknown";
const YEAR_FALLBACK: &str = "----";

/// Display metadata for one title. Every field is always populated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetailRecord {
    pub poster: String,
    pub plot: String,
    pub rating: String,
    pub runtime: String,
    pub director: String,
    pub year: String,
}

impl DetailRecord {
    /// The record served whenever the provider cannot supply one
    pub fn fallback(default_poster: &str) -> Self {
        Self {
            poster: default_poster.to_string(),
            plot: PLOT_FALLBACK.to_string(),
            rating: RATING_FALLBACK.to_string(),
            runtime: RUNTIME_FALLBACK.to_string(),
            director: DIRECTOR_FALLBACK.to_string(),
            year: YEAR_FALLBACK.to_string(),
        }
    }

    /// Maps a provider response, defaulting each field that is absent, blank or "N/A"
    pub fn from_api(movie: ApiMovie, default_poster: &str) -> Self {
        Self {
            poster: or_default(movie.poster, default_poster),
            plot: or_default(movie.plot, PLOT_FALLBACK),
            rating: or_default(movie.imdb_rating, RATING_FALLBACK),
            runtime: or_default(movie.runtime, RUNTIME_FALLBACK),
            director: or_default(movie.director, DIRECTOR_FALLBACK),
            year: or_default(movie.year, YEAR_FALLBACK),
        }
    }

    /// One star per two rating points on the 10-point scale, or a single star
    /// when the rating is not a number
    pub fn star_rating(&self) -> String {
        match self.rating.trim().parse::<f32>() {
            Ok(rating) if rating.is_finite() && rating >= 0.0 => {
                "⭐".repeat((rating / 2.0) as usize)
            }
            _ => "⭐".to_string(),
        }
    }
}

fn or_default(value: Option<String>, default: &str) -> String {
    match value {
        Some(v) if !v.trim().is_empty() && v != "N/A" => v,
        _ => default.to_string(),
    }
}

/// Raw OMDb title lookup response
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
pub struct ApiMovie {
    /// "True" on a match, "False" otherwise
    pub response: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub poster: Option<String>,
    #[serde(default)]
    pub plot: Option<String>,
    #[serde(default, rename = "imdbRating")]
    pub imdb_rating: Option<String>,
    #[serde(default)]
    pub runtime: Option<String>,
    #[serde(default)]
    pub director: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
}

impl ApiMovie {
    pub fn is_match(&self) -> bool {
        self.response.as_deref() == Some("True")
    }
}

/// YouTube search link for the title's trailer
pub fn trailer_search_url(title: &str) -> String {
    let query = format!("{} trailer", title);
    match Url::parse_with_params("https://www.youtube.com/results", &[("search_query", query)]) {
        Ok(url) => url.to_string(),
        Err(_) => "https://www.youtube.com/results".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POSTER: &str = "https://example.com/default.jpg";

    #[test]
    fn test_fallback_record() {
        let record = DetailRecord::fallback(POSTER);
        assert_eq!(record.poster, POSTER);
        assert_eq!(record.plot, "Plot details unavailable.");
        assert_eq!(record.rating, "N/A");
        assert_eq!(record.runtime, "--");
        assert_eq!(record.director, "Unknown");
        assert_eq!(record.year, "----");
    }

    #[test]
    fn test_from_api_fills_gaps() {
        let movie: ApiMovie = serde_json::from_str(
            r#"{
                "Response": "True",
                "Title": "Inception",
                "Year": "2010",
                "Runtime": "148 min",
                "Director": "Christopher Nolan",
                "Plot": "",
                "Poster": "N/A",
                "imdbRating": "8.8"
            }"#,
        )
        .unwrap();
        assert!(movie.is_match());

        let record = DetailRecord::from_api(movie, POSTER);
        assert_eq!(record.poster, POSTER);
        assert_eq!(record.plot, "Plot details unavailable.");
        assert_eq!(record.rating, "8.8");
        assert_eq!(record.runtime, "148 min");
        assert_eq!(record.director, "Christopher Nolan");
        assert_eq!(record.year, "2010");
    }

    #[test]
    fn test_failed_response_is_not_a_match() {
        let movie: ApiMovie =
            serde_json::from_str(r#"{"Response": "False", "Error": "Movie not found!"}"#).unwrap();
        assert!(!movie.is_match());
        assert_eq!(movie.error.as_deref(), Some("Movie not found!"));
    }

    #[test]
    fn test_star_rating() {
        let mut record = DetailRecord::fallback(POSTER);
        assert_eq!(record.star_rating(), "⭐");

        record.rating = "8.3".to_string();
        assert_eq!(record.star_rating(), "⭐⭐⭐⭐");

        record.rating = "1.9".to_string();
        assert_eq!(record.star_rating(), "");
    }

    #[test]
    fn test_trailer_search_url_is_encoded() {
        assert_eq!(
            trailer_search_url("Pirates & Co"),
            "https://www.youtube.com/results?search_query=Pirates+%26+Co+trailer"
        );
    }
}
