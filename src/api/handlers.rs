use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::AppResult;
use crate::middleware::request_id::RequestId;
use crate::models::{trailer_search_url, DetailRecord, EnrichedRecommendation, Recommendation};
use crate::services::recommendations;

use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    pub title: String,
    pub k: Option<usize>,
    #[serde(default)]
    pub details: bool,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum RecommendationList {
    Plain(Vec<Recommendation>),
    Enriched(Vec<EnrichedRecommendation>),
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub title: String,
    pub recommendations: RecommendationList,
}

#[derive(Debug, Serialize)]
pub struct TitleDetailsResponse {
    pub title: String,
    #[serde(flatten)]
    pub details: DetailRecord,
    pub stars: String,
    pub trailer_url: String,
}

// Handlers

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "titles": state.dataset.catalog().len(),
            "loaded_at": state.dataset.loaded_at(),
        })),
    )
}

/// All catalog titles in matrix row order
pub async fn get_titles(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(
        state
            .dataset
            .catalog()
            .all_titles()
            .map(str::to_string)
            .collect(),
    )
}

/// Display metadata for a single title
pub async fn get_title_details(
    State(state): State<AppState>,
    Path(title): Path<String>,
) -> Json<TitleDetailsResponse> {
    let details = state.metadata_provider.fetch_details(&title).await;
    Json(TitleDetailsResponse {
        stars: details.star_rating(),
        trailer_url: trailer_search_url(&title),
        title,
        details,
    })
}

/// Titles most similar to the requested one
pub async fn get_recommendations(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(query): Query<RecommendationQuery>,
) -> AppResult<Json<RecommendationResponse>> {
    let k = query.k.unwrap_or(state.default_k);

    tracing::info!(
        request_id = %request_id,
        title = %query.title,
        k,
        details = query.details,
        "Processing recommendation request"
    );

    let recommendations = if query.details {
        RecommendationList::Enriched(
            recommendations::get_enriched_recommendations(
                &state.dataset,
                Arc::clone(&state.metadata_provider),
                Arc::clone(&state.lookup_permits),
                &query.title,
                k,
            )
            .await?,
        )
    } else {
        RecommendationList::Plain(recommendations::get_recommendations(
            &state.dataset,
            &query.title,
            k,
        )?)
    };

    Ok(Json(RecommendationResponse {
        title: query.title,
        recommendations,
    }))
}
