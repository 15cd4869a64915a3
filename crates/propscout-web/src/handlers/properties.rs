//! Search and outreach endpoints.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use propscout_common::entities::SearchFilter;
use propscout_scoring::ScoredListing;

use super::ApiError;
use crate::state::SharedState;

/// `POST /api/search` — run the aggregation pipeline for the requested
/// postal codes and return the ranked result set.
pub async fn search(
    State(state): State<SharedState>,
    Json(filter): Json<SearchFilter>,
) -> Result<Json<Vec<ScoredListing>>, ApiError> {
    if filter.zip_codes.is_empty() {
        return Err(ApiError::bad_request("zip_codes must not be empty"));
    }

    let outcome = state.pipeline.run(&filter).await;
    info!(
        listings = outcome.listings.len(),
        source_errors = outcome.source_errors.len(),
        duration_ms = outcome.duration_ms,
        "search complete"
    );
    Ok(Json(outcome.listings))
}

#[derive(Debug, Serialize)]
pub struct OutreachResponse {
    pub message: String,
}

/// `GET /api/property/{id}/outreach` — draft seller outreach text.
pub async fn outreach(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<OutreachResponse>, ApiError> {
    let row = state
        .store
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Property not found"))?;

    let message = state.outreach.generate(&row.listing).await;
    Ok(Json(OutreachResponse { message }))
}
