//! CSV export endpoint.

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use propscout_export::export_csv;
use propscout_scoring::ScoredListing;

use super::ApiError;
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub property_ids: Vec<Uuid>,
}

/// `POST /api/export` — stream the selected listings as a CSV attachment.
pub async fn export(
    State(state): State<SharedState>,
    Json(req): Json<ExportRequest>,
) -> Result<Response, ApiError> {
    let rows = state.store.get_many(&req.property_ids).await?;

    let scored: Vec<ScoredListing> = rows
        .into_iter()
        .map(|row| ScoredListing {
            id: row.id,
            motivation_score: row.motivation_score.unwrap_or(0.0),
            suggested_offer: row.suggested_offer.unwrap_or(0.0),
            estimated_roi: row.estimated_roi.unwrap_or(0.0),
            listing: row.listing,
        })
        .collect();

    let csv = export_csv(&scored).map_err(|e| ApiError::internal(e.to_string()))?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=propscout-export.csv",
            ),
        ],
        csv,
    )
        .into_response())
}
