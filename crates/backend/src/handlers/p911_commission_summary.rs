use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use contracts::projections::p911_commission_summary::dto::MonthlySummaryDto;
use serde::Deserialize;

use super::AppState;
use crate::projections::p911_commission_summary::repository;

#[derive(Deserialize)]
pub struct ListParams {
    pub month: String,
}

/// GET /api/p911/summaries?month=
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<MonthlySummaryDto>>, StatusCode> {
    match repository::list_for_month(&state.db, &params.month).await {
        Ok(items) => Ok(Json(items)),
        Err(e) => {
            tracing::error!("Failed to list summaries for {}: {}", params.month, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
