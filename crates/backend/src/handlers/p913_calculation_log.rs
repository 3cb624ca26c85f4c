use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use contracts::projections::p913_calculation_log::dto::{CalculationLogDto, CalculationLogQuery};

use super::AppState;
use crate::projections::p913_calculation_log::repository;

/// GET /api/p913/logs?month=&rep=
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<CalculationLogQuery>,
) -> Result<Json<Vec<CalculationLogDto>>, StatusCode> {
    match repository::list(&state.db, &query.month, query.rep.as_deref()).await {
        Ok(items) => Ok(Json(items)),
        Err(e) => {
            tracing::error!("Failed to list calculation logs for {}: {}", query.month, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
