use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use contracts::projections::p910_commission_records::dto::{
    CommissionAdjustmentRequest, CommissionListQuery, CommissionRecordDto,
};
use contracts::projections::p911_commission_summary::dto::MonthlySummaryDto;
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::projections::p910_commission_records::{repository, service};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustmentResponse {
    pub record: CommissionRecordDto,
    pub summary: Option<MonthlySummaryDto>,
}

#[derive(Deserialize)]
pub struct ExportParams {
    pub month: String,
}

/// GET /api/p910/commissions?month=&salesPerson=
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<CommissionListQuery>,
) -> Result<Json<Vec<CommissionRecordDto>>, StatusCode> {
    let sales_person = query
        .sales_person
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    match repository::list_for_month(&state.db, &query.month, sales_person).await {
        Ok(items) => Ok(Json(items)),
        Err(e) => {
            tracing::error!("Failed to list commissions for {}: {}", query.month, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// POST /api/p910/commissions/:id/adjust
pub async fn adjust(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<CommissionAdjustmentRequest>,
) -> Result<Json<AdjustmentResponse>, StatusCode> {
    if !request.adjustment.is_finite() {
        return Err(StatusCode::BAD_REQUEST);
    }
    match service::adjust(&state.db, &id, request.adjustment, request.reason).await {
        Ok(Some((record, summary))) => Ok(Json(AdjustmentResponse { record, summary })),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to adjust commission {}: {}", id, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// GET /api/p910/commissions/export?month=
pub async fn export_csv(
    State(state): State<AppState>,
    Query(params): Query<ExportParams>,
) -> Result<impl IntoResponse, StatusCode> {
    let records = repository::list_for_month(&state.db, &params.month, None)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load commissions for export {}: {}", params.month, e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
    let body = service::to_csv(&records).map_err(|e| {
        tracing::error!("Failed to write CSV for {}: {}", params.month, e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    let disposition = format!("attachment; filename=\"commissions_{}.csv\"", params.month);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}
