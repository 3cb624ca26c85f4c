use anyhow::Result;
use contracts::projections::p910_commission_records::dto::CommissionRecordDto;
use contracts::projections::p911_commission_summary::dto::MonthlySummaryDto;
use sea_orm::DatabaseConnection;

use super::repository;
use crate::projections::p911_commission_summary;
use crate::shared::money::{round_currency, to_decimal, to_f64};

/// Applies a manual adjustment and refreshes the rep's monthly summary.
/// Returns `None` when the record does not exist.
pub async fn adjust(
    db: &DatabaseConnection,
    id: &str,
    adjustment: f64,
    reason: Option<String>,
) -> Result<Option<(CommissionRecordDto, Option<MonthlySummaryDto>)>> {
    let Some(current) = repository::get(db, id).await? else {
        return Ok(None);
    };
    let amount = to_f64(round_currency(
        to_decimal(current.commission_amount) + to_decimal(adjustment),
    ));

    let Some(updated) = repository::apply_adjustment(db, id, adjustment, amount, reason).await?
    else {
        return Ok(None);
    };
    tracing::info!(
        "Commission {} adjusted by {:.2} to {:.2} (override)",
        id,
        adjustment,
        amount
    );

    let summary = p911_commission_summary::service::recalculate_for_rep(
        db,
        &updated.sales_person,
        &updated.rep_name,
        &updated.commission_month,
        updated.commission_year,
    )
    .await?;
    Ok(Some((updated, summary)))
}

/// Payroll export: one CSV row per record, camelCase headers
pub fn to_csv(records: &[CommissionRecordDto]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer.serialize(record)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("CSV flush failed: {}", e))?;
    Ok(String::from_utf8(bytes)?)
}
