use anyhow::Result;
use chrono::Utc;
use contracts::projections::p910_commission_records::dto::CommissionRecordDto;
use contracts::projections::p911_commission_summary::dto::MonthlySummaryDto;
use contracts::projections::p912_spiff_earnings::dto::SpiffEarningDto;
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;

use super::repository;
use crate::projections::{p910_commission_records, p912_spiff_earnings};
use crate::shared::money::{round_currency, to_decimal, to_f64};

/// Builds a summary from stored records; overrides count with their frozen amounts
pub fn summarize(
    sales_person: &str,
    rep_name: &str,
    month: &str,
    year: i32,
    records: &[CommissionRecordDto],
    spiffs: &[SpiffEarningDto],
) -> MonthlySummaryDto {
    let revenue: Decimal = records.iter().map(|r| to_decimal(r.order_revenue)).sum();
    let commission: Decimal = records.iter().map(|r| to_decimal(r.commission_amount)).sum();
    let spiff_total: Decimal = spiffs.iter().map(|s| to_decimal(s.spiff_amount)).sum();

    MonthlySummaryDto {
        id: MonthlySummaryDto::summary_id(sales_person, month),
        sales_person: sales_person.to_string(),
        rep_name: rep_name.to_string(),
        month: month.to_string(),
        year,
        total_orders: records.len() as i32,
        total_revenue: to_f64(round_currency(revenue)),
        total_commission: to_f64(round_currency(commission)),
        total_spiffs: to_f64(round_currency(spiff_total)),
        total_earnings: to_f64(round_currency(commission + spiff_total)),
        override_count: records.iter().filter(|r| r.is_override).count() as i32,
        paid_status: "pending".to_string(),
        calculated_at: Utc::now().to_rfc3339(),
    }
}

/// Recomputes one rep's month from what is stored. `None` when the rep has no records.
pub async fn recalculate_for_rep(
    db: &DatabaseConnection,
    sales_person: &str,
    rep_name: &str,
    month: &str,
    year: i32,
) -> Result<Option<MonthlySummaryDto>> {
    let records =
        p910_commission_records::repository::list_for_month(db, month, Some(sales_person)).await?;
    if records.is_empty() {
        return Ok(None);
    }
    let spiffs =
        p912_spiff_earnings::repository::list_for_month(db, month, Some(sales_person)).await?;

    let summary = summarize(sales_person, rep_name, month, year, &records, &spiffs);
    repository::upsert(db, &summary).await?;
    tracing::info!(
        "Summary {} recalculated: {} orders, commission {:.2}, spiffs {:.2}, {} overrides",
        summary.id,
        summary.total_orders,
        summary.total_commission,
        summary.total_spiffs,
        summary.override_count
    );
    Ok(Some(summary))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(amount: f64, revenue: f64, is_override: bool) -> CommissionRecordDto {
        CommissionRecordDto {
            id: "x".into(),
            rep_id: "r1".into(),
            sales_person: "BenW".into(),
            rep_name: "Ben Wallner".into(),
            rep_title: "Account Executive".into(),
            order_id: "1".into(),
            order_num: "SO-1".into(),
            customer_id: "C1".into(),
            customer_name: "Acme".into(),
            account_type: "Distributor".into(),
            customer_segment: "distributor".into(),
            customer_status: "new".into(),
            order_revenue: revenue,
            order_value: revenue,
            commission_rate: 8.0,
            commission_amount: amount,
            rate_source: "configured".into(),
            order_date: "2024-06-03 10:00:00".into(),
            commission_month: "2024-06".into(),
            commission_year: 2024,
            calculated_at: String::new(),
            paid_status: "pending".into(),
            notes: String::new(),
            is_override,
            override_reason: None,
            manual_adjustment: None,
        }
    }

    #[test]
    fn test_summarize_adds_cents_exactly() {
        let records = vec![rec(0.1, 10.0, false), rec(0.2, 20.0, true), rec(33.33, 416.63, false)];
        let s = summarize("BenW", "Ben Wallner", "2024-06", 2024, &records, &[]);
        assert_eq!(s.id, "BenW_2024-06");
        assert_eq!(s.total_orders, 3);
        assert_eq!(s.total_commission, 33.63);
        assert_eq!(s.total_revenue, 446.63);
        assert_eq!(s.total_spiffs, 0.0);
        assert_eq!(s.total_earnings, 33.63);
        assert_eq!(s.override_count, 1);
    }
}
