use serde::{Deserialize, Serialize};

/// Per-rep monthly totals (monthly_commission_summary)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummaryDto {
    /// `{salesPerson}_{month}`
    pub id: String,
    /// Canonical rep identity
    pub sales_person: String,
    pub rep_name: String,
    pub month: String,
    pub year: i32,
    pub total_orders: i32,
    pub total_revenue: f64,
    pub total_commission: f64,
    pub total_spiffs: f64,
    pub total_earnings: f64,
    pub override_count: i32,
    pub paid_status: String,
    pub calculated_at: String,
}

impl MonthlySummaryDto {
    pub fn summary_id(sales_person: &str, month: &str) -> String {
        format!("{}_{}", sales_person, month)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecalculateSummaryRequest {
    pub rep_id: String,
    pub month: String,
    pub year: i32,
}
