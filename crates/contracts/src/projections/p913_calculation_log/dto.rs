use serde::{Deserialize, Serialize};

/// Audit entry written for every rated order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationLogDto {
    pub id: String,
    pub commission_month: String,
    pub order_num: String,
    pub order_id: String,
    pub customer_name: String,
    pub rep_name: String,
    pub rep_title: String,
    pub sales_person: String,
    pub customer_segment: String,
    pub customer_status: String,
    pub account_type: String,
    pub order_amount: f64,
    pub commission_rate: f64,
    pub commission_amount: f64,
    pub rate_source: String,
    pub calculated_at: String,
    pub order_date: String,
    pub notes: String,
}

impl CalculationLogDto {
    pub fn log_id(commission_month: &str, order_id: &str) -> String {
        format!("log_{}_{}", commission_month, order_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationLogQuery {
    pub month: String,
    /// Rep name or "all"
    pub rep: Option<String>,
}
