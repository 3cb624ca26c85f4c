use serde::{Deserialize, Serialize};

/// Per-order commission record (monthly_commissions)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionRecordDto {
    /// `{salesPerson}_{commissionMonth}_order_{orderId}`
    pub id: String,
    pub rep_id: String,
    pub sales_person: String,
    pub rep_name: String,
    pub rep_title: String,

    pub order_id: String,
    pub order_num: String,
    pub customer_id: String,
    pub customer_name: String,
    pub account_type: String,

    pub customer_segment: String,
    pub customer_status: String,

    pub order_revenue: f64,
    pub order_value: f64,
    pub commission_rate: f64,
    pub commission_amount: f64,
    /// "configured" or "default"
    pub rate_source: String,

    pub order_date: String,
    pub commission_month: String,
    pub commission_year: i32,

    pub calculated_at: String,
    pub paid_status: String,
    pub notes: String,

    pub is_override: bool,
    pub override_reason: Option<String>,
    pub manual_adjustment: Option<f64>,
}

impl CommissionRecordDto {
    pub fn record_id(sales_person: &str, commission_month: &str, order_id: &str) -> String {
        format!("{}_{}_order_{}", sales_person, commission_month, order_id)
    }
}

/// Manual adjustment applied from the admin UI
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionAdjustmentRequest {
    pub adjustment: f64,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionListQuery {
    pub month: String,
    pub sales_person: Option<String>,
}
