use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Progress of one commission run, polled by the UI
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalcProgress {
    pub calc_id: String,
    pub commission_month: String,
    pub status: CalcStatus,
    pub total_orders: i32,
    pub current_order: i32,
    /// 0..=100, one decimal
    pub percentage: f64,
    pub current_rep: String,
    pub current_customer: String,
    pub current_order_num: String,
    pub stats: CalcStats,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CalcStatus {
    Processing,
    Complete,
    Failed,
}

impl CalcStatus {
    pub fn code(&self) -> &'static str {
        match self {
            CalcStatus::Processing => "processing",
            CalcStatus::Complete => "complete",
            CalcStatus::Failed => "failed",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "processing" => Some(CalcStatus::Processing),
            "complete" => Some(CalcStatus::Complete),
            "failed" => Some(CalcStatus::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, CalcStatus::Complete | CalcStatus::Failed)
    }
}

/// Running counters of a commission run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalcStats {
    pub commissions_calculated: i32,
    pub total_commission: f64,
    pub admin_skipped: i32,
    pub shopify_skipped: i32,
    pub retail_skipped: i32,
    pub inactive_rep_skipped: i32,
    pub zero_quantity_skipped: i32,
    pub duplicate_skipped: i32,
    pub customers_defaulted: i32,
    pub spiffs_calculated: i32,
    pub total_spiffs: f64,
}

impl CalcProgress {
    pub fn new(calc_id: String, commission_month: String) -> Self {
        let now = Utc::now();
        Self {
            calc_id,
            commission_month,
            status: CalcStatus::Processing,
            total_orders: 0,
            current_order: 0,
            percentage: 0.0,
            current_rep: String::new(),
            current_customer: String::new(),
            current_order_num: String::new(),
            stats: CalcStats::default(),
            started_at: now,
            completed_at: None,
            updated_at: now,
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_wire_shape() {
        let p = CalcProgress::new("calc_1".into(), "2024-06".into());
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v["status"], "processing");
        assert_eq!(v["totalOrders"], 0);
        assert_eq!(v["currentOrderNum"], "");
        assert_eq!(v["stats"]["shopifySkipped"], 0);
        assert!(v["completedAt"].is_null());
    }
}
