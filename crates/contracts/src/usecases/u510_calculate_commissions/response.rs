use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationStartResponse {
    pub calc_id: String,
    pub commission_month: String,
    pub processing: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteMonthResponse {
    pub commission_month: String,
    pub commissions_deleted: u64,
    pub logs_deleted: u64,
    pub overrides_preserved: u64,
    pub message: String,
}
