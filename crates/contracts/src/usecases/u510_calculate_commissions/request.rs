use serde::{Deserialize, Serialize};

/// Trigger a commission run for one month
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateCommissionsRequest {
    /// "MM" (a bare "6" is accepted)
    pub month: String,
    pub year: i32,
    /// Restrict the run to orders of one ERP rep string
    #[serde(default)]
    pub sales_person: Option<String>,
}

/// Purge computed output of a month before a manual recompute
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteMonthRequest {
    pub month: String,
    pub year: i32,
    /// Also remove manually overridden records
    #[serde(default)]
    pub include_overrides: bool,
}
