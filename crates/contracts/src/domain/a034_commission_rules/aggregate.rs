use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Global commission rules (settings/commission_rules)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionRules {
    pub exclude_shipping: bool,
    #[serde(rename = "excludeCCProcessing")]
    pub exclude_cc_processing: bool,
    pub use_order_value: bool,
    pub apply_reorg_rule: bool,
    pub reorg_date: NaiveDate,
}

impl Default for CommissionRules {
    fn default() -> Self {
        Self {
            exclude_shipping: true,
            exclude_cc_processing: true,
            use_order_value: true,
            apply_reorg_rule: true,
            reorg_date: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap_or(NaiveDate::MIN),
        }
    }
}
