use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Product incentive campaign
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spiff {
    pub id: String,
    pub name: String,
    pub product_num: String,
    /// Free text as entered ("flat", "Flat $", "percentage", ...)
    pub incentive_type: String,
    pub incentive_value: f64,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub is_active: bool,
}

impl Spiff {
    /// True when the campaign window overlaps [period_start, period_end]
    pub fn overlaps(&self, period_start: NaiveDate, period_end: NaiveDate) -> bool {
        self.is_active
            && self.start_date <= period_end
            && self.end_date.map_or(true, |end| end >= period_start)
    }
}
