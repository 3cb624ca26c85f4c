use serde::{Deserialize, Serialize};

/// Spiff payout for one line item (spiff_earnings)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpiffEarningDto {
    /// `{salesPerson}_{commissionMonth}_spiff_{lineItemId}`
    pub id: String,
    pub rep_id: String,
    pub sales_person: String,
    pub rep_name: String,

    pub spiff_id: String,
    pub spiff_name: String,
    pub product_num: String,
    pub product_description: String,

    pub order_id: String,
    pub order_num: String,
    pub customer_id: String,
    pub customer_name: String,
    pub line_item_id: String,

    pub quantity: f64,
    pub line_revenue: f64,
    pub incentive_type: String,
    pub incentive_value: f64,
    pub spiff_amount: f64,

    pub order_date: String,
    pub commission_month: String,
    pub commission_year: i32,
    pub calculated_at: String,
    pub paid_status: String,
}

impl SpiffEarningDto {
    pub fn earning_id(sales_person: &str, commission_month: &str, line_item_id: &str) -> String {
        format!("{}_{}_spiff_{}", sales_person, commission_month, line_item_id)
    }
}
