use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Sales order as imported from the ERP (immutable for the duration of a run)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesOrder {
    /// Immutable ERP order id (`salesOrderId`), used for dedupe and record keys
    pub id: String,

    /// Human-facing order number (e.g. "9082", "Sh1234")
    pub order_num: String,

    pub customer_id: String,
    pub customer_name: String,

    /// Rep string exactly as the ERP exported it
    pub sales_person: String,

    pub posting_date: NaiveDateTime,

    /// "YYYY-MM"
    pub commission_month: String,

    pub revenue: Option<f64>,
    pub order_value: Option<f64>,
}

/// Line item of a sales order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineItem {
    pub id: String,
    pub sales_order_id: String,

    pub product_num: String,
    /// Fishbowl-style part number, preferred over `product_num` for spiff matching
    pub part_number: Option<String>,
    pub product_name: String,
    pub description: Option<String>,

    /// Fulfilled quantity
    pub quantity: f64,

    /// Extended price; negative for credits and refunds
    pub total_price: f64,
}

impl OrderLineItem {
    /// Product key used to look up spiff campaigns
    pub fn product_key(&self) -> &str {
        match self.part_number.as_deref() {
            Some(part) if !part.trim().is_empty() => part,
            _ if !self.product_num.trim().is_empty() => &self.product_num,
            _ => &self.product_name,
        }
    }
}
