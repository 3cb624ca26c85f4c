use contracts::domain::a030_sales_order::aggregate::OrderLineItem;
use contracts::domain::a035_spiff::aggregate::Spiff;
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::shared::money::{percent_of, round_currency, to_decimal};

/// Lowercase, letters only: "Flat $" -> "flat"
pub fn normalize_incentive_type(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Payout of one spiff on one line item; unknown incentive types pay nothing
pub fn spiff_amount(spiff: &Spiff, item: &OrderLineItem) -> Decimal {
    let value = to_decimal(spiff.incentive_value);
    let amount = match normalize_incentive_type(&spiff.incentive_type).as_str() {
        "flat" => to_decimal(item.quantity) * value,
        "percentage" => percent_of(to_decimal(item.total_price), value),
        other => {
            tracing::warn!(
                "Spiff {} has unknown incentive type '{}' ({}), paying 0",
                spiff.id,
                spiff.incentive_type,
                other
            );
            Decimal::ZERO
        }
    };
    round_currency(amount)
}

#[derive(Debug, Clone)]
pub struct SpiffMatch<'a> {
    pub spiff: &'a Spiff,
    pub item: &'a OrderLineItem,
    pub amount: Decimal,
}

fn lookup<'a>(index: &'a HashMap<String, Spiff>, item: &OrderLineItem) -> Option<&'a Spiff> {
    let candidates = [
        item.part_number.as_deref().unwrap_or(""),
        item.product_num.as_str(),
        item.product_name.as_str(),
    ];
    candidates
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .find_map(|k| index.get(k))
}

/// Spiffs earned by an order's line items; only positive payouts are returned
pub fn evaluate<'a>(
    index: &'a HashMap<String, Spiff>,
    items: &'a [OrderLineItem],
) -> Vec<SpiffMatch<'a>> {
    if index.is_empty() {
        return Vec::new();
    }
    items
        .iter()
        .filter_map(|item| {
            let spiff = lookup(index, item)?;
            let amount = spiff_amount(spiff, item);
            (amount > Decimal::ZERO).then_some(SpiffMatch {
                spiff,
                item,
                amount,
            })
        })
        .collect()
}
