use contracts::domain::a030_sales_order::aggregate::{OrderLineItem, SalesOrder};
use contracts::domain::a034_commission_rules::aggregate::CommissionRules;
use rust_decimal::Decimal;

use crate::shared::money::{percent_of, round_currency, to_decimal};

fn item_text(item: &OrderLineItem) -> (String, String) {
    (item.product_name.to_lowercase(), item.product_num.to_lowercase())
}

pub fn is_shipping(item: &OrderLineItem) -> bool {
    let (name, num) = item_text(item);
    name.contains("shipping") || num.contains("shipping")
}

pub fn is_cc_processing(item: &OrderLineItem) -> bool {
    let (name, num) = item_text(item);
    [name, num]
        .iter()
        .any(|s| s.contains("cc processing") || s.contains("credit card processing"))
}

/// Amount carried on the order header
pub fn header_amount(order: &SalesOrder, rules: &CommissionRules) -> Decimal {
    let value = if rules.use_order_value {
        order.order_value.or(order.revenue)
    } else {
        order.revenue
    };
    value.map(to_decimal).unwrap_or(Decimal::ZERO)
}

/// Line-item sum honoring the exclusion rules. Credits always count.
pub fn line_item_amount(items: &[OrderLineItem], rules: &CommissionRules) -> Decimal {
    items
        .iter()
        .filter(|item| {
            if item.total_price < 0.0 {
                return true;
            }
            if rules.exclude_shipping && is_shipping(item) {
                return false;
            }
            if rules.exclude_cc_processing && is_cc_processing(item) {
                return false;
            }
            true
        })
        .map(|item| to_decimal(item.total_price))
        .sum()
}

/// Commissionable base of an order.
///
/// The header amount is used as is only when no exclusion is active and it is non-zero;
/// otherwise the line-item sum replaces it, even when that sum is zero.
pub fn commissionable_amount(
    order: &SalesOrder,
    items: &[OrderLineItem],
    rules: &CommissionRules,
) -> Decimal {
    let base = header_amount(order, rules);
    if rules.exclude_shipping || rules.exclude_cc_processing || base.is_zero() {
        round_currency(line_item_amount(items, rules))
    } else {
        round_currency(base)
    }
}

/// `round(base * rate / 100)` to cents
pub fn commission_amount(base: Decimal, rate: f64) -> Decimal {
    round_currency(percent_of(base, to_decimal(rate)))
}
