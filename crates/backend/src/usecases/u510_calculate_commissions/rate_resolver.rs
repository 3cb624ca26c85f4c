use contracts::domain::a033_commission_rate::aggregate::RateTable;
use contracts::enums::customer_status::CustomerStatus;
use contracts::enums::segment::SegmentId;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateResolution {
    /// Percentage, e.g. 5.0 for 5%
    pub rate: f64,
    /// False when the fixed fallback table supplied the rate
    pub found: bool,
}

impl RateResolution {
    pub fn source(&self) -> &'static str {
        if self.found {
            "configured"
        } else {
            "default"
        }
    }
}

/// Hardcoded rates used when a title has no matching active entry
pub fn fallback_rate(segment: SegmentId, status_key: &str) -> f64 {
    match (status_key, segment) {
        ("new_business", _) => 8.0,
        ("transferred", _) => 2.0,
        ("6_month_active", SegmentId::Distributor) => 5.0,
        ("12_month_active", SegmentId::Distributor) => 3.0,
        ("6_month_active", SegmentId::Wholesale) => 7.0,
        ("12_month_active", SegmentId::Wholesale) => 5.0,
        _ => 2.0,
    }
}

/// Commission percentage for (rep title, customer account type, relationship status)
pub fn resolve_rate(
    tables: &HashMap<String, RateTable>,
    title: &str,
    account_type: &str,
    status: CustomerStatus,
) -> RateResolution {
    let segment = SegmentId::from_account_type(account_type);
    let status_key = status.rate_key();

    if segment == SegmentId::Retail {
        tracing::warn!(
            "Retail account type '{}' reached rating for title '{}'; rate forced to 0",
            account_type,
            title
        );
        return RateResolution {
            rate: 0.0,
            found: true,
        };
    }

    let configured = tables.get(title).and_then(|table| {
        table
            .rates
            .iter()
            .find(|r| r.segment_id == segment && r.status == status_key && r.is_active())
    });

    match configured {
        Some(entry) => RateResolution {
            rate: entry.percentage,
            found: true,
        },
        None => {
            let rate = fallback_rate(segment, status_key);
            tracing::debug!(
                "No rate for {}/{}/{}; fallback {}%",
                title,
                segment.code(),
                status_key,
                rate
            );
            RateResolution { rate, found: false }
        }
    }
}
