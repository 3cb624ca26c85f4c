use crate::enums::segment::SegmentId;
use serde::{Deserialize, Serialize};

/// One configured rate: (title, segment, status) -> percentage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateEntry {
    pub title: String,
    pub segment_id: SegmentId,
    /// Stored status key: new_business, transferred, 6_month_active, 12_month_active
    pub status: String,
    pub percentage: f64,
    /// `None` counts as active
    pub active: Option<bool>,
}

impl RateEntry {
    pub fn is_active(&self) -> bool {
        self.active != Some(false)
    }
}

/// All rate entries for one rep title
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateTable {
    pub title: String,
    pub rates: Vec<RateEntry>,
}

impl RateTable {
    /// (segment, status) pairs that appear more than once
    pub fn duplicate_keys(&self) -> Vec<(SegmentId, String)> {
        let mut seen: Vec<(SegmentId, &str)> = Vec::new();
        let mut dups: Vec<(SegmentId, String)> = Vec::new();
        for r in &self.rates {
            let key = (r.segment_id, r.status.as_str());
            if seen.contains(&key) {
                if !dups.iter().any(|(s, st)| *s == key.0 && st == key.1) {
                    dups.push((key.0, key.1.to_string()));
                }
            } else {
                seen.push(key);
            }
        }
        dups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(segment: SegmentId, status: &str, pct: f64) -> RateEntry {
        RateEntry {
            title: "Account Executive".into(),
            segment_id: segment,
            status: status.into(),
            percentage: pct,
            active: None,
        }
    }

    #[test]
    fn test_duplicate_keys() {
        let table = RateTable {
            title: "Account Executive".into(),
            rates: vec![
                entry(SegmentId::Distributor, "new_business", 8.0),
                entry(SegmentId::Wholesale, "new_business", 8.0),
                entry(SegmentId::Distributor, "new_business", 6.0),
                entry(SegmentId::Distributor, "new_business", 4.0),
            ],
        };
        assert_eq!(
            table.duplicate_keys(),
            vec![(SegmentId::Distributor, "new_business".to_string())]
        );
    }
}
