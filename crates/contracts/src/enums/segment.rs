use serde::{Deserialize, Serialize};

/// Customer segment used by rate tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentId {
    Wholesale,
    Distributor,
    Retail,
}

impl SegmentId {
    pub fn code(&self) -> &'static str {
        match self {
            SegmentId::Wholesale => "wholesale",
            SegmentId::Distributor => "distributor",
            SegmentId::Retail => "retail",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "wholesale" => Some(SegmentId::Wholesale),
            "distributor" => Some(SegmentId::Distributor),
            "retail" => Some(SegmentId::Retail),
            _ => None,
        }
    }

    /// Maps a raw account type by case-insensitive substring, defaulting to distributor
    pub fn from_account_type(account_type: &str) -> Self {
        let lower = account_type.to_lowercase();
        if lower.contains("wholesale") {
            SegmentId::Wholesale
        } else if lower.contains("distributor") {
            SegmentId::Distributor
        } else if lower.contains("retail") {
            SegmentId::Retail
        } else {
            SegmentId::Distributor
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_account_type() {
        assert_eq!(SegmentId::from_account_type("Wholesale"), SegmentId::Wholesale);
        assert_eq!(SegmentId::from_account_type("DISTRIBUTOR"), SegmentId::Distributor);
        assert_eq!(SegmentId::from_account_type("Retail Chain"), SegmentId::Retail);
        assert_eq!(SegmentId::from_account_type("Key Account"), SegmentId::Distributor);
        assert_eq!(SegmentId::from_account_type(""), SegmentId::Distributor);
    }
}
