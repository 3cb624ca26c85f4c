use serde::{Deserialize, Serialize};

/// Relationship status of a customer relative to the rep on an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CustomerStatus {
    #[serde(rename = "new")]
    New,
    #[serde(rename = "own")]
    Own,
    #[serde(rename = "transferred")]
    Transferred,
    #[serde(rename = "6month")]
    SixMonth,
    #[serde(rename = "12month")]
    TwelveMonth,
}

impl CustomerStatus {
    /// Status token as written to records ("new", "own", "transferred", "6month", "12month")
    pub fn code(&self) -> &'static str {
        match self {
            CustomerStatus::New => "new",
            CustomerStatus::Own => "own",
            CustomerStatus::Transferred => "transferred",
            CustomerStatus::SixMonth => "6month",
            CustomerStatus::TwelveMonth => "12month",
        }
    }

    /// Status key used by rate tables
    pub fn rate_key(&self) -> &'static str {
        match self {
            CustomerStatus::New | CustomerStatus::Own => "new_business",
            CustomerStatus::Transferred => "transferred",
            CustomerStatus::SixMonth => "6_month_active",
            CustomerStatus::TwelveMonth => "12_month_active",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "new" => Some(CustomerStatus::New),
            "own" => Some(CustomerStatus::Own),
            "transferred" => Some(CustomerStatus::Transferred),
            "6month" => Some(CustomerStatus::SixMonth),
            "12month" => Some(CustomerStatus::TwelveMonth),
            _ => None,
        }
    }
}

impl std::fmt::Display for CustomerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
