use serde::{Deserialize, Serialize};

/// Customer record from the customer directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub account_number: Option<String>,
    pub customer_num: Option<String>,
    pub name: String,

    /// Raw account type ("Wholesale", "Distributor", "Retail", ...)
    pub account_type: Option<String>,

    /// Manual relationship override set from the admin UI
    pub transfer_status: Option<TransferStatus>,
}

/// Manual transfer-status override
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    Own,
    Transferred,
    Auto,
}

impl TransferStatus {
    pub fn code(&self) -> &'static str {
        match self {
            TransferStatus::Own => "own",
            TransferStatus::Transferred => "transferred",
            TransferStatus::Auto => "auto",
        }
    }

    /// Unknown or empty values are treated as `Auto`
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "own" => TransferStatus::Own,
            "transferred" => TransferStatus::Transferred,
            _ => TransferStatus::Auto,
        }
    }
}

impl Customer {
    /// Account type with the directory default applied
    pub fn account_type_or_default(&self) -> &str {
        match self.account_type.as_deref() {
            Some(t) if !t.trim().is_empty() => t,
            _ => "Retail",
        }
    }
}
