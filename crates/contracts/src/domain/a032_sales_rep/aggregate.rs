use serde::{Deserialize, Serialize};

/// Sales rep from the rep directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesRep {
    pub id: String,
    /// Full name, e.g. "Ben Wallner"
    pub name: String,
    /// Canonical ERP username, e.g. "BenW"
    pub sales_person: Option<String>,
    /// Drives rate table selection, e.g. "Account Executive"
    pub title: String,
    /// Additional spellings seen in ERP exports
    #[serde(default)]
    pub aliases: Vec<String>,
    pub is_active: bool,
    pub is_commissioned: bool,
}

impl SalesRep {
    /// Identity used to key monthly summaries
    pub fn canonical_key(&self) -> &str {
        match self.sales_person.as_deref() {
            Some(sp) if !sp.trim().is_empty() => sp,
            _ => &self.name,
        }
    }

    pub fn first_name(&self) -> Option<&str> {
        self.name.split_whitespace().next()
    }

    pub fn is_eligible(&self) -> bool {
        self.is_active && self.is_commissioned
    }
}
