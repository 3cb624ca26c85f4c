use chrono::NaiveDate;

use super::error::CommissionError;

/// Target month of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommissionPeriod {
    pub month: u32,
    pub year: i32,
    /// "YYYY-MM"
    pub commission_month: String,
    pub start: NaiveDate,
    /// Last day of the month, inclusive
    pub end: NaiveDate,
}

impl CommissionPeriod {
    /// Accepts "06" or "6" for the month
    pub fn parse(month: &str, year: i32) -> Result<Self, CommissionError> {
        let month_str = month.trim();
        if month_str.is_empty() {
            return Err(CommissionError::validation("Month and year are required"));
        }
        let month: u32 = month_str
            .parse()
            .map_err(|_| CommissionError::validation(format!("Invalid month '{}'", month_str)))?;
        if !(1..=12).contains(&month) {
            return Err(CommissionError::validation(format!(
                "Month must be between 1 and 12, got {}",
                month
            )));
        }
        if !(2000..=2100).contains(&year) {
            return Err(CommissionError::validation(format!("Invalid year {}", year)));
        }

        let invalid = || CommissionError::validation(format!("Invalid period {}-{}", year, month));
        let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
        let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
        let end = NaiveDate::from_ymd_opt(next_year, next_month, 1)
            .and_then(|d| d.pred_opt())
            .ok_or_else(invalid)?;

        Ok(Self {
            month,
            year,
            commission_month: format!("{:04}-{:02}", year, month),
            start,
            end,
        })
    }

    /// Period from a stored "YYYY-MM" key
    pub fn from_commission_month(key: &str) -> Result<Self, CommissionError> {
        let invalid = || CommissionError::validation(format!("Invalid commission month '{}'", key));
        let (year, month) = key.split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        Self::parse(month, year)
    }
}
