use chrono::{NaiveDate, NaiveDateTime};

/// Storage format for order timestamps; lexical order equals chronological order
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn format_datetime(value: &NaiveDateTime) -> String {
    value.format(DATETIME_FORMAT).to_string()
}

pub fn format_date(value: &NaiveDate) -> String {
    value.format(DATE_FORMAT).to_string()
}

/// Accepts "YYYY-MM-DD HH:MM:SS", "YYYY-MM-DDTHH:MM:SS" and a bare "YYYY-MM-DD"
pub fn parse_datetime(value: &str) -> anyhow::Result<NaiveDateTime> {
    let value = value.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, DATETIME_FORMAT) {
        return Ok(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Ok(dt);
    }
    let date = parse_date(value)?;
    date.and_hms_opt(0, 0, 0)
        .ok_or_else(|| anyhow::anyhow!("Invalid date '{}'", value))
}

pub fn parse_date(value: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|e| anyhow::anyhow!("Invalid date '{}': {}", value, e))
}

/// Number with thousands separators, for log lines
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}
