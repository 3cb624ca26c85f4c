pub mod p910_commission_records;
pub mod p911_commission_summary;
pub mod p912_spiff_earnings;
pub mod p913_calculation_log;
