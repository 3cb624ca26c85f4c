pub mod progress;
pub mod request;
pub mod response;

pub use progress::{CalcProgress, CalcStats, CalcStatus};
pub use request::{CalculateCommissionsRequest, DeleteMonthRequest};
pub use response::{CalculationStartResponse, DeleteMonthResponse};

use crate::usecases::common::UseCaseMetadata;

pub struct CalculateCommissions;

impl UseCaseMetadata for CalculateCommissions {
    fn usecase_index() -> &'static str {
        "u510"
    }

    fn usecase_name() -> &'static str {
        "calculate_commissions"
    }

    fn display_name() -> &'static str {
        "Calculate monthly commissions"
    }

    fn description() -> &'static str {
        "Rates every sales order of a commission month and rebuilds rep payouts"
    }
}
