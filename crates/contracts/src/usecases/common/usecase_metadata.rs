/// Identifies a use case in logs, job rows and routes
pub trait UseCaseMetadata {
    /// Index, e.g. "u510"
    fn usecase_index() -> &'static str;

    /// Technical name, e.g. "calculate_commissions"
    fn usecase_name() -> &'static str;

    fn display_name() -> &'static str;

    fn description() -> &'static str {
        ""
    }

    /// "u510_calculate_commissions"
    fn full_name() -> String {
        format!("{}_{}", Self::usecase_index(), Self::usecase_name())
    }
}
