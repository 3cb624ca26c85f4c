use contracts::domain::a032_sales_rep::aggregate::SalesRep;
use contracts::domain::a033_commission_rate::aggregate::RateTable;
use contracts::domain::a034_commission_rules::aggregate::CommissionRules;
use contracts::domain::a035_spiff::aggregate::Spiff;
use contracts::usecases::u510_calculate_commissions::CalcStats;
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use std::collections::{BTreeMap, HashMap, HashSet};

use super::period::CommissionPeriod;
use crate::domain::a031_customer::service::CustomerDirectory;
use crate::domain::a032_sales_rep::service::RepDirectory;
use crate::shared::config::CommissionConfig;
use crate::shared::money::to_f64;

/// Reference data loaded once at the start of a run
pub struct ReferenceData {
    pub rate_tables: HashMap<String, RateTable>,
    pub rules: CommissionRules,
    /// Active spiffs keyed by product number
    pub spiffs: HashMap<String, Spiff>,
    pub customers: CustomerDirectory,
    pub reps: RepDirectory,
}

/// Accumulated counters of a run
#[derive(Debug, Default)]
pub struct RunTotals {
    pub stats: CalcStats,
    total_commission: Decimal,
    total_spiffs: Decimal,
    seen_orders: HashSet<String>,
    /// Display name per canonical rep key that earned something in this run
    rep_names: BTreeMap<String, String>,
}

impl RunTotals {
    /// False when the order id was already processed in this run
    pub fn first_sighting(&mut self, order_id: &str) -> bool {
        self.seen_orders.insert(order_id.to_string())
    }

    pub fn add_commission(&mut self, rep: &SalesRep, amount: Decimal) {
        self.note_rep(rep);
        self.total_commission += amount;
        self.stats.commissions_calculated += 1;
        self.stats.total_commission = to_f64(self.total_commission);
    }

    pub fn add_spiff(&mut self, rep: &SalesRep, amount: Decimal) {
        self.note_rep(rep);
        self.total_spiffs += amount;
        self.stats.spiffs_calculated += 1;
        self.stats.total_spiffs = to_f64(self.total_spiffs);
    }

    fn note_rep(&mut self, rep: &SalesRep) {
        self.rep_names
            .entry(rep.canonical_key().to_string())
            .or_insert_with(|| rep.name.clone());
    }

    pub fn rep_names(&self) -> &BTreeMap<String, String> {
        &self.rep_names
    }
}

/// All state of one calculation run, passed explicitly through every step
pub struct RunContext<'a> {
    pub db: &'a DatabaseConnection,
    pub settings: &'a CommissionConfig,
    pub calc_id: String,
    pub period: CommissionPeriod,
    /// Raw ERP rep string the run is restricted to
    pub sales_person_filter: Option<String>,
    pub reference: ReferenceData,
    pub totals: RunTotals,
}

impl<'a> RunContext<'a> {
    pub fn new(
        db: &'a DatabaseConnection,
        settings: &'a CommissionConfig,
        calc_id: String,
        period: CommissionPeriod,
        sales_person_filter: Option<String>,
        reference: ReferenceData,
    ) -> Self {
        Self {
            db,
            settings,
            calc_id,
            period,
            sales_person_filter,
            reference,
            totals: RunTotals::default(),
        }
    }

    /// Canonical rep key the purge and summaries are scoped to, if filtered
    pub fn scope_key(&self) -> Option<String> {
        self.sales_person_filter
            .as_deref()
            .map(|sp| self.reference.reps.canonical(sp))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rep(id: &str, sp: &str) -> SalesRep {
        SalesRep {
            id: id.into(),
            name: format!("Rep {}", id),
            sales_person: Some(sp.into()),
            title: "Account Executive".into(),
            aliases: vec![],
            is_active: true,
            is_commissioned: true,
        }
    }

    #[test]
    fn test_totals_accumulate_per_rep() {
        let mut totals = RunTotals::default();
        assert!(totals.first_sighting("so-1"));
        assert!(!totals.first_sighting("so-1"));

        let ben = rep("r1", "BenW");
        totals.add_commission(&ben, Decimal::new(5000, 2));
        totals.add_commission(&ben, Decimal::new(10, 2));
        totals.add_commission(&rep("r2", "Jared"), Decimal::new(20, 2));
        totals.add_spiff(&ben, Decimal::new(1000, 2));

        assert_eq!(totals.stats.commissions_calculated, 3);
        assert_eq!(totals.stats.total_commission, 50.3);
        assert_eq!(totals.stats.spiffs_calculated, 1);
        assert_eq!(totals.stats.total_spiffs, 10.0);

        let names = totals.rep_names();
        assert_eq!(names.len(), 2);
        assert_eq!(names["BenW"], "Rep r1");
        assert_eq!(names["Jared"], "Rep r2");
    }
}
