use anyhow::Result;
use contracts::projections::p910_commission_records::dto::CommissionRecordDto;
use contracts::projections::p912_spiff_earnings::dto::SpiffEarningDto;
use contracts::projections::p913_calculation_log::dto::CalculationLogDto;
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use std::collections::{BTreeMap, HashMap};

use crate::projections::p910_commission_records::repository::{self as records, UpsertOutcome};
use crate::projections::p911_commission_summary::{repository as summaries, service::summarize};
use crate::projections::p912_spiff_earnings::repository as spiff_earnings;
use crate::projections::p913_calculation_log::repository as calc_logs;
use crate::shared::money::to_decimal;

/// Result of writing one order's commission
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCommission {
    pub record_id: String,
    /// Amount that is live after the write; the frozen amount for overrides
    pub amount: Decimal,
    pub is_override: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeCounts {
    pub commissions: u64,
    pub logs: u64,
    pub summaries: u64,
    pub spiffs: u64,
}

/// Persists commission output of a run
pub struct CommissionRecorder<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> CommissionRecorder<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Removes prior non-override output of a month before it is rebuilt
    pub async fn purge_month(
        &self,
        commission_month: &str,
        scope: Option<&str>,
        chunk_size: u64,
    ) -> Result<PurgeCounts> {
        let counts = PurgeCounts {
            commissions: records::delete_month_in_chunks(
                self.db,
                commission_month,
                scope,
                false,
                chunk_size,
            )
            .await?,
            logs: calc_logs::delete_month_in_chunks(self.db, commission_month, scope, chunk_size)
                .await?,
            summaries: summaries::delete_month(self.db, commission_month, scope).await?,
            spiffs: spiff_earnings::delete_month(self.db, commission_month, scope).await?,
        };
        tracing::info!(
            "Purged {}: {} commissions, {} logs, {} summaries, {} spiff earnings",
            commission_month,
            counts.commissions,
            counts.logs,
            counts.summaries,
            counts.spiffs
        );
        Ok(counts)
    }

    /// Idempotent write keyed by (rep, month, order); overrides keep their amount
    pub async fn record(&self, record: &CommissionRecordDto) -> Result<RecordedCommission> {
        if let Some(existing) =
            records::find_override_for_order(self.db, &record.commission_month, &record.order_id)
                .await?
        {
            if existing.id != record.id {
                tracing::warn!(
                    "Order {} already has override {} under {}; not creating {}",
                    record.order_num,
                    existing.id,
                    existing.sales_person,
                    record.id
                );
                return Ok(RecordedCommission {
                    record_id: existing.id,
                    amount: to_decimal(existing.commission_amount),
                    is_override: true,
                });
            }
        }

        let outcome = records::upsert_computed(self.db, record).await?;
        Ok(match outcome {
            UpsertOutcome::OverridePreserved(frozen) => {
                tracing::info!(
                    "Override {} preserved at {:.2} (computed {:.2})",
                    record.id,
                    frozen,
                    record.commission_amount
                );
                RecordedCommission {
                    record_id: record.id.clone(),
                    amount: to_decimal(frozen),
                    is_override: true,
                }
            }
            UpsertOutcome::Inserted | UpsertOutcome::Updated => RecordedCommission {
                record_id: record.id.clone(),
                amount: to_decimal(record.commission_amount),
                is_override: false,
            },
        })
    }

    pub async fn write_log(&self, log: &CalculationLogDto) -> Result<()> {
        calc_logs::upsert(self.db, log).await
    }

    pub async fn write_spiff(&self, earning: &SpiffEarningDto) -> Result<()> {
        spiff_earnings::upsert(self.db, earning).await
    }

    /// Rebuilds the month's summaries from stored records, one per canonical rep.
    /// Reps only holding surviving overrides get a summary too.
    pub async fn write_summaries(
        &self,
        commission_month: &str,
        year: i32,
        scope: Option<&str>,
        rep_names: &BTreeMap<String, String>,
    ) -> Result<usize> {
        let all_records = records::list_for_month(self.db, commission_month, scope).await?;
        let all_spiffs = spiff_earnings::list_for_month(self.db, commission_month, scope).await?;

        let mut by_rep: BTreeMap<&str, Vec<CommissionRecordDto>> = BTreeMap::new();
        for r in &all_records {
            by_rep.entry(r.sales_person.as_str()).or_default().push(r.clone());
        }
        let mut spiffs_by_rep: HashMap<&str, Vec<SpiffEarningDto>> = HashMap::new();
        for s in &all_spiffs {
            spiffs_by_rep
                .entry(s.sales_person.as_str())
                .or_default()
                .push(s.clone());
        }

        for (sales_person, rep_records) in &by_rep {
            let rep_name = rep_names
                .get(*sales_person)
                .cloned()
                .or_else(|| rep_records.first().map(|r| r.rep_name.clone()))
                .unwrap_or_default();
            let spiffs = spiffs_by_rep
                .get(sales_person)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            let summary = summarize(
                sales_person,
                &rep_name,
                commission_month,
                year,
                rep_records,
                spiffs,
            );
            summaries::upsert(self.db, &summary).await?;
            tracing::info!(
                "{} {}: {} orders, commission {:.2}, spiffs {:.2}",
                commission_month,
                sales_person,
                summary.total_orders,
                summary.total_commission,
                summary.total_spiffs
            );
        }
        Ok(by_rep.len())
    }
}
