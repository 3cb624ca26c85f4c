use chrono::Utc;
use contracts::domain::a030_sales_order::aggregate::SalesOrder;
use contracts::enums::segment::SegmentId;
use contracts::projections::p910_commission_records::dto::CommissionRecordDto;
use contracts::projections::p911_commission_summary::dto::{
    MonthlySummaryDto, RecalculateSummaryRequest,
};
use contracts::projections::p912_spiff_earnings::dto::SpiffEarningDto;
use contracts::projections::p913_calculation_log::dto::CalculationLogDto;
use contracts::usecases::u510_calculate_commissions::{
    CalcProgress, CalcStats, CalculateCommissionsRequest, CalculationStartResponse,
    DeleteMonthRequest, DeleteMonthResponse,
};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tokio::sync::Notify;
use uuid::Uuid;

use super::customer_history::{CustomerHistoryResolver, DbOrderHistory};
use super::error::CommissionError;
use super::period::CommissionPeriod;
use super::progress_tracker::{self, Cursor, ProgressReporter};
use super::rate_resolver::resolve_rate;
use super::recorder::CommissionRecorder;
use super::revenue::{commission_amount, commissionable_amount};
use super::run_context::{ReferenceData, RunContext};
use super::{job_queue, run_lock, spiff_engine};
use crate::domain::{
    a030_sales_order, a031_customer, a032_sales_rep, a033_commission_rate, a034_commission_rules,
    a035_spiff,
};
use crate::projections::{p910_commission_records, p911_commission_summary, p913_calculation_log};
use crate::shared::config::CommissionConfig;
use crate::shared::format::{format_datetime, format_number};
use crate::shared::money::{to_decimal, to_f64};

/// House orders entered under the admin account
pub fn is_admin_order(order: &SalesOrder) -> bool {
    order.sales_person.trim().eq_ignore_ascii_case("admin")
}

/// Orders placed through the web store
pub fn is_ecommerce_order(order: &SalesOrder) -> bool {
    let sp = order.sales_person.trim().to_uppercase();
    sp == "SHOPIFY" || sp == "COMMERCE" || order.order_num.starts_with("Sh")
}

fn normalize_filter(sales_person: Option<String>) -> Option<String> {
    sales_person
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Entry point of the use case: trigger, progress, purge and summary maintenance
pub struct CommissionExecutor {
    db: DatabaseConnection,
    settings: CommissionConfig,
    wake: Arc<Notify>,
}

impl CommissionExecutor {
    pub fn new(db: DatabaseConnection, settings: CommissionConfig, wake: Arc<Notify>) -> Self {
        Self { db, settings, wake }
    }

    /// Validates the request and queues the run; the calculation happens on the worker
    pub async fn trigger(
        &self,
        request: CalculateCommissionsRequest,
    ) -> Result<CalculationStartResponse, CommissionError> {
        let period = CommissionPeriod::parse(&request.month, request.year)?;
        let sales_person = normalize_filter(request.sales_person);
        let calc_id = format!("calc_{}", Uuid::new_v4());

        progress_tracker::create(&self.db, &calc_id, &period.commission_month).await?;
        job_queue::enqueue(
            &self.db,
            &calc_id,
            &period.commission_month,
            &format!("{:02}", period.month),
            period.year,
            sales_person.clone(),
        )
        .await?;
        self.wake.notify_one();

        tracing::info!(
            "Queued commission run {} for {}{}",
            calc_id,
            period.commission_month,
            sales_person
                .as_deref()
                .map(|sp| format!(" ({})", sp))
                .unwrap_or_default()
        );

        Ok(CalculationStartResponse {
            calc_id,
            commission_month: period.commission_month.clone(),
            processing: true,
            message: format!(
                "Commission calculation for {} started",
                period.commission_month
            ),
        })
    }

    pub async fn get_progress(&self, calc_id: &str) -> Result<CalcProgress, CommissionError> {
        progress_tracker::get(&self.db, calc_id)
            .await?
            .ok_or_else(|| CommissionError::NotFound(format!("Calculation {} not found", calc_id)))
    }

    /// Deletes a month's commission records and logs ahead of a manual recompute
    pub async fn delete_month(
        &self,
        request: DeleteMonthRequest,
    ) -> Result<DeleteMonthResponse, CommissionError> {
        let period = CommissionPeriod::parse(&request.month, request.year)?;
        let month = period.commission_month.as_str();

        let lock_id = format!("delete_{}", Uuid::new_v4());
        if !run_lock::try_acquire(&self.db, month, &lock_id).await? {
            return Err(CommissionError::RunInProgress(month.to_string()));
        }
        let result = self.delete_month_locked(month, request.include_overrides).await;
        if let Err(e) = run_lock::release(&self.db, month, &lock_id).await {
            tracing::error!("Failed to release lock of {}: {}", month, e);
        }
        result
    }

    async fn delete_month_locked(
        &self,
        month: &str,
        include_overrides: bool,
    ) -> Result<DeleteMonthResponse, CommissionError> {
        let chunk = self.settings.delete_chunk_size;
        let commissions_deleted = p910_commission_records::repository::delete_month_in_chunks(
            &self.db,
            month,
            None,
            include_overrides,
            chunk,
        )
        .await?;
        let logs_deleted =
            p913_calculation_log::repository::delete_month_in_chunks(&self.db, month, None, chunk)
                .await?;
        let overrides_preserved =
            p910_commission_records::repository::count_overrides(&self.db, month, None).await?;

        tracing::info!(
            "Deleted {} commissions and {} logs of {} ({} overrides kept)",
            commissions_deleted,
            logs_deleted,
            month,
            overrides_preserved
        );
        Ok(DeleteMonthResponse {
            commission_month: month.to_string(),
            commissions_deleted,
            logs_deleted,
            overrides_preserved,
            message: format!(
                "Deleted {} commission records and {} calculation logs",
                commissions_deleted, logs_deleted
            ),
        })
    }

    /// Rebuilds one rep's summary from stored records
    pub async fn recalculate_summary(
        &self,
        request: RecalculateSummaryRequest,
    ) -> Result<MonthlySummaryDto, CommissionError> {
        let period = CommissionPeriod::from_commission_month(&request.month)
            .or_else(|_| CommissionPeriod::parse(&request.month, request.year))?;
        let rep = a032_sales_rep::repository::get_by_id(&self.db, &request.rep_id)
            .await?
            .ok_or_else(|| CommissionError::NotFound(format!("Rep {} not found", request.rep_id)))?;

        p911_commission_summary::service::recalculate_for_rep(
            &self.db,
            rep.canonical_key(),
            &rep.name,
            &period.commission_month,
            period.year,
        )
        .await?
        .ok_or_else(|| {
            CommissionError::NotFound(format!(
                "No commission records for {} in {}",
                rep.name, period.commission_month
            ))
        })
    }
}

/// Runs one calculation to completion and records the outcome on its progress row
pub async fn run_calculation(
    db: &DatabaseConnection,
    settings: &CommissionConfig,
    calc_id: &str,
    request: &CalculateCommissionsRequest,
) -> Result<CalcStats, CommissionError> {
    let started = std::time::Instant::now();
    let period = match CommissionPeriod::parse(&request.month, request.year) {
        Ok(p) => p,
        Err(e) => {
            if let Err(pe) = progress_tracker::mark_failed(db, calc_id, &e.to_string()).await {
                tracing::warn!("Could not mark {} failed: {}", calc_id, pe);
            }
            return Err(e);
        }
    };
    progress_tracker::create(db, calc_id, &period.commission_month).await?;
    let mut reporter = ProgressReporter::new(db, calc_id, settings.progress_every);

    let mut stats = CalcStats::default();
    let filter = normalize_filter(request.sales_person.clone());
    let result = execute(db, settings, calc_id, period, filter, &mut reporter, &mut stats).await;

    match result {
        Ok(()) => {
            reporter.complete(&stats).await?;
            tracing::info!(
                "Commission run {} complete in {:?}: {} commissions ({:.2}), {} spiffs ({:.2}), skipped admin {} / e-commerce {} / retail {} / rep {} / zero qty {} / duplicate {}",
                calc_id,
                started.elapsed(),
                stats.commissions_calculated,
                stats.total_commission,
                stats.spiffs_calculated,
                stats.total_spiffs,
                stats.admin_skipped,
                stats.shopify_skipped,
                stats.retail_skipped,
                stats.inactive_rep_skipped,
                stats.zero_quantity_skipped,
                stats.duplicate_skipped
            );
            Ok(stats)
        }
        Err(e) => {
            tracing::error!("Commission run {} failed: {}", calc_id, e);
            if let Err(pe) = reporter.fail(&stats, &e.to_string()).await {
                tracing::warn!("Could not mark {} failed: {}", calc_id, pe);
            }
            Err(e)
        }
    }
}

async fn load_reference(
    db: &DatabaseConnection,
    period: &CommissionPeriod,
) -> Result<ReferenceData, CommissionError> {
    let rate_tables = a033_commission_rate::service::load_rate_tables(db).await?;
    if rate_tables.is_empty() {
        return Err(CommissionError::Configuration(
            "No commission rate tables configured".to_string(),
        ));
    }
    let duplicates = a033_commission_rate::service::find_duplicates(&rate_tables);
    if !duplicates.is_empty() {
        return Err(CommissionError::Configuration(format!(
            "Duplicate rate entries: {}",
            duplicates.join(", ")
        )));
    }

    Ok(ReferenceData {
        rate_tables,
        rules: a034_commission_rules::repository::load_or_default(db).await?,
        spiffs: a035_spiff::service::active_for_period(db, period.start, period.end).await?,
        customers: a031_customer::service::load_directory(db).await?,
        reps: a032_sales_rep::service::load_directory(db).await?,
    })
}

async fn execute(
    db: &DatabaseConnection,
    settings: &CommissionConfig,
    calc_id: &str,
    period: CommissionPeriod,
    filter: Option<String>,
    reporter: &mut ProgressReporter<'_>,
    stats_out: &mut CalcStats,
) -> Result<(), CommissionError> {
    let reference = load_reference(db, &period).await?;
    let mut ctx = RunContext::new(db, settings, calc_id.to_string(), period, filter, reference);
    let result = process_month(&mut ctx, reporter).await;
    *stats_out = ctx.totals.stats.clone();
    result
}

async fn process_month(
    ctx: &mut RunContext<'_>,
    reporter: &mut ProgressReporter<'_>,
) -> Result<(), CommissionError> {
    let db = ctx.db;
    let month = ctx.period.commission_month.clone();
    let scope = ctx.scope_key();
    let recorder = CommissionRecorder::new(db);

    recorder
        .purge_month(&month, scope.as_deref(), ctx.settings.delete_chunk_size)
        .await?;

    let spellings = match ctx.sales_person_filter.as_deref() {
        Some(filter) => {
            let used = a030_sales_order::repository::distinct_sales_people(db, &month).await?;
            let names = ctx.reference.reps.spellings_of(filter, used);
            tracing::info!(
                "Run {}: rep filter '{}' matches order spellings {:?}",
                ctx.calc_id,
                filter,
                names
            );
            Some(names)
        }
        None => None,
    };
    let total = match spellings.as_deref() {
        Some([]) => 0,
        names => a030_sales_order::repository::count_for_month(db, &month, names).await? as usize,
    };
    reporter.set_total(total).await;
    tracing::info!(
        "Run {}: {} orders to rate for {}",
        ctx.calc_id,
        format_number(total),
        month
    );

    let page_size = ctx.settings.order_page_size.max(1);
    let mut offset = 0u64;
    let mut processed = 0usize;
    while processed < total {
        let page = a030_sales_order::repository::list_for_month_page(
            db,
            &month,
            spellings.as_deref(),
            offset,
            page_size,
        )
        .await?;
        if page.is_empty() {
            break;
        }
        offset += page.len() as u64;

        for order in &page {
            process_order(ctx, &recorder, order).await?;
            processed += 1;
            let cursor = Cursor {
                rep: &order.sales_person,
                customer: &order.customer_name,
                order_num: &order.order_num,
            };
            reporter
                .checkpoint(processed, &cursor, &ctx.totals.stats)
                .await;
        }
    }

    let written = recorder
        .write_summaries(&month, ctx.period.year, scope.as_deref(), ctx.totals.rep_names())
        .await?;
    tracing::info!("Run {}: {} rep summaries written", ctx.calc_id, written);
    Ok(())
}

/// Rates one order; skips are counted, not errors
async fn process_order(
    ctx: &mut RunContext<'_>,
    recorder: &CommissionRecorder<'_>,
    order: &SalesOrder,
) -> Result<(), CommissionError> {
    let db = ctx.db;
    let settings = ctx.settings;
    let period = &ctx.period;
    let reference = &ctx.reference;
    let totals = &mut ctx.totals;

    if !totals.first_sighting(&order.id) {
        totals.stats.duplicate_skipped += 1;
        tracing::debug!("Order {} ({}) seen twice, skipped", order.order_num, order.id);
        return Ok(());
    }

    let items = a030_sales_order::line_items::list_by_order(db, &order.id).await?;
    let quantity: Decimal = items.iter().map(|i| to_decimal(i.quantity)).sum();
    let fulfilled = items.iter().any(|i| i.quantity > 0.0);
    if !fulfilled || quantity.is_zero() {
        totals.stats.zero_quantity_skipped += 1;
        tracing::debug!("Order {} has nothing fulfilled, skipped", order.order_num);
        return Ok(());
    }

    if is_admin_order(order) {
        totals.stats.admin_skipped += 1;
        return Ok(());
    }
    if is_ecommerce_order(order) {
        totals.stats.shopify_skipped += 1;
        return Ok(());
    }

    let rep = match reference.reps.resolve(&order.sales_person) {
        Some(rep) if rep.is_eligible() => rep,
        Some(rep) => {
            totals.stats.inactive_rep_skipped += 1;
            tracing::warn!(
                "Order {}: rep {} is inactive or not commissioned, skipped",
                order.order_num,
                rep.name
            );
            return Ok(());
        }
        None => {
            totals.stats.inactive_rep_skipped += 1;
            tracing::warn!(
                "Order {}: rep '{}' not found, skipped",
                order.order_num,
                order.sales_person
            );
            return Ok(());
        }
    };

    let customer = reference
        .customers
        .find(&order.customer_id, &order.customer_name);
    if customer.is_none() {
        totals.stats.customers_defaulted += 1;
        tracing::warn!(
            "Order {}: customer {} ({}) not found, account type defaults to Retail",
            order.order_num,
            order.customer_id,
            order.customer_name
        );
    }
    let account_type = customer
        .map(|c| c.account_type_or_default())
        .unwrap_or("Retail")
        .to_string();
    let segment = SegmentId::from_account_type(&account_type);
    if segment == SegmentId::Retail {
        totals.stats.retail_skipped += 1;
        return Ok(());
    }

    let history = DbOrderHistory::new(db);
    let resolver = CustomerHistoryResolver::new(
        &history,
        &reference.reps,
        &reference.rules,
        settings.month_policy,
        settings.history_window,
    );
    let status = resolver.classify(customer, order).await;

    let rate = resolve_rate(&reference.rate_tables, &rep.title, &account_type, status);
    if rate.rate <= 0.0 {
        tracing::warn!(
            "Order {}: rate 0 for {}/{}/{}, no commission written",
            order.order_num,
            rep.title,
            segment.code(),
            status
        );
        return Ok(());
    }

    let base = commissionable_amount(order, &items, &reference.rules);
    let amount = commission_amount(base, rate.rate);

    let sales_person = rep.canonical_key().to_string();
    let calculated_at = Utc::now().to_rfc3339();
    let order_date = format_datetime(&order.posting_date);
    let order_value = order.order_value.or(order.revenue).unwrap_or(0.0);
    let notes = format!(
        "{} {} customer, {}% {} rate",
        status,
        segment.code(),
        rate.rate,
        rate.source()
    );

    let record = CommissionRecordDto {
        id: CommissionRecordDto::record_id(&sales_person, &period.commission_month, &order.id),
        rep_id: rep.id.clone(),
        sales_person: sales_person.clone(),
        rep_name: rep.name.clone(),
        rep_title: rep.title.clone(),
        order_id: order.id.clone(),
        order_num: order.order_num.clone(),
        customer_id: order.customer_id.clone(),
        customer_name: order.customer_name.clone(),
        account_type: account_type.clone(),
        customer_segment: segment.code().to_string(),
        customer_status: status.code().to_string(),
        order_revenue: to_f64(base),
        order_value,
        commission_rate: rate.rate,
        commission_amount: to_f64(amount),
        rate_source: rate.source().to_string(),
        order_date: order_date.clone(),
        commission_month: period.commission_month.clone(),
        commission_year: period.year,
        calculated_at: calculated_at.clone(),
        paid_status: "pending".to_string(),
        notes: notes.clone(),
        is_override: false,
        override_reason: None,
        manual_adjustment: None,
    };
    let recorded = recorder.record(&record).await?;

    recorder
        .write_log(&CalculationLogDto {
            id: CalculationLogDto::log_id(&period.commission_month, &order.id),
            commission_month: period.commission_month.clone(),
            order_num: order.order_num.clone(),
            order_id: order.id.clone(),
            customer_name: order.customer_name.clone(),
            rep_name: rep.name.clone(),
            rep_title: rep.title.clone(),
            sales_person: sales_person.clone(),
            customer_segment: segment.code().to_string(),
            customer_status: status.code().to_string(),
            account_type,
            order_amount: to_f64(base),
            commission_rate: rate.rate,
            commission_amount: to_f64(recorded.amount),
            rate_source: rate.source().to_string(),
            calculated_at: calculated_at.clone(),
            order_date: order_date.clone(),
            notes,
        })
        .await?;
    if recorded.is_override {
        tracing::debug!(
            "Order {}: override {} kept at {:.2}",
            order.order_num,
            recorded.record_id,
            recorded.amount
        );
    }
    totals.add_commission(rep, recorded.amount);

    for m in spiff_engine::evaluate(&reference.spiffs, &items) {
        let earning = SpiffEarningDto {
            id: SpiffEarningDto::earning_id(&sales_person, &period.commission_month, &m.item.id),
            rep_id: rep.id.clone(),
            sales_person: sales_person.clone(),
            rep_name: rep.name.clone(),
            spiff_id: m.spiff.id.clone(),
            spiff_name: m.spiff.name.clone(),
            product_num: m.spiff.product_num.clone(),
            product_description: m
                .item
                .description
                .clone()
                .unwrap_or_else(|| m.item.product_name.clone()),
            order_id: order.id.clone(),
            order_num: order.order_num.clone(),
            customer_id: order.customer_id.clone(),
            customer_name: order.customer_name.clone(),
            line_item_id: m.item.id.clone(),
            quantity: m.item.quantity,
            line_revenue: m.item.total_price,
            incentive_type: m.spiff.incentive_type.clone(),
            incentive_value: m.spiff.incentive_value,
            spiff_amount: to_f64(m.amount),
            order_date: order_date.clone(),
            commission_month: period.commission_month.clone(),
            commission_year: period.year,
            calculated_at: calculated_at.clone(),
            paid_status: "pending".to_string(),
        };
        recorder.write_spiff(&earning).await?;
        totals.add_spiff(rep, m.amount);
    }

    Ok(())
}
