use chrono::{NaiveDate, NaiveDateTime};
use contracts::domain::a030_sales_order::aggregate::{OrderLineItem, SalesOrder};
use contracts::domain::a031_customer::aggregate::Customer;
use contracts::domain::a032_sales_rep::aggregate::SalesRep;
use contracts::domain::a033_commission_rate::aggregate::RateEntry;
use contracts::domain::a035_spiff::aggregate::Spiff;
use contracts::enums::segment::SegmentId;
use contracts::projections::p911_commission_summary::dto::RecalculateSummaryRequest;
use contracts::usecases::u510_calculate_commissions::{
    CalcStatus, CalculateCommissionsRequest, DeleteMonthRequest,
};
use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement};
use std::sync::Arc;
use tokio::sync::Notify;

use super::error::CommissionError;
use super::executor::{run_calculation, CommissionExecutor};
use super::worker::CalcJobWorker;
use super::{job_queue, progress_tracker, run_lock};
use crate::domain::{
    a030_sales_order, a031_customer, a032_sales_rep, a033_commission_rate, a035_spiff,
};
use crate::projections::p910_commission_records::repository::OVERRIDE_NOTE;
use crate::projections::{
    p910_commission_records, p911_commission_summary, p912_spiff_earnings, p913_calculation_log,
};
use crate::shared::config::CommissionConfig;
use crate::shared::data::db::connect_in_memory;

const MONTH: &str = "2024-06";
const BEN_RECORD: &str = "BenW_2024-06_order_so-1";

fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap()
}

fn request() -> CalculateCommissionsRequest {
    CalculateCommissionsRequest {
        month: "06".into(),
        year: 2024,
        sales_person: None,
    }
}

fn rep(id: &str, name: &str, sp: &str, active: bool) -> SalesRep {
    SalesRep {
        id: id.into(),
        name: name.into(),
        sales_person: Some(sp.into()),
        title: "Account Executive".into(),
        aliases: vec![],
        is_active: active,
        is_commissioned: true,
    }
}

fn customer(id: &str, name: &str, account_type: &str) -> Customer {
    Customer {
        id: id.into(),
        account_number: None,
        customer_num: None,
        name: name.into(),
        account_type: Some(account_type.into()),
        transfer_status: None,
    }
}

fn rate(segment: SegmentId, status: &str, percentage: f64) -> RateEntry {
    RateEntry {
        title: "Account Executive".into(),
        segment_id: segment,
        status: status.into(),
        percentage,
        active: Some(true),
    }
}

async fn order(
    db: &DatabaseConnection,
    id: &str,
    order_num: &str,
    customer: (&str, &str),
    sales_person: &str,
    posted: NaiveDateTime,
    lines: &[(&str, &str, f64, f64)],
) {
    let total: f64 = lines.iter().map(|l| l.3).sum();
    a030_sales_order::repository::upsert(
        db,
        &SalesOrder {
            id: id.into(),
            order_num: order_num.into(),
            customer_id: customer.0.into(),
            customer_name: customer.1.into(),
            sales_person: sales_person.into(),
            posting_date: posted,
            commission_month: posted.format("%Y-%m").to_string(),
            revenue: Some(total),
            order_value: Some(total),
        },
    )
    .await
    .unwrap();
    for (n, (product_num, product_name, quantity, price)) in lines.iter().enumerate() {
        a030_sales_order::line_items::upsert(
            db,
            &OrderLineItem {
                id: format!("{}-li-{}", id, n + 1),
                sales_order_id: id.into(),
                product_num: product_num.to_string(),
                part_number: None,
                product_name: product_name.to_string(),
                description: None,
                quantity: *quantity,
                total_price: *price,
            },
        )
        .await
        .unwrap();
    }
}

async fn seed_reference(db: &DatabaseConnection) {
    for r in [
        rep("rep-ben", "Ben Wallner", "BenW", true),
        rep("rep-old", "Olga Ortiz", "OldRep", false),
    ] {
        a032_sales_rep::repository::upsert(db, &r).await.unwrap();
    }
    for c in [
        customer("c-dist", "Acme Supply", "Distributor"),
        customer("c-whole", "Bulk Barn", "Wholesale"),
        customer("c-retail", "Corner Shop", "Retail"),
        customer("c-other", "Other Co", "Distributor"),
    ] {
        a031_customer::repository::upsert(db, &c).await.unwrap();
    }
    for r in [
        rate(SegmentId::Distributor, "6_month_active", 5.0),
        rate(SegmentId::Distributor, "new_business", 8.0),
        rate(SegmentId::Wholesale, "new_business", 10.0),
    ] {
        a033_commission_rate::repository::upsert(db, &r).await.unwrap();
    }
}

async fn seed_spiff(db: &DatabaseConnection, active: bool) {
    a035_spiff::repository::upsert(
        db,
        &Spiff {
            id: "spiff-widget".into(),
            name: "Widget push".into(),
            product_num: "P-100".into(),
            incentive_type: "Flat $".into(),
            incentive_value: 2.0,
            start_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            end_date: None,
            is_active: active,
        },
    )
    .await
    .unwrap();
}

/// Two commissionable June orders for BenW plus one order per skip reason
async fn seed_month(db: &DatabaseConnection) {
    seed_reference(db).await;
    seed_spiff(db, true).await;

    let dist = ("c-dist", "Acme Supply");
    let other = ("c-other", "Other Co");
    // history of c-dist: first order eight months back, last one in May with the same rep
    order(
        db,
        "so-prev-1",
        "8001",
        dist,
        "BenW",
        at(2023, 10, 1),
        &[("P-100", "Widget", 1.0, 100.0)],
    )
    .await;
    order(
        db,
        "so-prev-2",
        "8002",
        dist,
        "BenW",
        at(2024, 5, 1),
        &[("P-100", "Widget", 1.0, 100.0)],
    )
    .await;

    order(
        db,
        "so-1",
        "9001",
        dist,
        "BenW",
        at(2024, 6, 10),
        &[("P-100", "Widget", 10.0, 1000.0), ("SHIP", "Shipping", 1.0, 25.0)],
    )
    .await;
    order(
        db,
        "so-2",
        "9002",
        ("c-whole", "Bulk Barn"),
        "BenW",
        at(2024, 6, 11),
        &[("P-200", "Gadget", 2.0, 200.0)],
    )
    .await;

    order(
        db,
        "so-admin",
        "9101",
        other,
        "admin",
        at(2024, 6, 20),
        &[("P-200", "Gadget", 1.0, 100.0)],
    )
    .await;
    order(
        db,
        "so-shop",
        "9102",
        other,
        "Shopify",
        at(2024, 6, 20),
        &[("P-200", "Gadget", 1.0, 100.0)],
    )
    .await;
    order(
        db,
        "so-sh",
        "Sh1001",
        other,
        "BenW",
        at(2024, 6, 21),
        &[("P-200", "Gadget", 1.0, 100.0)],
    )
    .await;
    order(
        db,
        "so-inactive",
        "9104",
        other,
        "OldRep",
        at(2024, 6, 21),
        &[("P-200", "Gadget", 1.0, 100.0)],
    )
    .await;
    order(
        db,
        "so-retail",
        "9105",
        ("c-retail", "Corner Shop"),
        "BenW",
        at(2024, 6, 22),
        &[("P-200", "Gadget", 1.0, 100.0)],
    )
    .await;
    order(
        db,
        "so-zero",
        "9106",
        other,
        "BenW",
        at(2024, 6, 22),
        &[("P-200", "Gadget", 0.0, 0.0)],
    )
    .await;
    order(
        db,
        "so-nocust",
        "9107",
        ("c-missing", "Nobody Ltd"),
        "BenW",
        at(2024, 6, 23),
        &[("P-200", "Gadget", 1.0, 100.0)],
    )
    .await;
}

fn executor(db: &DatabaseConnection) -> CommissionExecutor {
    CommissionExecutor::new(db.clone(), CommissionConfig::default(), Arc::new(Notify::new()))
}

#[tokio::test]
async fn test_month_run_rates_orders_and_counts_skips() {
    let db = connect_in_memory().await;
    seed_month(&db).await;

    let stats = run_calculation(&db, &CommissionConfig::default(), "calc_june", &request())
        .await
        .unwrap();

    assert_eq!(stats.commissions_calculated, 2);
    assert_eq!(stats.total_commission, 70.0);
    assert_eq!(stats.admin_skipped, 1);
    assert_eq!(stats.shopify_skipped, 2);
    assert_eq!(stats.inactive_rep_skipped, 1);
    assert_eq!(stats.retail_skipped, 2);
    assert_eq!(stats.zero_quantity_skipped, 1);
    assert_eq!(stats.customers_defaulted, 1);
    assert_eq!(stats.spiffs_calculated, 1);
    assert_eq!(stats.total_spiffs, 20.0);

    // 6-month distributor customer at 5% of 1000 (shipping excluded)
    let ben = p910_commission_records::repository::get(&db, BEN_RECORD)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(ben.customer_status, "6month");
    assert_eq!(ben.customer_segment, "distributor");
    assert_eq!(ben.commission_rate, 5.0);
    assert_eq!(ben.order_revenue, 1000.0);
    assert_eq!(ben.commission_amount, 50.0);
    assert_eq!(ben.rate_source, "configured");
    assert_eq!(ben.paid_status, "pending");

    // brand new wholesale customer at 10% of 200
    let whole = p910_commission_records::repository::get(&db, "BenW_2024-06_order_so-2")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(whole.customer_status, "new");
    assert_eq!(whole.commission_amount, 20.0);

    let records = p910_commission_records::repository::list_for_month(&db, MONTH, None)
        .await
        .unwrap();
    assert_eq!(records.len(), 2);
    let logs = p913_calculation_log::repository::list(&db, MONTH, None).await.unwrap();
    assert_eq!(logs.len(), 2);

    let earnings = p912_spiff_earnings::repository::list_for_month(&db, MONTH, None)
        .await
        .unwrap();
    assert_eq!(earnings.len(), 1);
    assert_eq!(earnings[0].spiff_amount, 20.0);
    assert_eq!(earnings[0].line_item_id, "so-1-li-1");

    let summary = p911_commission_summary::repository::get(&db, "BenW_2024-06")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(summary.total_orders, 2);
    assert_eq!(summary.total_revenue, 1200.0);
    assert_eq!(summary.total_commission, 70.0);
    assert_eq!(summary.total_spiffs, 20.0);
    assert_eq!(summary.total_earnings, 90.0);
    assert_eq!(summary.override_count, 0);

    let progress = progress_tracker::get(&db, "calc_june").await.unwrap().unwrap();
    assert_eq!(progress.status, CalcStatus::Complete);
    assert_eq!(progress.total_orders, 9);
    assert_eq!(progress.current_order, 9);
    assert_eq!(progress.percentage, 100.0);
    assert_eq!(progress.stats, stats);
    assert!(progress.completed_at.is_some());
}

#[tokio::test]
async fn test_retail_order_is_skipped_once() {
    let db = connect_in_memory().await;
    seed_reference(&db).await;
    order(
        &db,
        "so-r",
        "7001",
        ("c-retail", "Corner Shop"),
        "BenW",
        at(2024, 6, 5),
        &[("P-1", "Thing", 3.0, 300.0)],
    )
    .await;

    let stats = run_calculation(&db, &CommissionConfig::default(), "calc_r", &request())
        .await
        .unwrap();
    assert_eq!(stats.retail_skipped, 1);
    assert_eq!(stats.commissions_calculated, 0);
    assert!(p910_commission_records::repository::list_for_month(&db, MONTH, None)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_zero_quantity_order_produces_nothing() {
    let db = connect_in_memory().await;
    seed_reference(&db).await;
    order(
        &db,
        "so-z",
        "7002",
        ("c-dist", "Acme Supply"),
        "BenW",
        at(2024, 6, 5),
        &[("P-1", "Thing", 0.0, 300.0)],
    )
    .await;

    let stats = run_calculation(&db, &CommissionConfig::default(), "calc_z", &request())
        .await
        .unwrap();
    assert_eq!(stats.zero_quantity_skipped, 1);
    assert!(p910_commission_records::repository::get(&db, "BenW_2024-06_order_so-z")
        .await
        .unwrap()
        .is_none());
    assert!(p913_calculation_log::repository::list(&db, MONTH, None)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_return_only_order_is_not_paid() {
    let db = connect_in_memory().await;
    seed_reference(&db).await;
    order(
        &db,
        "so-ret",
        "7003",
        ("c-dist", "Acme Supply"),
        "BenW",
        at(2024, 6, 5),
        &[("P-1", "Thing", -2.0, -300.0), ("P-2", "Other", 0.0, 0.0)],
    )
    .await;

    let stats = run_calculation(&db, &CommissionConfig::default(), "calc_ret", &request())
        .await
        .unwrap();
    assert_eq!(stats.zero_quantity_skipped, 1);
    assert_eq!(stats.commissions_calculated, 0);
    assert!(p910_commission_records::repository::list_for_month(&db, MONTH, None)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_rep_filtered_run_covers_every_spelling() {
    let db = connect_in_memory().await;
    seed_reference(&db).await;
    a032_sales_rep::repository::upsert(&db, &rep("rep-jared", "Jared Leuzinger", "Jared", true))
        .await
        .unwrap();
    let dist = ("c-dist", "Acme Supply");
    let thing = [("P-1", "Thing", 1.0, 100.0)];
    order(&db, "so-a", "9201", dist, "BenW", at(2024, 6, 3), &thing).await;
    order(&db, "so-b", "9202", dist, "Ben Wallner", at(2024, 6, 4), &thing).await;
    order(
        &db,
        "so-c",
        "9203",
        ("c-whole", "Bulk Barn"),
        "Jared",
        at(2024, 6, 5),
        &[("P-200", "Gadget", 2.0, 200.0)],
    )
    .await;
    let settings = CommissionConfig::default();
    run_calculation(&db, &settings, "calc_all", &request()).await.unwrap();

    for (calc_id, filter) in [("calc_ben_1", "BenW"), ("calc_ben_2", "Ben Wallner")] {
        let filtered = CalculateCommissionsRequest {
            sales_person: Some(filter.into()),
            ..request()
        };
        let stats = run_calculation(&db, &settings, calc_id, &filtered).await.unwrap();
        assert_eq!(stats.commissions_calculated, 2);
        assert_eq!(stats.total_commission, 16.0);

        let ids: Vec<String> = p910_commission_records::repository::list_for_month(&db, MONTH, None)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids.len(), 3);
        assert!(ids.contains(&"BenW_2024-06_order_so-a".to_string()));
        assert!(ids.contains(&"BenW_2024-06_order_so-b".to_string()));
        assert!(ids.contains(&"Jared_2024-06_order_so-c".to_string()));

        let ben = p911_commission_summary::repository::get(&db, "BenW_2024-06")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(ben.total_orders, 2);
        assert_eq!(ben.total_commission, 16.0);
        // the other rep's output is left alone
        let jared = p911_commission_summary::repository::get(&db, "Jared_2024-06")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(jared.total_commission, 20.0);
    }

    let progress = progress_tracker::get(&db, "calc_ben_2").await.unwrap().unwrap();
    assert_eq!(progress.total_orders, 2);
}

#[tokio::test]
async fn test_failed_checkpoints_do_not_stop_the_run() {
    let db = connect_in_memory().await;
    seed_month(&db).await;
    // every progress update short of the final status change is rejected
    db.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        "CREATE TRIGGER progress_writes_fail BEFORE UPDATE ON u510_calc_progress \
         WHEN NEW.status = 'processing' \
         BEGIN SELECT RAISE(ABORT, 'disk I/O error'); END"
            .to_string(),
    ))
    .await
    .unwrap();
    let settings = CommissionConfig {
        progress_every: 1,
        ..CommissionConfig::default()
    };

    let stats = run_calculation(&db, &settings, "calc_io", &request()).await.unwrap();
    assert_eq!(stats.commissions_calculated, 2);
    assert_eq!(stats.total_commission, 70.0);
    assert_eq!(
        p910_commission_records::repository::list_for_month(&db, MONTH, None)
            .await
            .unwrap()
            .len(),
        2
    );

    let progress = progress_tracker::get(&db, "calc_io").await.unwrap().unwrap();
    assert_eq!(progress.status, CalcStatus::Complete);
    assert_eq!(progress.stats, stats);
}

#[tokio::test]
async fn test_rerun_is_idempotent() {
    let db = connect_in_memory().await;
    seed_month(&db).await;
    let settings = CommissionConfig::default();

    let first = run_calculation(&db, &settings, "calc_1", &request()).await.unwrap();
    let records_1 = p910_commission_records::repository::list_for_month(&db, MONTH, None)
        .await
        .unwrap();
    let second = run_calculation(&db, &settings, "calc_2", &request()).await.unwrap();
    let records_2 = p910_commission_records::repository::list_for_month(&db, MONTH, None)
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(records_1.len(), records_2.len());
    for (a, b) in records_1.iter().zip(&records_2) {
        assert_eq!(a.id, b.id);
        assert_eq!(a.commission_amount, b.commission_amount);
    }
    assert_eq!(
        p911_commission_summary::repository::list_for_month(&db, MONTH)
            .await
            .unwrap()
            .len(),
        1
    );
    assert_eq!(
        p912_spiff_earnings::repository::list_for_month(&db, MONTH, None)
            .await
            .unwrap()
            .len(),
        1
    );
    assert_eq!(p913_calculation_log::repository::list(&db, MONTH, None).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_override_survives_rerun() {
    let db = connect_in_memory().await;
    seed_month(&db).await;
    let settings = CommissionConfig::default();
    run_calculation(&db, &settings, "calc_1", &request()).await.unwrap();

    let (adjusted, summary) =
        p910_commission_records::service::adjust(&db, BEN_RECORD, 10.0, Some("Split deal".into()))
            .await
            .unwrap()
            .unwrap();
    assert!(adjusted.is_override);
    assert_eq!(adjusted.commission_amount, 60.0);
    assert_eq!(summary.unwrap().total_commission, 80.0);

    let stats = run_calculation(&db, &settings, "calc_2", &request()).await.unwrap();
    assert_eq!(stats.total_commission, 80.0);

    let ben = p910_commission_records::repository::get(&db, BEN_RECORD)
        .await
        .unwrap()
        .unwrap();
    assert!(ben.is_override);
    assert_eq!(ben.commission_amount, 60.0);
    assert_eq!(ben.manual_adjustment, Some(10.0));
    assert_eq!(ben.override_reason.as_deref(), Some("Split deal"));
    assert!(ben.notes.ends_with(OVERRIDE_NOTE));

    let summary = p911_commission_summary::repository::get(&db, "BenW_2024-06")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(summary.total_commission, 80.0);
    assert_eq!(summary.override_count, 1);
}

#[tokio::test]
async fn test_rerun_drops_spiffs_of_ended_campaign() {
    let db = connect_in_memory().await;
    seed_month(&db).await;
    let settings = CommissionConfig::default();
    run_calculation(&db, &settings, "calc_1", &request()).await.unwrap();

    seed_spiff(&db, false).await;
    let stats = run_calculation(&db, &settings, "calc_2", &request()).await.unwrap();

    assert_eq!(stats.spiffs_calculated, 0);
    assert!(p912_spiff_earnings::repository::list_for_month(&db, MONTH, None)
        .await
        .unwrap()
        .is_empty());
    let summary = p911_commission_summary::repository::get(&db, "BenW_2024-06")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(summary.total_spiffs, 0.0);
    assert_eq!(summary.total_earnings, 70.0);
}

#[tokio::test]
async fn test_missing_rate_tables_fail_the_run() {
    let db = connect_in_memory().await;
    a032_sales_rep::repository::upsert(&db, &rep("rep-ben", "Ben Wallner", "BenW", true))
        .await
        .unwrap();

    let err = run_calculation(&db, &CommissionConfig::default(), "calc_x", &request())
        .await
        .unwrap_err();
    assert!(matches!(err, CommissionError::Configuration(_)));

    let progress = progress_tracker::get(&db, "calc_x").await.unwrap().unwrap();
    assert_eq!(progress.status, CalcStatus::Failed);
    assert!(progress
        .error
        .unwrap()
        .contains("No commission rate tables configured"));
}

#[tokio::test]
async fn test_empty_month_completes() {
    let db = connect_in_memory().await;
    seed_reference(&db).await;

    let stats = run_calculation(&db, &CommissionConfig::default(), "calc_e", &request())
        .await
        .unwrap();
    assert_eq!(stats.commissions_calculated, 0);

    let progress = progress_tracker::get(&db, "calc_e").await.unwrap().unwrap();
    assert_eq!(progress.status, CalcStatus::Complete);
    assert_eq!(progress.total_orders, 0);
    assert_eq!(progress.percentage, 100.0);
}

#[tokio::test]
async fn test_trigger_rejects_bad_month() {
    let db = connect_in_memory().await;
    let err = executor(&db)
        .trigger(CalculateCommissionsRequest {
            month: "13".into(),
            year: 2024,
            sales_person: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CommissionError::Validation(_)));
    assert!(job_queue::list_pending(&db).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_worker_runs_queued_job_and_releases_lock() {
    let db = connect_in_memory().await;
    seed_month(&db).await;
    let wake = Arc::new(Notify::new());
    let settings = CommissionConfig::default();
    let exec = CommissionExecutor::new(db.clone(), settings.clone(), wake.clone());
    let worker = CalcJobWorker::new(db.clone(), settings, wake);

    let started = exec.trigger(request()).await.unwrap();
    assert!(started.processing);
    assert_eq!(started.commission_month, MONTH);
    let queued = exec.get_progress(&started.calc_id).await.unwrap();
    assert_eq!(queued.status, CalcStatus::Processing);

    // month is busy: the job waits
    assert!(run_lock::try_acquire(&db, MONTH, "calc_other").await.unwrap());
    assert!(worker.process_pending().await.unwrap().is_empty());
    assert_eq!(
        job_queue::get(&db, &started.calc_id).await.unwrap().unwrap().status,
        job_queue::STATUS_PENDING
    );
    run_lock::release(&db, MONTH, "calc_other").await.unwrap();

    let handles = worker.process_pending().await.unwrap();
    assert_eq!(handles.len(), 1);
    for handle in handles {
        handle.await.unwrap();
    }

    let job = job_queue::get(&db, &started.calc_id).await.unwrap().unwrap();
    assert_eq!(job.status, job_queue::STATUS_DONE);
    assert_eq!(job.attempts, 1);
    assert!(run_lock::holder(&db, MONTH).await.unwrap().is_none());

    let progress = exec.get_progress(&started.calc_id).await.unwrap();
    assert_eq!(progress.status, CalcStatus::Complete);
    assert_eq!(progress.stats.commissions_calculated, 2);
}

#[tokio::test]
async fn test_recovery_requeues_interrupted_job() {
    let db = connect_in_memory().await;
    seed_month(&db).await;
    let wake = Arc::new(Notify::new());
    let settings = CommissionConfig::default();
    let exec = CommissionExecutor::new(db.clone(), settings.clone(), wake.clone());
    let worker = CalcJobWorker::new(db.clone(), settings, wake);

    let started = exec.trigger(request()).await.unwrap();
    // simulate a crash mid-run
    assert!(job_queue::claim(&db, &started.calc_id).await.unwrap());
    assert!(run_lock::try_acquire(&db, MONTH, &started.calc_id).await.unwrap());

    worker.recover_interrupted().await.unwrap();
    assert!(run_lock::holder(&db, MONTH).await.unwrap().is_none());

    for handle in worker.process_pending().await.unwrap() {
        handle.await.unwrap();
    }
    let job = job_queue::get(&db, &started.calc_id).await.unwrap().unwrap();
    assert_eq!(job.status, job_queue::STATUS_DONE);
    assert_eq!(job.attempts, 2);
    assert_eq!(
        exec.get_progress(&started.calc_id).await.unwrap().status,
        CalcStatus::Complete
    );
}

#[tokio::test]
async fn test_delete_month_keeps_overrides_and_respects_lock() {
    let db = connect_in_memory().await;
    seed_month(&db).await;
    run_calculation(&db, &CommissionConfig::default(), "calc_1", &request())
        .await
        .unwrap();
    p910_commission_records::service::adjust(&db, BEN_RECORD, 5.0, None)
        .await
        .unwrap();
    let exec = executor(&db);
    let delete = |include_overrides| DeleteMonthRequest {
        month: "06".into(),
        year: 2024,
        include_overrides,
    };

    assert!(run_lock::try_acquire(&db, MONTH, "calc_busy").await.unwrap());
    let err = exec.delete_month(delete(false)).await.unwrap_err();
    assert!(matches!(err, CommissionError::RunInProgress(_)));
    run_lock::release(&db, MONTH, "calc_busy").await.unwrap();

    let result = exec.delete_month(delete(false)).await.unwrap();
    assert_eq!(result.commissions_deleted, 1);
    assert_eq!(result.logs_deleted, 2);
    assert_eq!(result.overrides_preserved, 1);
    assert!(p910_commission_records::repository::get(&db, BEN_RECORD)
        .await
        .unwrap()
        .is_some());

    let result = exec.delete_month(delete(true)).await.unwrap();
    assert_eq!(result.commissions_deleted, 1);
    assert_eq!(result.overrides_preserved, 0);
    assert!(run_lock::holder(&db, MONTH).await.unwrap().is_none());
}

#[tokio::test]
async fn test_recalculate_summary_for_rep() {
    let db = connect_in_memory().await;
    seed_month(&db).await;
    run_calculation(&db, &CommissionConfig::default(), "calc_1", &request())
        .await
        .unwrap();
    let exec = executor(&db);

    let summary = exec
        .recalculate_summary(RecalculateSummaryRequest {
            rep_id: "rep-ben".into(),
            month: "2024-06".into(),
            year: 2024,
        })
        .await
        .unwrap();
    assert_eq!(summary.sales_person, "BenW");
    assert_eq!(summary.total_commission, 70.0);
    assert_eq!(summary.total_earnings, 90.0);

    let err = exec
        .recalculate_summary(RecalculateSummaryRequest {
            rep_id: "rep-old".into(),
            month: "2024-06".into(),
            year: 2024,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CommissionError::NotFound(_)));

    let err = exec.get_progress("calc_unknown").await.unwrap_err();
    assert!(matches!(err, CommissionError::NotFound(_)));
}
