use anyhow::Result;
use chrono::{DateTime, Utc};
use contracts::usecases::u510_calculate_commissions::{CalcProgress, CalcStats, CalcStatus};
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};

/// Progress rows, one per calc id
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "u510_calc_progress")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub calc_id: String,
    pub commission_month: String,
    pub status: String,
    pub total_orders: i32,
    pub current_order: i32,
    pub percentage: f64,
    pub current_rep: String,
    pub current_customer: String,
    pub current_order_num: String,
    pub stats_json: String,
    pub started_at: String,
    pub completed_at: Option<String>,
    pub updated_at: String,
    pub error: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

fn parse_ts(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

impl From<Model> for CalcProgress {
    fn from(m: Model) -> Self {
        let stats = serde_json::from_str::<CalcStats>(&m.stats_json).unwrap_or_default();
        CalcProgress {
            status: CalcStatus::from_code(&m.status).unwrap_or(CalcStatus::Processing),
            started_at: parse_ts(&m.started_at),
            completed_at: m.completed_at.as_deref().map(parse_ts),
            updated_at: parse_ts(&m.updated_at),
            calc_id: m.calc_id,
            commission_month: m.commission_month,
            total_orders: m.total_orders,
            current_order: m.current_order,
            percentage: m.percentage,
            current_rep: m.current_rep,
            current_customer: m.current_customer,
            current_order_num: m.current_order_num,
            stats,
            error: m.error,
        }
    }
}

/// Percentage with one decimal
pub fn percentage(current: usize, total: usize) -> f64 {
    if total == 0 {
        return 100.0;
    }
    ((current as f64 / total as f64) * 1000.0).round() / 10.0
}

/// Creates the progress row in `processing` state; an existing row is left untouched
pub async fn create(db: &DatabaseConnection, calc_id: &str, commission_month: &str) -> Result<()> {
    if Entity::find_by_id(calc_id.to_string()).one(db).await?.is_some() {
        return Ok(());
    }
    let progress = CalcProgress::new(calc_id.to_string(), commission_month.to_string());
    let now = progress.started_at.to_rfc3339();
    let active = ActiveModel {
        calc_id: Set(progress.calc_id.clone()),
        commission_month: Set(progress.commission_month.clone()),
        status: Set(CalcStatus::Processing.code().to_string()),
        total_orders: Set(0),
        current_order: Set(0),
        percentage: Set(0.0),
        current_rep: Set(String::new()),
        current_customer: Set(String::new()),
        current_order_num: Set(String::new()),
        stats_json: Set(serde_json::to_string(&progress.stats)?),
        started_at: Set(now.clone()),
        completed_at: Set(None),
        updated_at: Set(now),
        error: Set(None),
    };
    active.insert(db).await?;
    Ok(())
}

pub async fn get(db: &DatabaseConnection, calc_id: &str) -> Result<Option<CalcProgress>> {
    Ok(Entity::find_by_id(calc_id.to_string())
        .one(db)
        .await?
        .map(CalcProgress::from))
}

/// What the run is looking at right now
#[derive(Debug, Clone, Default)]
pub struct Cursor<'a> {
    pub rep: &'a str,
    pub customer: &'a str,
    pub order_num: &'a str,
}

/// Checkpoint writer of one run.
///
/// Checkpoints are best effort: a failed write is logged and the run goes on.
/// `current_order` never moves backwards.
pub struct ProgressReporter<'a> {
    db: &'a DatabaseConnection,
    calc_id: String,
    every: usize,
    total: usize,
}

impl<'a> ProgressReporter<'a> {
    pub fn new(db: &'a DatabaseConnection, calc_id: &str, every: usize) -> Self {
        Self {
            db,
            calc_id: calc_id.to_string(),
            every: every.max(1),
            total: 0,
        }
    }

    pub async fn set_total(&mut self, total: usize) {
        self.total = total;
        let result = Entity::update_many()
            .col_expr(Column::TotalOrders, Expr::value(total as i32))
            .col_expr(Column::UpdatedAt, Expr::value(Utc::now().to_rfc3339()))
            .filter(Column::CalcId.eq(self.calc_id.as_str()))
            .exec(self.db)
            .await;
        if let Err(e) = result {
            tracing::warn!("Progress total for {} not saved: {}", self.calc_id, e);
        }
    }

    /// True for every `every`-th order and for the last one
    pub fn is_due(&self, processed: usize) -> bool {
        processed > 0 && (processed % self.every == 0 || processed == self.total)
    }

    /// Writes a checkpoint after `processed` orders when one is due
    pub async fn checkpoint(&self, processed: usize, cursor: &Cursor<'_>, stats: &CalcStats) {
        if !self.is_due(processed) {
            return;
        }
        if let Err(e) = self.write_checkpoint(processed, cursor, stats).await {
            tracing::warn!(
                "Progress checkpoint {}/{} for {} failed: {}",
                processed,
                self.total,
                self.calc_id,
                e
            );
        }
    }

    async fn write_checkpoint(
        &self,
        processed: usize,
        cursor: &Cursor<'_>,
        stats: &CalcStats,
    ) -> Result<()> {
        let current = processed as i32;
        Entity::update_many()
            .col_expr(Column::CurrentOrder, Expr::value(current))
            .col_expr(
                Column::Percentage,
                Expr::value(percentage(processed, self.total)),
            )
            .col_expr(Column::CurrentRep, Expr::value(cursor.rep.to_string()))
            .col_expr(Column::CurrentCustomer, Expr::value(cursor.customer.to_string()))
            .col_expr(Column::CurrentOrderNum, Expr::value(cursor.order_num.to_string()))
            .col_expr(Column::StatsJson, Expr::value(serde_json::to_string(stats)?))
            .col_expr(Column::UpdatedAt, Expr::value(Utc::now().to_rfc3339()))
            .filter(Column::CalcId.eq(self.calc_id.as_str()))
            .filter(Column::CurrentOrder.lte(current))
            .filter(Column::Status.eq(CalcStatus::Processing.code()))
            .exec(self.db)
            .await?;
        tracing::debug!(
            "{}: {}/{} ({:.1}%)",
            self.calc_id,
            processed,
            self.total,
            percentage(processed, self.total)
        );
        Ok(())
    }

    pub async fn complete(&self, stats: &CalcStats) -> Result<()> {
        self.finish(CalcStatus::Complete, stats, None).await
    }

    pub async fn fail(&self, stats: &CalcStats, error: &str) -> Result<()> {
        self.finish(CalcStatus::Failed, stats, Some(error.to_string()))
            .await
    }

    async fn finish(
        &self,
        status: CalcStatus,
        stats: &CalcStats,
        error: Option<String>,
    ) -> Result<()> {
        let Some(model) = Entity::find_by_id(self.calc_id.clone()).one(self.db).await? else {
            anyhow::bail!("Progress row {} not found", self.calc_id);
        };
        let now = Utc::now().to_rfc3339();
        let completed = status == CalcStatus::Complete;
        let current_order = if completed {
            model.total_orders.max(model.current_order)
        } else {
            model.current_order
        };
        let mut active: ActiveModel = model.into();
        active.status = Set(status.code().to_string());
        active.current_order = Set(current_order);
        if completed {
            active.percentage = Set(100.0);
        }
        active.stats_json = Set(serde_json::to_string(stats)?);
        active.completed_at = Set(Some(now.clone()));
        active.updated_at = Set(now);
        active.error = Set(error);
        active.update(self.db).await?;
        Ok(())
    }
}

/// Rewinds a progress row for a job picked up again after a restart
pub async fn restart(db: &DatabaseConnection, calc_id: &str) -> Result<()> {
    Entity::update_many()
        .col_expr(Column::Status, Expr::value(CalcStatus::Processing.code()))
        .col_expr(Column::CurrentOrder, Expr::value(0))
        .col_expr(Column::Percentage, Expr::value(0.0))
        .col_expr(Column::CompletedAt, Expr::value(Option::<String>::None))
        .col_expr(Column::Error, Expr::value(Option::<String>::None))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now().to_rfc3339()))
        .filter(Column::CalcId.eq(calc_id))
        .exec(db)
        .await?;
    Ok(())
}

/// Marks a run failed without a reporter (crash recovery, pre-run failures)
pub async fn mark_failed(db: &DatabaseConnection, calc_id: &str, error: &str) -> Result<()> {
    let stats = get(db, calc_id)
        .await?
        .map(|p| p.stats)
        .unwrap_or_default();
    ProgressReporter::new(db, calc_id, 1).fail(&stats, error).await
}
