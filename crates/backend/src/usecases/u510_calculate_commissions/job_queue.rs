//! Durable queue of commission runs. A job row outlives the process that enqueued it.

use anyhow::Result;
use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_RUNNING: &str = "running";
pub const STATUS_DONE: &str = "done";
pub const STATUS_FAILED: &str = "failed";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "u510_calc_jobs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub calc_id: String,
    pub commission_month: String,
    pub month: String,
    pub year: i32,
    pub sales_person: Option<String>,
    pub status: String,
    pub attempts: i32,
    pub enqueued_at: String,
    pub started_at: Option<String>,
    pub finished_at: Option<String>,
    pub last_error: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub type CalcJob = Model;

pub async fn enqueue(
    db: &DatabaseConnection,
    calc_id: &str,
    commission_month: &str,
    month: &str,
    year: i32,
    sales_person: Option<String>,
) -> Result<()> {
    let active = ActiveModel {
        calc_id: Set(calc_id.to_string()),
        commission_month: Set(commission_month.to_string()),
        month: Set(month.to_string()),
        year: Set(year),
        sales_person: Set(sales_person),
        status: Set(STATUS_PENDING.to_string()),
        attempts: Set(0),
        enqueued_at: Set(Utc::now().to_rfc3339()),
        started_at: Set(None),
        finished_at: Set(None),
        last_error: Set(None),
    };
    active.insert(db).await?;
    Ok(())
}

pub async fn get(db: &DatabaseConnection, calc_id: &str) -> Result<Option<CalcJob>> {
    Ok(Entity::find_by_id(calc_id.to_string()).one(db).await?)
}

/// Pending jobs, oldest first
pub async fn list_pending(db: &DatabaseConnection) -> Result<Vec<CalcJob>> {
    Ok(Entity::find()
        .filter(Column::Status.eq(STATUS_PENDING))
        .order_by_asc(Column::EnqueuedAt)
        .order_by_asc(Column::CalcId)
        .all(db)
        .await?)
}

/// pending -> running; false when someone else claimed it first
pub async fn claim(db: &DatabaseConnection, calc_id: &str) -> Result<bool> {
    let result = Entity::update_many()
        .col_expr(Column::Status, Expr::value(STATUS_RUNNING))
        .col_expr(Column::Attempts, Expr::col(Column::Attempts).add(1))
        .col_expr(Column::StartedAt, Expr::value(Some(Utc::now().to_rfc3339())))
        .filter(Column::CalcId.eq(calc_id))
        .filter(Column::Status.eq(STATUS_PENDING))
        .exec(db)
        .await?;
    Ok(result.rows_affected == 1)
}

pub async fn finish(db: &DatabaseConnection, calc_id: &str, error: Option<String>) -> Result<()> {
    let Some(job) = get(db, calc_id).await? else {
        anyhow::bail!("Job {} not found", calc_id);
    };
    let mut active: ActiveModel = job.into();
    active.status = Set(if error.is_some() { STATUS_FAILED } else { STATUS_DONE }.to_string());
    active.finished_at = Set(Some(Utc::now().to_rfc3339()));
    active.last_error = Set(error);
    active.update(db).await?;
    Ok(())
}

/// Jobs left `running` by a dead process go back to `pending`
pub async fn requeue_running(db: &DatabaseConnection) -> Result<u64> {
    let result = Entity::update_many()
        .col_expr(Column::Status, Expr::value(STATUS_PENDING))
        .filter(Column::Status.eq(STATUS_RUNNING))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::connect_in_memory;

    #[tokio::test]
    async fn test_claim_finish_and_requeue() {
        let db = connect_in_memory().await;
        enqueue(&db, "calc_1", "2024-06", "06", 2024, None).await.unwrap();
        enqueue(&db, "calc_2", "2024-07", "07", 2024, Some("BenW".into()))
            .await
            .unwrap();
        assert_eq!(list_pending(&db).await.unwrap().len(), 2);

        assert!(claim(&db, "calc_1").await.unwrap());
        assert!(!claim(&db, "calc_1").await.unwrap());
        let job = get(&db, "calc_1").await.unwrap().unwrap();
        assert_eq!(job.status, STATUS_RUNNING);
        assert_eq!(job.attempts, 1);

        // crash: the running job is picked up again after restart
        assert_eq!(requeue_running(&db).await.unwrap(), 1);
        assert!(claim(&db, "calc_1").await.unwrap());
        assert_eq!(get(&db, "calc_1").await.unwrap().unwrap().attempts, 2);

        finish(&db, "calc_1", Some("boom".into())).await.unwrap();
        let job = get(&db, "calc_1").await.unwrap().unwrap();
        assert_eq!(job.status, STATUS_FAILED);
        assert_eq!(job.last_error.as_deref(), Some("boom"));
        assert_eq!(list_pending(&db).await.unwrap().len(), 1);
    }
}
