//! Persisted per-month run lock: at most one run touches a commission month at a time.

use anyhow::Result;
use chrono::Utc;
use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement};

fn stmt(sql: &str, values: Vec<sea_orm::Value>) -> Statement {
    Statement::from_sql_and_values(DatabaseBackend::Sqlite, sql, values)
}

/// Takes the lock for `commission_month`; false when another run holds it.
/// Re-acquiring a lock already held by the same calc id succeeds.
pub async fn try_acquire(
    db: &DatabaseConnection,
    commission_month: &str,
    calc_id: &str,
) -> Result<bool> {
    let result = db
        .execute(stmt(
            "INSERT OR IGNORE INTO u510_run_locks (commission_month, calc_id, acquired_at) \
             VALUES (?, ?, ?)",
            vec![
                commission_month.into(),
                calc_id.into(),
                Utc::now().to_rfc3339().into(),
            ],
        ))
        .await?;
    if result.rows_affected() == 1 {
        return Ok(true);
    }
    Ok(holder(db, commission_month).await?.as_deref() == Some(calc_id))
}

/// Releases the lock only if `calc_id` holds it
pub async fn release(db: &DatabaseConnection, commission_month: &str, calc_id: &str) -> Result<()> {
    db.execute(stmt(
        "DELETE FROM u510_run_locks WHERE commission_month = ? AND calc_id = ?",
        vec![commission_month.into(), calc_id.into()],
    ))
    .await?;
    Ok(())
}

pub async fn holder(db: &DatabaseConnection, commission_month: &str) -> Result<Option<String>> {
    let row = db
        .query_one(stmt(
            "SELECT calc_id FROM u510_run_locks WHERE commission_month = ?",
            vec![commission_month.into()],
        ))
        .await?;
    match row {
        Some(row) => Ok(Some(row.try_get::<String>("", "calc_id")?)),
        None => Ok(None),
    }
}

/// Drops every lock; only valid at startup, before the worker runs anything
pub async fn release_all(db: &DatabaseConnection) -> Result<u64> {
    let result = db
        .execute(stmt("DELETE FROM u510_run_locks", vec![]))
        .await?;
    Ok(result.rows_affected())
}
