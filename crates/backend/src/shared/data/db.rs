use once_cell::sync::OnceCell;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement,
};
use std::path::Path;

static DB_CONN: OnceCell<DatabaseConnection> = OnceCell::new();

/// Minimal schema bootstrap; every statement is idempotent
const SCHEMA: &[&str] = &[
    // ---- reference data (fed by ERP / CRM imports) ----
    r#"
    CREATE TABLE IF NOT EXISTS a030_sales_orders (
        id TEXT PRIMARY KEY NOT NULL,
        order_num TEXT NOT NULL DEFAULT '',
        customer_id TEXT NOT NULL,
        customer_name TEXT NOT NULL DEFAULT '',
        sales_person TEXT NOT NULL DEFAULT '',
        posting_date TEXT NOT NULL,
        commission_month TEXT NOT NULL,
        revenue REAL,
        order_value REAL
    );
    "#,
    "CREATE INDEX IF NOT EXISTS idx_a030_month ON a030_sales_orders (commission_month, posting_date);",
    "CREATE INDEX IF NOT EXISTS idx_a030_customer ON a030_sales_orders (customer_id, posting_date);",
    r#"
    CREATE TABLE IF NOT EXISTS a030_order_line_items (
        id TEXT PRIMARY KEY NOT NULL,
        sales_order_id TEXT NOT NULL,
        product_num TEXT NOT NULL DEFAULT '',
        part_number TEXT,
        product_name TEXT NOT NULL DEFAULT '',
        description TEXT,
        quantity REAL NOT NULL DEFAULT 0,
        total_price REAL NOT NULL DEFAULT 0
    );
    "#,
    "CREATE INDEX IF NOT EXISTS idx_a030_items_order ON a030_order_line_items (sales_order_id);",
    r#"
    CREATE TABLE IF NOT EXISTS a031_customers (
        id TEXT PRIMARY KEY NOT NULL,
        account_number TEXT,
        customer_num TEXT,
        name TEXT NOT NULL DEFAULT '',
        account_type TEXT,
        transfer_status TEXT
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS a032_sales_reps (
        id TEXT PRIMARY KEY NOT NULL,
        name TEXT NOT NULL,
        sales_person TEXT,
        title TEXT NOT NULL DEFAULT '',
        aliases TEXT NOT NULL DEFAULT '[]',
        is_active INTEGER NOT NULL DEFAULT 1,
        is_commissioned INTEGER NOT NULL DEFAULT 1
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS a033_commission_rates (
        id TEXT PRIMARY KEY NOT NULL,
        title TEXT NOT NULL,
        segment_id TEXT NOT NULL,
        status TEXT NOT NULL,
        percentage REAL NOT NULL,
        active INTEGER
    );
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_a033_unique_key ON a033_commission_rates (title, segment_id, status);",
    r#"
    CREATE TABLE IF NOT EXISTS a034_commission_rules (
        id TEXT PRIMARY KEY NOT NULL,
        exclude_shipping INTEGER NOT NULL DEFAULT 1,
        exclude_cc_processing INTEGER NOT NULL DEFAULT 1,
        use_order_value INTEGER NOT NULL DEFAULT 1,
        apply_reorg_rule INTEGER NOT NULL DEFAULT 1,
        reorg_date TEXT NOT NULL DEFAULT '2025-07-01'
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS a035_spiffs (
        id TEXT PRIMARY KEY NOT NULL,
        name TEXT NOT NULL DEFAULT '',
        product_num TEXT NOT NULL,
        incentive_type TEXT NOT NULL,
        incentive_value REAL NOT NULL,
        start_date TEXT NOT NULL,
        end_date TEXT,
        is_active INTEGER NOT NULL DEFAULT 1
    );
    "#,
    // ---- computed output ----
    r#"
    CREATE TABLE IF NOT EXISTS p910_commission_records (
        id TEXT PRIMARY KEY NOT NULL,
        rep_id TEXT NOT NULL,
        sales_person TEXT NOT NULL,
        rep_name TEXT NOT NULL,
        rep_title TEXT NOT NULL,
        order_id TEXT NOT NULL,
        order_num TEXT NOT NULL,
        customer_id TEXT NOT NULL,
        customer_name TEXT NOT NULL,
        account_type TEXT NOT NULL,
        customer_segment TEXT NOT NULL,
        customer_status TEXT NOT NULL,
        order_revenue REAL NOT NULL,
        order_value REAL NOT NULL,
        commission_rate REAL NOT NULL,
        commission_amount REAL NOT NULL,
        rate_source TEXT NOT NULL,
        order_date TEXT NOT NULL,
        commission_month TEXT NOT NULL,
        commission_year INTEGER NOT NULL,
        calculated_at TEXT NOT NULL,
        paid_status TEXT NOT NULL,
        notes TEXT NOT NULL,
        is_override INTEGER NOT NULL DEFAULT 0,
        override_reason TEXT,
        manual_adjustment REAL
    );
    "#,
    "CREATE INDEX IF NOT EXISTS idx_p910_month ON p910_commission_records (commission_month, sales_person);",
    r#"
    CREATE TABLE IF NOT EXISTS p911_commission_summary (
        id TEXT PRIMARY KEY NOT NULL,
        sales_person TEXT NOT NULL,
        rep_name TEXT NOT NULL,
        month TEXT NOT NULL,
        year INTEGER NOT NULL,
        total_orders INTEGER NOT NULL,
        total_revenue REAL NOT NULL,
        total_commission REAL NOT NULL,
        total_spiffs REAL NOT NULL,
        total_earnings REAL NOT NULL,
        override_count INTEGER NOT NULL DEFAULT 0,
        paid_status TEXT NOT NULL,
        calculated_at TEXT NOT NULL
    );
    "#,
    "CREATE INDEX IF NOT EXISTS idx_p911_month ON p911_commission_summary (month);",
    r#"
    CREATE TABLE IF NOT EXISTS p912_spiff_earnings (
        id TEXT PRIMARY KEY NOT NULL,
        rep_id TEXT NOT NULL,
        sales_person TEXT NOT NULL,
        rep_name TEXT NOT NULL,
        spiff_id TEXT NOT NULL,
        spiff_name TEXT NOT NULL,
        product_num TEXT NOT NULL,
        product_description TEXT NOT NULL,
        order_id TEXT NOT NULL,
        order_num TEXT NOT NULL,
        customer_id TEXT NOT NULL,
        customer_name TEXT NOT NULL,
        line_item_id TEXT NOT NULL,
        quantity REAL NOT NULL,
        line_revenue REAL NOT NULL,
        incentive_type TEXT NOT NULL,
        incentive_value REAL NOT NULL,
        spiff_amount REAL NOT NULL,
        order_date TEXT NOT NULL,
        commission_month TEXT NOT NULL,
        commission_year INTEGER NOT NULL,
        calculated_at TEXT NOT NULL,
        paid_status TEXT NOT NULL
    );
    "#,
    "CREATE INDEX IF NOT EXISTS idx_p912_month ON p912_spiff_earnings (commission_month, sales_person);",
    r#"
    CREATE TABLE IF NOT EXISTS p913_calculation_logs (
        id TEXT PRIMARY KEY NOT NULL,
        commission_month TEXT NOT NULL,
        order_num TEXT NOT NULL,
        order_id TEXT NOT NULL,
        customer_name TEXT NOT NULL,
        rep_name TEXT NOT NULL,
        rep_title TEXT NOT NULL,
        sales_person TEXT NOT NULL,
        customer_segment TEXT NOT NULL,
        customer_status TEXT NOT NULL,
        account_type TEXT NOT NULL,
        order_amount REAL NOT NULL,
        commission_rate REAL NOT NULL,
        commission_amount REAL NOT NULL,
        rate_source TEXT NOT NULL,
        calculated_at TEXT NOT NULL,
        order_date TEXT NOT NULL,
        notes TEXT NOT NULL
    );
    "#,
    "CREATE INDEX IF NOT EXISTS idx_p913_month ON p913_calculation_logs (commission_month);",
    // ---- run bookkeeping ----
    r#"
    CREATE TABLE IF NOT EXISTS u510_calc_progress (
        calc_id TEXT PRIMARY KEY NOT NULL,
        commission_month TEXT NOT NULL,
        status TEXT NOT NULL,
        total_orders INTEGER NOT NULL DEFAULT 0,
        current_order INTEGER NOT NULL DEFAULT 0,
        percentage REAL NOT NULL DEFAULT 0,
        current_rep TEXT NOT NULL DEFAULT '',
        current_customer TEXT NOT NULL DEFAULT '',
        current_order_num TEXT NOT NULL DEFAULT '',
        stats_json TEXT NOT NULL DEFAULT '{}',
        started_at TEXT NOT NULL,
        completed_at TEXT,
        updated_at TEXT NOT NULL,
        error TEXT
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS u510_calc_jobs (
        calc_id TEXT PRIMARY KEY NOT NULL,
        commission_month TEXT NOT NULL,
        month TEXT NOT NULL,
        year INTEGER NOT NULL,
        sales_person TEXT,
        status TEXT NOT NULL,
        attempts INTEGER NOT NULL DEFAULT 0,
        enqueued_at TEXT NOT NULL,
        started_at TEXT,
        finished_at TEXT,
        last_error TEXT
    );
    "#,
    "CREATE INDEX IF NOT EXISTS idx_u510_jobs_status ON u510_calc_jobs (status, enqueued_at);",
    r#"
    CREATE TABLE IF NOT EXISTS u510_run_locks (
        commission_month TEXT PRIMARY KEY NOT NULL,
        calc_id TEXT NOT NULL,
        acquired_at TEXT NOT NULL
    );
    "#,
];

/// Create every table the engine reads or writes
pub async fn bootstrap_schema(conn: &DatabaseConnection) -> anyhow::Result<()> {
    for sql in SCHEMA {
        conn.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            sql.to_string(),
        ))
        .await?;
    }
    tracing::info!("Database schema ready ({} statements)", SCHEMA.len());
    Ok(())
}

pub async fn initialize_database(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let absolute_path = if db_path.is_absolute() {
        db_path.to_path_buf()
    } else {
        std::env::current_dir()?.join(db_path)
    };
    // Normalize path separators and ensure proper URL form on Windows
    let normalized = absolute_path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    let db_url = format!("sqlite://{}{}?mode=rwc", prefix, normalized);

    tracing::info!("Opening database {}", db_url);
    let mut options = ConnectOptions::new(db_url);
    options.sqlx_logging(false);
    let conn = Database::connect(options).await?;

    bootstrap_schema(&conn).await?;

    DB_CONN
        .set(conn)
        .map_err(|_| anyhow::anyhow!("Database connection already initialized"))?;
    Ok(())
}

pub fn get_connection() -> anyhow::Result<&'static DatabaseConnection> {
    DB_CONN
        .get()
        .ok_or_else(|| anyhow::anyhow!("Database connection has not been initialized"))
}

/// Fresh in-memory database with the full schema (tests)
#[cfg(test)]
pub async fn connect_in_memory() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let conn = Database::connect(options)
        .await
        .expect("in-memory sqlite");
    bootstrap_schema(&conn).await.expect("schema");
    conn
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bootstrap_is_idempotent() {
        let conn = connect_in_memory().await;
        bootstrap_schema(&conn).await.unwrap();
        let rows = conn
            .query_all(Statement::from_string(
                DatabaseBackend::Sqlite,
                "SELECT name FROM sqlite_master WHERE type='table' AND name LIKE 'p91%'".to_string(),
            ))
            .await
            .unwrap();
        assert_eq!(rows.len(), 4);
    }
}
