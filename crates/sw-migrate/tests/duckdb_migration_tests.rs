//! End-to-end runs against a DuckDB file.

use std::fs;
use std::path::Path;
use sw_core::{DbKind, MigrationConfig};
use sw_migrate::{MigrateError, Migrator};
use tempfile::TempDir;

fn write(root: &Path, relative: &str, sql: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, sql).unwrap();
}

fn setup() -> (TempDir, MigrationConfig) {
    let dir = tempfile::tempdir().unwrap();
    let scripts = dir.path().join("Shop.Database/Scripts/DuckDb");
    write(
        &scripts,
        "00_CreateDB/01_settings.sql",
        "CREATE TABLE settings (name VARCHAR PRIMARY KEY, value VARCHAR);",
    );
    write(
        &scripts,
        "01/01_customers.sql",
        "CREATE TABLE customers (id INTEGER PRIMARY KEY, name VARCHAR NOT NULL);",
    );
    write(
        &scripts,
        "01/02_orders.sql",
        "CREATE TABLE orders (id INTEGER PRIMARY KEY, customer_id INTEGER);",
    );
    write(
        &scripts,
        "02/01_seed.sql",
        "INSERT INTO customers VALUES (1, 'ada');\nINSERT INTO orders VALUES (10, 1);",
    );

    let db = dir.path().join("shop.duckdb").display().to_string();
    let config = MigrationConfig::new("shop", DbKind::DuckDb, db.clone())
        .with_master(db)
        .with_scripts_root(scripts);
    (dir, config)
}

fn query_i64(config: &MigrationConfig, sql: &str) -> i64 {
    let conn = duckdb::Connection::open(&config.connection_string_ddl).unwrap();
    conn.query_row(sql, [], |row| row.get(0)).unwrap()
}

#[tokio::test]
async fn test_fresh_database_is_created_and_migrated() {
    let (_dir, config) = setup();
    let migrator = Migrator::new(config.clone()).unwrap();

    let report = migrator.run().await.unwrap();

    assert!(report.bootstrapped);
    assert_eq!(report.applied, vec![1, 2]);
    assert_eq!(report.scripts_executed, 4);
    assert_eq!(query_i64(&config, "SELECT COUNT(*) FROM customers"), 1);
    assert_eq!(query_i64(&config, "SELECT COUNT(*) FROM settings"), 0);
    assert_eq!(
        query_i64(
            &config,
            "SELECT version FROM stepwise_version WHERE project_name = 'shop'"
        ),
        2
    );
}

#[tokio::test]
async fn test_rerun_applies_only_new_folders() {
    let (dir, config) = setup();
    Migrator::new(config.clone()).unwrap().run().await.unwrap();

    write(
        &dir.path().join("Shop.Database/Scripts/DuckDb"),
        "03/01_index.sql",
        "ALTER TABLE customers ADD COLUMN email VARCHAR;",
    );
    let report = Migrator::new(config.clone()).unwrap().run().await.unwrap();

    assert!(!report.bootstrapped);
    assert_eq!(report.skipped, vec![1, 2]);
    assert_eq!(report.applied, vec![3]);
    assert_eq!(report.scripts_executed, 1);
    assert_eq!(query_i64(&config, "SELECT COUNT(*) FROM customers"), 1);
}

#[tokio::test]
async fn test_failed_script_rolls_back_and_is_retried() {
    let (dir, config) = setup();
    let scripts = dir.path().join("Shop.Database/Scripts/DuckDb");
    write(
        &scripts,
        "02/02_broken.sql",
        "CREATE TABLE audit (id INTEGER);\nINSERT INTO missing_table VALUES (1);",
    );

    let failure = Migrator::new(config.clone())
        .unwrap()
        .run()
        .await
        .unwrap_err();

    assert!(matches!(
        failure.error,
        MigrateError::ScriptExecutionFailure { .. }
    ));
    assert!(failure.short_message.contains("missing_table"));
    assert_eq!(
        query_i64(
            &config,
            "SELECT version FROM stepwise_version WHERE project_name = 'shop'"
        ),
        1
    );
    assert_eq!(
        query_i64(
            &config,
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_name = 'audit'"
        ),
        0
    );

    // Committed scripts of the failed folder run again on retry
    write(&scripts, "02/01_seed.sql", "INSERT INTO customers VALUES (2, 'grace');");
    write(&scripts, "02/02_broken.sql", "CREATE TABLE audit (id INTEGER);");
    let report = Migrator::new(config.clone()).unwrap().run().await.unwrap();

    assert_eq!(report.applied, vec![2]);
    assert_eq!(query_i64(&config, "SELECT COUNT(*) FROM customers"), 2);
}

#[tokio::test]
async fn test_status_reports_pending_versions() {
    let (_dir, config) = setup();
    let migrator = Migrator::new(config).unwrap();

    let before = migrator.status().await.unwrap();
    assert!(!before.database_exists);
    assert!(before.bootstrap_pending);
    assert_eq!(before.pending.len(), 2);

    migrator.run().await.unwrap();

    let after = migrator.status().await.unwrap();
    assert!(after.database_exists);
    assert_eq!(after.current_version, Some(2));
    assert!(after.is_up_to_date());
}
