//! Integration tests for the stepwise binary against DuckDB

use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// Path to the compiled stepwise binary
fn stepwise_bin() -> String {
    env!("CARGO_BIN_EXE_stepwise").to_string()
}

/// Run `stepwise` in `dir` and return (stdout, stderr, exit code).
fn run_stepwise(dir: &Path, args: &[&str]) -> (String, String, Option<i32>) {
    let output = Command::new(stepwise_bin())
        .args(["--project-dir", &dir.display().to_string()])
        .args(args)
        .env("RUST_LOG", "error")
        .env_remove("STEPWISE_PROJECT")
        .env_remove("STEPWISE_ENGINE")
        .env_remove("STEPWISE_DDL")
        .env_remove("STEPWISE_MASTER")
        .env_remove("STEPWISE_SCRIPTS_ROOT")
        .env_remove("STEPWISE_TIMEOUT")
        .output()
        .unwrap_or_else(|e| panic!("Failed to execute stepwise with args {:?}: {}", args, e));
    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.code(),
    )
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Project with a config file, a bootstrap folder and two versions
fn sample_project() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(
        root,
        "stepwise.yml",
        r#"
project_name: shop
engine: duckdb
connection_string_ddl: shop.duckdb
connection_string_master: shop.duckdb
scripts_root: Shop.Database/Scripts/DuckDb
"#,
    );
    write(
        root,
        "Shop.Database/Scripts/DuckDb/00_CreateDB/01_settings.sql",
        "CREATE TABLE settings (name VARCHAR);",
    );
    write(
        root,
        "Shop.Database/Scripts/DuckDb/01/01_customers.sql",
        "CREATE TABLE customers (id INTEGER);",
    );
    write(
        root,
        "Shop.Database/Scripts/DuckDb/02/01_seed.sql",
        "INSERT INTO customers VALUES (1);",
    );
    dir
}

#[test]
fn test_migrate_then_status() {
    let dir = sample_project();
    // Relative DuckDB paths resolve against the working directory
    let db = dir.path().join("shop.duckdb").display().to_string();

    let (stdout, stderr, code) = run_stepwise(dir.path(), &["--ddl", &db, "--master", &db, "migrate"]);
    assert_eq!(code, Some(0), "stderr: {}", stderr);
    assert!(stdout.contains("Database created from 00_CreateDB"));
    assert!(stdout.contains("Applied versions: 1, 2"));
    assert!(stdout.contains("Current version: 2"));

    let (stdout, _, code) = run_stepwise(
        dir.path(),
        &["--ddl", &db, "--master", &db, "status", "--output", "json"],
    );
    assert_eq!(code, Some(0));
    let status: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(status["current_version"], 2);
    assert_eq!(status["database_exists"], true);
    assert_eq!(status["pending"].as_array().map(Vec::len), Some(0));

    let (_, _, code) = run_stepwise(dir.path(), &["--ddl", &db, "exists"]);
    assert_eq!(code, Some(0));
}

#[test]
fn test_exists_reports_missing_database() {
    let dir = sample_project();
    let db = dir.path().join("shop.duckdb").display().to_string();

    let (stdout, _, code) = run_stepwise(dir.path(), &["--ddl", &db, "exists"]);

    assert_eq!(code, Some(1));
    assert!(stdout.contains("does not exist"));
    assert!(!Path::new(&db).exists());
}

#[test]
fn test_failed_migration_exits_non_zero() {
    let dir = sample_project();
    let db = dir.path().join("shop.duckdb").display().to_string();
    write(
        dir.path(),
        "Shop.Database/Scripts/DuckDb/02/02_broken.sql",
        "INSERT INTO missing_table VALUES (1);",
    );

    let (_, stderr, code) = run_stepwise(
        dir.path(),
        &["--ddl", &db, "--master", &db, "migrate", "--short"],
    );
    assert_eq!(code, Some(1));
    assert!(stderr.contains("missing_table"));
    assert!(!stderr.contains("Following folders must still be processed"));

    let (_, stderr, code) = run_stepwise(dir.path(), &["--ddl", &db, "--master", &db, "migrate"]);
    assert_eq!(code, Some(1));
    assert!(stderr.contains("Following folders must still be processed"));
    assert!(stderr.contains("02_broken.sql"));
}

#[test]
fn test_missing_configuration_is_reported() {
    let dir = tempfile::tempdir().unwrap();

    let (_, stderr, code) = run_stepwise(dir.path(), &["migrate"]);

    assert_eq!(code, Some(1));
    assert!(stderr.contains("Invalid configuration"));
}
