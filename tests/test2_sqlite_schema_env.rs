#![cfg(feature = "sqlite")]
use std::collections::HashMap;

use sql_records::prelude::*;

#[test]
fn schemaless_then_bind_schema() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("widgets.db");
    let path = path.to_string_lossy().into_owned();

    let env: HashMap<String, String> = HashMap::new();
    let mut db = Database::make_schemaless_with_env(Configs::new().with_driver("sqlite"), &env)?;
    assert!(db.is_schemaless());
    assert_eq!(db.name(), "");

    db.set_schema(&path)?;
    assert!(!db.is_schemaless());
    assert_eq!(db.name(), path);
    assert_eq!(db.configs().database, path);

    db.execute_batch("CREATE TABLE widgets (id INTEGER PRIMARY KEY, sku VARCHAR(32))")?;
    let id = db.make_record([("sku", "WIDG1")], "widgets").create()?;
    assert_eq!(id, 1);
    db.close()?;

    // The bound schema is a real file; a fresh connection sees the row.
    let configs = Configs::new().with_driver("sqlite").with_database(&path);
    let mut db = Database::make_with_env(configs, &env)?;
    let widget = db.row_by_id("SELECT sku FROM widgets WHERE id = ?", 1)?;
    assert_eq!(widget.get("sku"), Some(&Value::Text("WIDG1".to_string())));
    Ok(())
}

#[test]
fn empty_schema_name_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let env: HashMap<String, String> = HashMap::new();
    let mut db = Database::make_schemaless_with_env(Configs::new().with_driver("sqlite"), &env)?;
    let err = db.set_schema("  ").unwrap_err();
    assert!(matches!(err, SqlRecordsError::ConfigError(_)));
    assert!(db.is_schemaless());
    Ok(())
}

#[test]
fn environment_fills_missing_settings() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("env.db").to_string_lossy().into_owned();
    let env = HashMap::from([
        ("DB_CONNECTION".to_string(), "SQLite3".to_string()),
        ("DB_DATABASE".to_string(), path.clone()),
    ]);

    let db = Database::make_with_env(Configs::new(), &env)?;
    assert_eq!(db.driver(), DatabaseType::Sqlite);
    assert_eq!(db.name(), path);
    db.close()?;
    Ok(())
}

#[test]
fn explicit_settings_beat_the_environment() -> Result<(), Box<dyn std::error::Error>> {
    let env = HashMap::from([
        ("DB_CONNECTION", "mysql"),
        ("DB_DATABASE", "/nonexistent/elsewhere.db"),
        ("DB_HOST", "db.internal"),
    ]);
    let configs = Configs::new().with_driver("sqlite").with_database(":memory:");
    let db = Database::make_with_env(configs, &env)?;
    assert_eq!(db.driver(), DatabaseType::Sqlite);
    assert_eq!(db.configs().database, ":memory:");
    // Gaps are still filled.
    assert_eq!(db.configs().host, "db.internal");
    Ok(())
}

#[test]
fn schemaless_never_reads_the_database_variable() -> Result<(), Box<dyn std::error::Error>> {
    let env = HashMap::from([("DB_CONNECTION", "sqlite"), ("DB_DATABASE", "ignored.db")]);
    let db = Database::make_schemaless_with_env(Configs::new(), &env)?;
    assert!(db.is_schemaless());
    assert_eq!(db.configs().database, "");
    Ok(())
}

#[test]
fn missing_driver_is_a_config_error() {
    let env: HashMap<String, String> = HashMap::new();
    let err = Database::make_with_env(Configs::new().with_database(":memory:"), &env)
        .err()
        .expect("connecting without a driver must fail");
    assert!(matches!(err, SqlRecordsError::ConfigError(_)));
}

#[test]
fn sqlite_needs_a_database_unless_schemaless() {
    let env: HashMap<String, String> = HashMap::new();
    let err = Database::make_with_env(Configs::new().with_driver("sqlite"), &env)
        .err()
        .expect("a schema-bound sqlite connection needs a path");
    assert!(matches!(err, SqlRecordsError::ConfigError(_)));
}

#[test]
fn configs_load_from_json() -> Result<(), Box<dyn std::error::Error>> {
    let configs = Configs::from_json_str(r#"{ "driver": "sqlite", "database": ":memory:" }"#)?;
    let env: HashMap<String, String> = HashMap::new();
    let mut db = Database::make_with_env(configs, &env)?;
    let outcome = db.execute("CREATE TABLE t (x INT)", &[])?;
    assert_eq!(outcome.rows_affected, 0);
    Ok(())
}
