//! Criterion comparison of reading a whole table with raw `rusqlite` vs.
//! materializing it into generic records with `query_all`. Both variants read
//! the same seeded file so the difference is the materialization overhead.

use std::collections::HashMap;
use std::sync::LazyLock;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rusqlite::{Connection, Row, params};
use sql_records::{Configs, Database, Value};
use tempfile::TempDir;

/// Holds the seeded database file for the lifetime of the run.
struct Dataset {
    _dir: TempDir,
    path: String,
    rows: usize,
}

static DATASET: LazyLock<Dataset> = LazyLock::new(|| {
    let rows = bench_row_count();
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("materialize.db");
    prepare_sqlite_dataset(&path, rows).expect("failed to prepare SQLite dataset");
    Dataset {
        path: path.to_string_lossy().into_owned(),
        _dir: dir,
        rows,
    }
});

/// Rows in the seeded table; `BENCH_ROWS` overrides the default.
fn bench_row_count() -> usize {
    std::env::var("BENCH_ROWS")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(1000)
}

fn prepare_sqlite_dataset(path: &std::path::Path, row_count: usize) -> rusqlite::Result<()> {
    let mut conn = Connection::open(path)?;
    conn.execute_batch(
        "
        CREATE TABLE widgets (
            id      INTEGER PRIMARY KEY,
            sku     VARCHAR(32) NOT NULL,
            weight  FLOAT,
            qty     INT,
            notes   TEXT
        );
        ",
    )?;

    let transaction = conn.transaction()?;
    {
        let mut insert_stmt = transaction
            .prepare("INSERT INTO widgets (id, sku, weight, qty, notes) VALUES (?1, ?2, ?3, ?4, ?5)")?;
        for id in 1..=row_count as i64 {
            let notes = (id % 3 == 0).then(|| format!("note-{id}"));
            insert_stmt.execute(params![id, format!("WIDG{id}"), id as f64 * 0.25, id % 50, notes])?;
        }
    }
    transaction.commit()?;
    Ok(())
}

/// Decoded row used by the raw baseline.
#[derive(Debug)]
struct BenchRow {
    id: i64,
    sku: String,
    weight: Option<f64>,
    qty: Option<i64>,
    notes: Option<String>,
}

impl BenchRow {
    fn from_rusqlite(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            sku: row.get(1)?,
            weight: row.get(2)?,
            qty: row.get(3)?,
            notes: row.get(4)?,
        })
    }
}

fn benchmark_materialize(c: &mut Criterion) {
    let dataset = &*DATASET;
    let sql = "SELECT id, sku, weight, qty, notes FROM widgets";

    let mut group = c.benchmark_group("full_table_read");
    group.throughput(Throughput::Elements(dataset.rows as u64));

    let conn = Connection::open(&dataset.path).expect("open sqlite connection");
    group.bench_function(BenchmarkId::new("rusqlite", dataset.rows), |b| {
        b.iter(|| {
            let mut stmt = conn.prepare(sql).expect("prepare select");
            let rows: Vec<BenchRow> = stmt
                .query_map([], |row| BenchRow::from_rusqlite(row))
                .expect("query rows")
                .collect::<Result<_, _>>()
                .expect("decode rows");
            black_box(rows);
        });
    });

    let configs = Configs::new()
        .with_driver("sqlite")
        .with_database(dataset.path.clone());
    let mut db = Database::make_with_env(configs, &HashMap::<String, String>::new())
        .expect("open sql-records database");
    group.bench_function(BenchmarkId::new("sql-records", dataset.rows), |b| {
        b.iter(|| {
            let rows = db.query_all(sql, &[]).expect("query all");
            debug_assert!(matches!(rows.first().and_then(|r| r.get("weight")), Some(Value::Float(_))));
            black_box(rows);
        });
    });

    group.finish();
}

criterion_group!(benches, benchmark_materialize);
criterion_main!(benches);
