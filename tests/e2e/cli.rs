use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use rusqlite::Connection;
use tempfile::TempDir;

struct TestEnv {
    _tmp: TempDir,
    root: PathBuf,
    db: PathBuf,
    config: PathBuf,
}

impl TestEnv {
    fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let root = tmp.path().to_path_buf();
        let db = root.join("app.db");

        let conn = Connection::open(&db).expect("create database");
        conn.execute_batch(
            "CREATE TABLE orders (id INTEGER PRIMARY KEY, customer_id INTEGER, total REAL);
             INSERT INTO orders VALUES (1, 10, 9.5), (2, 10, 20.0), (3, 11, 1.25);
             CREATE VIEW big_orders AS SELECT id, total FROM orders WHERE total > 5 ORDER BY id;",
        )
        .expect("seed database");

        let config = root.join("config.yaml");
        fs::write(&config, config_yaml(&db, &root.join("baselines"))).expect("write config");

        Self {
            _tmp: tmp,
            root,
            db,
            config,
        }
    }

    fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("procdiff");
        cmd.env("NO_COLOR", "1")
            .env_remove("RUST_LOG")
            .arg("--config")
            .arg(&self.config);
        cmd
    }

    fn sql(&self, statement: &str) {
        Connection::open(&self.db)
            .expect("open database")
            .execute_batch(statement)
            .expect("run statement");
    }

    fn baseline_files(&self) -> Vec<PathBuf> {
        let dir = self.root.join("baselines");
        if !dir.exists() {
            return Vec::new();
        }
        fs::read_dir(dir)
            .expect("read baselines")
            .map(|e| e.expect("dir entry").path())
            .collect()
    }
}

fn config_yaml(db: &Path, baselines: &Path) -> String {
    format!(
        r#"database:
  driver: sqlite
  path: "{}"
application:
  baseline_dir: "{}"
  log_level: INFO
  timeout: 2
stored_procedures:
  usp_orders:
    description: Orders for one customer
    sql: "SELECT id, total FROM orders WHERE customer_id = ?1 ORDER BY id"
    parameters:
      - name: customer_id
        type: int
"#,
        db.display(),
        baselines.display()
    )
}

#[test]
fn baseline_then_test_matches() {
    let env = TestEnv::new();

    env.cmd()
        .args(["baseline", "usp_orders", "10"])
        .assert()
        .success()
        .stdout(contains("Stored baseline for 'usp_orders' (2 row(s))"));
    assert_eq!(env.baseline_files().len(), 1);

    env.cmd()
        .args(["test", "usp_orders", "10"])
        .assert()
        .success()
        .stdout(contains("Results match baseline exactly!"));
}

#[test]
fn changed_data_is_reported() {
    let env = TestEnv::new();

    env.cmd()
        .args(["baseline", "usp_orders", "10"])
        .assert()
        .success();

    env.sql("UPDATE orders SET total = 21.0 WHERE id = 2; INSERT INTO orders VALUES (4, 10, 3.0);");

    env.cmd()
        .args(["test", "usp_orders", "10"])
        .assert()
        .code(1)
        .stdout(contains("Differences found"))
        .stdout(contains("+ 2   21"))
        .stdout(contains("- 2   20"))
        .stdout(contains("+ 4   3"));
}

#[test]
fn view_without_configured_body() {
    let env = TestEnv::new();

    env.cmd()
        .args(["baseline", "big_orders"])
        .assert()
        .success()
        .stdout(contains("(2 row(s))"));

    env.cmd().args(["test", "big_orders"]).assert().success();
}

#[test]
fn test_without_baseline_fails_cleanly() {
    let env = TestEnv::new();

    env.cmd()
        .args(["test", "usp_orders", "10"])
        .assert()
        .code(1)
        .stdout(contains("No baseline found for this procedure"))
        .stderr(contains("panicked").not());
}

#[test]
fn invalid_mode_is_usage_error() {
    let env = TestEnv::new();
    // Break the database so any connection attempt would be visible
    fs::write(&env.db, "not a database").expect("clobber database");

    env.cmd()
        .args(["bogus", "usp_orders"])
        .assert()
        .code(2)
        .stderr(contains("invalid mode 'bogus'"))
        .stderr(contains("cannot connect").not());
}

#[test]
fn unknown_procedure_is_execution_error() {
    let env = TestEnv::new();

    env.cmd()
        .args(["baseline", "usp_missing"])
        .assert()
        .code(1)
        .stderr(contains("error executing procedure 'usp_missing'"));
    assert!(env.baseline_files().is_empty());
}

#[test]
fn missing_config_section_is_reported() {
    let env = TestEnv::new();
    fs::write(&env.config, "database:\n  path: app.db\n").expect("write config");

    env.cmd()
        .args(["test", "usp_orders"])
        .assert()
        .code(1)
        .stderr(contains("Missing required configuration section: application"));
}

#[test]
fn config_error_details_logged_at_debug() {
    let env = TestEnv::new();
    fs::write(&env.config, "database:\n  path: app.db\n").expect("write config");

    env.cmd()
        .env("RUST_LOG", "debug")
        .args(["test", "usp_orders"])
        .assert()
        .code(1)
        .stderr(contains("Caused by:"));

    env.cmd()
        .args(["test", "usp_orders"])
        .assert()
        .code(1)
        .stderr(contains("Caused by:").not());
}

#[test]
fn missing_database_is_connection_error() {
    let env = TestEnv::new();
    fs::remove_file(&env.db).expect("remove database");

    env.cmd()
        .args(["baseline", "usp_orders", "10"])
        .assert()
        .code(1)
        .stderr(contains("cannot connect to database"));
}

#[test]
fn history_lists_baselines() {
    let env = TestEnv::new();

    env.cmd()
        .args(["history", "usp_orders"])
        .assert()
        .success()
        .stdout(contains("No baselines stored for 'usp_orders'"));

    env.cmd()
        .args(["baseline", "usp_orders", "11"])
        .assert()
        .success();

    env.cmd()
        .args(["history", "usp_orders"])
        .assert()
        .success()
        .stdout(contains("1 baseline(s) for 'usp_orders'"));
}
