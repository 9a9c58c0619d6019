//! Orchestrated baseline and test runs with a fake executor

use std::cell::Cell;
use std::rc::Rc;

use chrono::{TimeZone, Utc};
use procdiff::commands::{execute, Outcome};
use procdiff::models::{TabularResult, Value};
use procdiff::verify::baseline::{BaselineStore, DiffRow, Side};
use procdiff::{Error, Result};
use tempfile::TempDir;

use super::common::{config_for, row, table, FakeExecutor};

/// Run one invocation, returning the outcome and how often the database was touched
fn run_once(
    dir: &TempDir,
    mode: &str,
    procedure: &str,
    result: Result<TabularResult>,
) -> (Result<Outcome>, usize, usize) {
    let config = config_for(dir.path());
    let calls = Rc::new(Cell::new(0));
    let connects = Cell::new(0);

    let outcome = execute(&config, mode, procedure, None, |_config| {
        connects.set(connects.get() + 1);
        Ok(FakeExecutor::new(vec![result], Rc::clone(&calls)))
    });

    (outcome, connects.get(), calls.get())
}

#[test]
fn test_baseline_then_matching_test() {
    let dir = TempDir::new().unwrap();
    let result = table(&["name", "n"], vec![row("a", 1), row("b", 2)]);

    let (stored, _, calls) = run_once(&dir, "baseline", "usp_orders", Ok(result.clone()));
    let Outcome::Stored { path, rows } = stored.unwrap() else {
        panic!("expected a stored baseline");
    };
    assert_eq!(calls, 1);
    assert_eq!(rows, 2);
    assert!(path.starts_with(dir.path()));
    assert!(path.exists());

    let (tested, _, _) = run_once(&dir, "test", "usp_orders", Ok(result));
    let outcome = tested.unwrap();
    assert_eq!(outcome, Outcome::Matched { baseline: path });
    assert_eq!(outcome.exit_code(), 0);
}

#[test]
fn test_mismatch_reports_symmetric_difference() {
    let dir = TempDir::new().unwrap();
    let baseline = table(&["name", "n"], vec![row("a", 1), row("c", 3)]);
    let current = table(&["name", "n"], vec![row("a", 1), row("b", 2)]);

    run_once(&dir, "baseline", "usp_orders", Ok(baseline)).0.unwrap();
    let (tested, _, _) = run_once(&dir, "test", "usp_orders", Ok(current));

    let outcome = tested.unwrap();
    assert_eq!(outcome.exit_code(), 1);
    let Outcome::Mismatch { report, .. } = outcome else {
        panic!("expected a mismatch");
    };
    assert_eq!(
        report.rows,
        vec![
            DiffRow {
                side: Side::Current,
                row: row("b", 2)
            },
            DiffRow {
                side: Side::Baseline,
                row: row("c", 3)
            },
        ]
    );
}

#[test]
fn test_reordered_rows_fail_the_test() {
    let dir = TempDir::new().unwrap();
    let baseline = table(&["name", "n"], vec![row("a", 1), row("b", 2)]);
    let current = table(&["name", "n"], vec![row("b", 2), row("a", 1)]);

    run_once(&dir, "baseline", "usp_orders", Ok(baseline)).0.unwrap();
    let outcome = run_once(&dir, "test", "usp_orders", Ok(current)).0.unwrap();

    let Outcome::Mismatch { report, .. } = outcome else {
        panic!("expected a mismatch");
    };
    assert!(report.is_reordering_only());
}

#[test]
fn test_missing_baseline_is_a_clean_outcome() {
    let dir = TempDir::new().unwrap();
    let result = table(&["name", "n"], vec![row("a", 1)]);

    let (tested, _, calls) = run_once(&dir, "test", "procUnseen", Ok(result));
    let outcome = tested.unwrap();
    assert_eq!(outcome, Outcome::NoBaseline);
    assert_ne!(outcome.exit_code(), 0);
    assert_eq!(calls, 1);
}

#[test]
fn test_invalid_mode_never_touches_the_database() {
    let dir = TempDir::new().unwrap();
    let result = table(&["name", "n"], vec![row("a", 1)]);

    let (outcome, connects, calls) = run_once(&dir, "bogus", "usp_orders", Ok(result));
    let err = outcome.unwrap_err();
    assert!(matches!(err, Error::InvalidMode(_)));
    assert!(err.is_usage());
    assert_eq!(connects, 0);
    assert_eq!(calls, 0);
}

#[test]
fn test_execution_failure_stores_nothing() {
    let dir = TempDir::new().unwrap();
    let failure = Err(Error::execution("usp_orders", "no such table: orders"));

    let (outcome, _, calls) = run_once(&dir, "baseline", "usp_orders", failure);
    assert!(matches!(outcome.unwrap_err(), Error::Execution { .. }));
    assert_eq!(calls, 1);

    let store = BaselineStore::new(dir.path());
    assert!(store.list("usp_orders").unwrap().is_empty());
}

#[test]
fn test_connection_failure_propagates() {
    let dir = TempDir::new().unwrap();
    let config = config_for(dir.path());

    let outcome = execute(&config, "test", "usp_orders", None, |_config| {
        Err::<FakeExecutor, _>(Error::Connection("server unreachable".to_string()))
    });
    assert!(matches!(outcome.unwrap_err(), Error::Connection(_)));
}

#[test]
fn test_compares_against_newest_baseline() {
    let dir = TempDir::new().unwrap();
    let store = BaselineStore::new(dir.path());
    let old = table(&["v"], vec![vec![Value::Integer(1)]]);
    let newest = table(&["v"], vec![vec![Value::Integer(3)]]);
    let middle = table(&["v"], vec![vec![Value::Integer(2)]]);

    store
        .save_at("procA", None, newest.clone(), Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap())
        .unwrap();
    store
        .save_at("procA", None, old, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
        .unwrap();
    store
        .save_at("procA", None, middle, Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap())
        .unwrap();

    let outcome = run_once(&dir, "test", "procA", Ok(newest)).0.unwrap();
    let Outcome::Matched { baseline } = outcome else {
        panic!("expected a match against the newest baseline");
    };
    assert!(baseline.ends_with("procA_20240103_000000.json"));
}

#[test]
fn test_history_lists_without_connecting() {
    let dir = TempDir::new().unwrap();
    let result = table(&["name", "n"], vec![row("a", 1)]);
    run_once(&dir, "baseline", "usp_orders", Ok(result.clone())).0.unwrap();

    let (outcome, connects, calls) = run_once(&dir, "history", "usp_orders", Ok(result));
    let Outcome::History { entries } = outcome.unwrap() else {
        panic!("expected history");
    };
    assert_eq!(entries.len(), 1);
    assert_eq!(connects, 0);
    assert_eq!(calls, 0);
}
