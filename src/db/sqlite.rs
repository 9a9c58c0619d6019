//! SQLite executor backed by `rusqlite` (bundled libsqlite3).
//!
//! SQLite has no stored procedures, so a procedure is either a SQL body
//! declared in the configuration, with `?1`, `?2`, ... placeholders for the
//! positional parameters, or a view (or table) of the same name.

use std::collections::BTreeMap;
use std::time::Duration;

use rusqlite::types::Value as SqliteValue;
use rusqlite::{params_from_iter, Connection, OpenFlags};
use tracing::{debug, info};

use super::ProcedureExecutor;
use crate::config::{DatabaseConfig, ProcedureInfo};
use crate::error::{Error, Result};
use crate::models::{TabularResult, Value};

pub const DRIVER: &str = "sqlite";

pub struct SqliteExecutor {
    conn: Connection,
    procedures: BTreeMap<String, ProcedureInfo>,
}

impl SqliteExecutor {
    /// Open the configured database file.
    ///
    /// The file must already exist. `timeout` bounds how long a statement
    /// waits on a locked database.
    pub fn connect(
        config: &DatabaseConfig,
        timeout: Duration,
        procedures: BTreeMap<String, ProcedureInfo>,
    ) -> Result<Self> {
        if !config.driver.eq_ignore_ascii_case(DRIVER) {
            return Err(Error::Connection(format!(
                "unsupported driver '{}' (supported: {DRIVER})",
                config.driver
            )));
        }

        let connection_err =
            |e: rusqlite::Error| Error::Connection(format!("{}: {e}", config.path.display()));

        let conn = Connection::open_with_flags(
            &config.path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(connection_err)?;
        conn.busy_timeout(timeout).map_err(connection_err)?;

        // Opening is lazy; touch the schema so a non-database file fails here
        conn.query_row("PRAGMA schema_version", [], |row| row.get::<_, i64>(0))
            .map_err(connection_err)?;

        info!("Successfully connected to database");
        Ok(Self { conn, procedures })
    }

    /// SQL text run for `procedure`
    fn statement_for(&self, procedure: &str, params: &[Value]) -> Result<String> {
        if let Some(body) = self.procedures.get(procedure).and_then(|p| p.sql.as_deref()) {
            return Ok(body.to_string());
        }
        if !params.is_empty() {
            return Err(Error::execution(
                procedure,
                "parameters given but no sql body is configured for this procedure",
            ));
        }
        Ok(format!("SELECT * FROM \"{}\"", escape_ident(procedure)))
    }
}

impl ProcedureExecutor for SqliteExecutor {
    fn execute(&mut self, procedure: &str, params: &[Value]) -> Result<TabularResult> {
        let sql = self.statement_for(procedure, params)?;
        info!("Executing: {sql}");
        debug!("Parameters: {params:?}");

        let exec_err = |e: rusqlite::Error| Error::execution(procedure, e.to_string());

        let mut stmt = self.conn.prepare(&sql).map_err(exec_err)?;
        let expected = stmt.parameter_count();
        if expected != params.len() {
            return Err(Error::execution(
                procedure,
                format!("expected {expected} parameter(s), got {}", params.len()),
            ));
        }

        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();

        let mut rows = stmt
            .query(params_from_iter(params.iter().map(to_sqlite_value)))
            .map_err(exec_err)?;

        let mut data = Vec::new();
        while let Some(row) = rows.next().map_err(exec_err)? {
            let mut values = Vec::with_capacity(width);
            for i in 0..width {
                let value: SqliteValue = row.get(i).map_err(exec_err)?;
                values.push(from_sqlite_value(value));
            }
            data.push(values);
        }

        debug!("Fetched {} row(s) from {procedure}", data.len());
        TabularResult::new(columns, data)
    }
}

fn to_sqlite_value(value: &Value) -> SqliteValue {
    match value {
        Value::Null => SqliteValue::Null,
        Value::Integer(i) => SqliteValue::Integer(*i),
        Value::Real(r) => SqliteValue::Real(*r),
        Value::Text(s) => SqliteValue::Text(s.clone()),
        Value::Blob(b) => SqliteValue::Blob(b.clone()),
    }
}

fn from_sqlite_value(value: SqliteValue) -> Value {
    match value {
        SqliteValue::Null => Value::Null,
        SqliteValue::Integer(i) => Value::Integer(i),
        SqliteValue::Real(r) => Value::Real(r),
        SqliteValue::Text(s) => Value::Text(s),
        SqliteValue::Blob(b) => Value::Blob(b),
    }
}

fn escape_ident(name: &str) -> String {
    name.replace('"', "\"\"")
}
