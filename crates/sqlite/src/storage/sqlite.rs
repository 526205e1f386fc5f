//! SQLite engine over rusqlite
//!
//! Every call opens its own scoped connection with foreign-key enforcement
//! on, runs exactly one statement, and releases the connection on every exit
//! path. Decimals travel as text; SQLite's NUMERIC affinity keeps them
//! lossless where a binary float would not be.

use super::engine::{Engine, WireValue};
use crate::error::{Error, Result};
use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::{params_from_iter, Connection, ToSql};
use std::path::{Path, PathBuf};

pub struct SqliteEngine {
    path: PathBuf,
}

impl SqliteEngine {
    /// Point the engine at a database file. The file is created on first
    /// statement if it does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_owned(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path).map_err(storage_err)?;
        conn.pragma_update(None, "foreign_keys", true)
            .map_err(storage_err)?;
        Ok(conn)
    }
}

fn storage_err(err: rusqlite::Error) -> Error {
    Error::Storage(err.to_string())
}

impl ToSql for WireValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            WireValue::Null => ToSqlOutput::Owned(rusqlite::types::Value::Null),
            WireValue::Integer(i) => ToSqlOutput::Owned(rusqlite::types::Value::Integer(*i)),
            WireValue::Real(r) => ToSqlOutput::Owned(rusqlite::types::Value::Real(*r)),
            WireValue::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            WireValue::Blob(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b)),
            WireValue::Numeric(d) => ToSqlOutput::Owned(rusqlite::types::Value::Text(d.to_string())),
        })
    }
}

fn read_wire(value: ValueRef<'_>) -> Result<WireValue> {
    Ok(match value {
        ValueRef::Null => WireValue::Null,
        ValueRef::Integer(i) => WireValue::Integer(i),
        ValueRef::Real(r) => WireValue::Real(r),
        ValueRef::Text(bytes) => WireValue::Text(
            std::str::from_utf8(bytes)
                .map_err(|e| Error::Storage(format!("non-UTF-8 text from storage: {}", e)))?
                .to_owned(),
        ),
        ValueRef::Blob(bytes) => WireValue::Blob(bytes.to_vec()),
    })
}

impl Engine for SqliteEngine {
    fn execute(&self, sql: &str, params: &[WireValue]) -> Result<usize> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(sql).map_err(storage_err)?;
        stmt.execute(params_from_iter(params.iter()))
            .map_err(storage_err)
    }

    fn execute_returning_id(&self, sql: &str, params: &[WireValue]) -> Result<i64> {
        let conn = self.connect()?;
        {
            let mut stmt = conn.prepare(sql).map_err(storage_err)?;
            stmt.execute(params_from_iter(params.iter()))
                .map_err(storage_err)?;
        }
        Ok(conn.last_insert_rowid())
    }

    fn query(&self, sql: &str, params: &[WireValue]) -> Result<Vec<Vec<WireValue>>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(sql).map_err(storage_err)?;
        let column_count = stmt.column_count();
        let mut rows = stmt
            .query(params_from_iter(params.iter()))
            .map_err(storage_err)?;

        let mut result = Vec::new();
        while let Some(row) = rows.next().map_err(storage_err)? {
            let mut values = Vec::with_capacity(column_count);
            for i in 0..column_count {
                values.push(read_wire(row.get_ref(i).map_err(storage_err)?)?);
            }
            result.push(values);
        }
        Ok(result)
    }
}
