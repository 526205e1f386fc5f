//! Storage boundary: the engine trait, the SQLite implementation, statement
//! text generation and wire-value conversion

mod engine;
pub(crate) mod sql;
mod sqlite;
mod wire;

pub use engine::{Engine, WireValue};
pub use sqlite::SqliteEngine;

pub(crate) use wire::{from_wire, to_wire};

use crate::error::Result;
use std::fmt;
use std::sync::Arc;

/// Cheap-to-clone handle that every attached entity keeps to reach storage.
///
/// Each call runs one statement inside the engine's own connection scope;
/// there is no shared connection and no transaction spanning calls.
#[derive(Clone)]
pub(crate) struct Store {
    engine: Arc<dyn Engine>,
}

impl Store {
    pub fn new(engine: Arc<dyn Engine>) -> Self {
        Self { engine }
    }

    pub fn execute(&self, sql: &str, params: &[WireValue]) -> Result<usize> {
        tracing::debug!("execute: {}", sql);
        self.engine.execute(sql, params)
    }

    pub fn execute_returning_id(&self, sql: &str, params: &[WireValue]) -> Result<i64> {
        tracing::debug!("execute returning id: {}", sql);
        self.engine.execute_returning_id(sql, params)
    }

    pub fn query(&self, sql: &str, params: &[WireValue]) -> Result<Vec<Vec<WireValue>>> {
        tracing::debug!("query: {}", sql);
        self.engine.query(sql, params)
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Store")
    }
}
