//! An object-relational mirror over an embedded SQLite store
//!
//! Tables, columns, rows and cells are plain in-memory objects. Entities
//! start out *drafted* (pure memory), become *attached* when added to an
//! attached parent — at which point the corresponding storage mutation runs
//! — and are *detached* for good when removed. Every piece of validation
//! happens before any storage statement is issued; a storage failure
//! propagates unchanged and leaves the in-memory graph untouched.
//!
//! ```no_run
//! use mirror_sqlite::{Cell, Column, ColumnType, Database, Table};
//!
//! # fn main() -> mirror_sqlite::Result<()> {
//! let mut db = Database::open("example.sqlite")?;
//! let table = Table::with_columns(
//!     "people",
//!     vec![
//!         Column::new("id", ColumnType::Integer)?.primary_key(),
//!         Column::new("name", ColumnType::Text)?.nullable(false),
//!     ],
//! )?;
//! let people = db.add_table(table)?;
//! people.insert_cells(vec![Cell::new("name", "Ada")?])?;
//! # Ok(())
//! # }
//! ```

mod cell;
mod collection;
mod column;
mod database;
mod error;
mod like;
mod query;
mod row;
mod table;

pub mod storage;

pub use cell::{Cell, CellSet};
pub use column::{Column, ForeignKey};
pub use database::Database;
pub use error::{Error, Result};
pub use query::{Condition, Order};
pub use row::{Row, RowSet};
pub use storage::{Engine, SqliteEngine, WireValue};
pub use table::Table;

pub use mirror_value as value;
pub use mirror_value::{ColumnType, Comparison, Quantity, Value};
