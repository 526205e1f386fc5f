//! The database: owner of the table set and of the storage engine handle

use crate::cell::Cell;
use crate::collection::NamedItems;
use crate::column::Column;
use crate::error::{Error, Result};
use crate::row::{Row, RowLink};
use crate::storage::{from_wire, sql, Engine, SqliteEngine, Store, WireValue};
use crate::table::Table;
use mirror_value::{ColumnType, Quantity, Value};
use std::path::Path;
use std::sync::Arc;

/// One SQLite database mirrored as an object graph.
///
/// Opening hydrates every table, column, foreign key and row into memory;
/// from then on mutations flow through the attachment lifecycle and queries
/// evaluate purely over the in-memory rows. The design assumes a single
/// logical owner per database; there is no in-process locking.
pub struct Database {
    store: Store,
    tables: NamedItems<Table>,
}

impl Database {
    /// Open (or create) a SQLite database file and load its contents.
    pub fn open(path: impl AsRef<Path>) -> Result<Database> {
        Self::with_engine(Arc::new(SqliteEngine::open(path)))
    }

    /// Open over any storage engine implementation.
    pub fn with_engine(engine: Arc<dyn Engine>) -> Result<Database> {
        let mut database = Database {
            store: Store::new(engine),
            tables: NamedItems::new(),
        };
        database.load()?;
        Ok(database)
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.iter()
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub fn table_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables.get_mut(name)
    }

    /// Attach a drafted table: create it in storage together with its
    /// columns and any drafted rows, then take ownership of it.
    pub fn add_table(&mut self, mut table: Table) -> Result<&mut Table> {
        if table.is_attached() {
            return Err(Error::AlreadyAttached(format!("table {}", table.name())));
        }
        if self.tables.contains(table.name()) {
            return Err(Error::DuplicateName(table.name().to_owned()));
        }
        self.validate_foreign_keys(&table)?;

        table.attach(self.store.clone())?;
        let name = table.name().to_owned();
        self.tables.insert(&name, table)
    }

    /// Drop a table from storage and return it detached, or `None` when no
    /// such table exists.
    pub fn remove_table(&mut self, name: &str) -> Result<Option<Table>> {
        if !self.tables.contains(name) {
            return Ok(None);
        }
        let table = self.tables.get(name).expect("checked above");
        let table_name = table.name().to_owned();
        self.store.execute(&sql::drop_table(&table_name), &[])?;
        self.store.execute(
            &sql::delete_list_columns(),
            &[WireValue::Text(table_name.clone())],
        )?;

        let mut table = self.tables.remove(name).expect("checked above");
        table.detach();
        Ok(Some(table))
    }

    /// Rename an attached table, moving the physical table and its
    /// list-column metadata along.
    pub fn rename_table(&mut self, old: &str, new: &str) -> Result<()> {
        sql::validate_name(new)?;
        let table = self
            .tables
            .get(old)
            .ok_or_else(|| Error::TableNotFound(old.to_owned()))?;
        let old_name = table.name().to_owned();
        if !old_name.eq_ignore_ascii_case(new) && self.tables.contains(new) {
            return Err(Error::DuplicateName(new.to_owned()));
        }

        self.store.execute(&sql::rename_table(&old_name, new), &[])?;
        self.store.execute(
            &sql::rename_list_columns(),
            &[
                WireValue::Text(new.to_owned()),
                WireValue::Text(old_name.clone()),
            ],
        )?;

        let table = self.tables.get_mut(old).expect("checked above");
        table.rename_loaded(new.to_owned());
        self.tables.rekey(&old_name, new);
        Ok(())
    }

    /// Resolve a foreign-key value to the referenced row by linear scan of
    /// the target table's in-memory rows. O(n) per lookup.
    pub fn referenced_row(&self, column: &Column, value: &Value) -> Option<&Row> {
        let fk = column.foreign_key()?;
        let table = self.tables.get(fk.table())?;
        table
            .rows()
            .iter()
            .find(|row| row.cell(fk.column()).map(Cell::value) == Some(value))
    }

    /// Every foreign key of an attaching table must point at a primary-key
    /// column of a table that is already attached here.
    fn validate_foreign_keys(&self, table: &Table) -> Result<()> {
        for column in table.columns() {
            let Some(fk) = column.foreign_key() else {
                continue;
            };
            let target = self
                .tables
                .get(fk.table())
                .ok_or_else(|| Error::TableNotFound(fk.table().to_owned()))?;
            let target_column = target
                .column(fk.column())
                .ok_or_else(|| Error::ColumnNotFound(fk.column().to_owned()))?;
            if !target_column.is_primary_key() {
                return Err(Error::InvalidOperation(format!(
                    "foreign key {} references non-primary-key column {} of table {}",
                    column.name(),
                    target_column.name(),
                    target.name()
                )));
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Hydration
    // ------------------------------------------------------------------

    fn load(&mut self) -> Result<()> {
        let table_rows = self.store.query(&sql::list_tables(), &[])?;
        let mut names = Vec::new();
        let mut metadata_exists = false;
        for row in table_rows {
            let Some(WireValue::Text(name)) = row.into_iter().next() else {
                return Err(Error::Storage("unexpected catalog row".into()));
            };
            let lower = name.to_lowercase();
            if lower == sql::LIST_COLUMNS_TABLE {
                metadata_exists = true;
            } else if !lower.starts_with("sqlite_") {
                names.push(name);
            }
        }

        let list_columns = if metadata_exists {
            self.load_list_columns()?
        } else {
            self.store.execute(&sql::create_list_columns_table(), &[])?;
            Vec::new()
        };

        for name in names {
            let mut table = Table::loaded(name.clone(), self.store.clone());
            self.load_columns(&mut table, &list_columns)?;
            self.load_foreign_keys(&mut table)?;
            self.load_rows(&mut table)?;
            self.tables.insert(&name, table)?;
        }
        Ok(())
    }

    fn load_list_columns(&self) -> Result<Vec<(String, String, ColumnType)>> {
        let rows = self.store.query(&sql::select_list_columns(), &[])?;
        let mut list_columns = Vec::with_capacity(rows.len());
        for row in rows {
            match <[WireValue; 3]>::try_from(row) {
                Ok([WireValue::Text(table), WireValue::Text(column), WireValue::Integer(code)]) => {
                    list_columns.push((table, column, sql::type_from_code(code)?));
                }
                _ => {
                    return Err(Error::Storage(format!(
                        "unexpected row in {}",
                        sql::LIST_COLUMNS_TABLE
                    )));
                }
            }
        }
        Ok(list_columns)
    }

    fn load_columns(
        &self,
        table: &mut Table,
        list_columns: &[(String, String, ColumnType)],
    ) -> Result<()> {
        let rows = self.store.query(&sql::table_info(table.name()), &[])?;
        for row in rows {
            // PRAGMA table_info: (cid, name, type, notnull, dflt_value, pk)
            let name = match row.get(1) {
                Some(WireValue::Text(name)) => name.clone(),
                _ => return Err(Error::Storage("unexpected table_info row".into())),
            };
            let declared = match row.get(2) {
                Some(WireValue::Text(declared)) => declared.clone(),
                _ => String::new(),
            };
            let not_null = matches!(row.get(3), Some(WireValue::Integer(n)) if *n != 0);
            let primary_key = matches!(row.get(5), Some(WireValue::Integer(n)) if *n != 0);

            let recorded = list_columns.iter().find(|(t, c, _)| {
                t.eq_ignore_ascii_case(table.name()) && c.eq_ignore_ascii_case(&name)
            });
            let (ty, quantity) = match recorded {
                Some((_, _, element)) => (*element, Quantity::List),
                None => (sql::affinity(&declared), Quantity::Single),
            };

            let default = match (quantity, row.get(4)) {
                (Quantity::Single, Some(WireValue::Text(raw))) => {
                    Some(sql::parse_default_literal(raw, ty)?)
                }
                _ => None,
            };

            table.push_loaded_column(Column::from_catalog(
                name,
                ty,
                quantity,
                !not_null,
                primary_key,
                default,
            ))?;
        }
        Ok(())
    }

    fn load_foreign_keys(&self, table: &mut Table) -> Result<()> {
        let rows = self.store.query(&sql::foreign_key_list(table.name()), &[])?;
        for row in rows {
            // PRAGMA foreign_key_list: (id, seq, table, from, to, …)
            let (Some(WireValue::Text(target)), Some(WireValue::Text(from)), Some(WireValue::Text(to))) =
                (row.get(2), row.get(3), row.get(4))
            else {
                continue;
            };
            if let Some(column) = table.column_mut(from) {
                column.set_foreign_key_loaded(target.clone(), to.clone());
            }
        }
        Ok(())
    }

    fn load_rows(&self, table: &mut Table) -> Result<()> {
        let columns: Vec<(String, ColumnType, Quantity)> = table
            .columns()
            .map(|c| (c.name().to_owned(), c.column_type(), c.quantity()))
            .collect();
        let names: Vec<&str> = columns.iter().map(|(name, _, _)| name.as_str()).collect();

        let stored = self
            .store
            .query(&sql::select_rows(table.name(), &names), &[])?;
        for mut wire_row in stored {
            let Some(WireValue::Integer(rowid)) = wire_row.pop() else {
                return Err(Error::Storage("row without _ROWID_".into()));
            };
            let mut cells = Vec::with_capacity(columns.len());
            for ((name, ty, quantity), wire) in columns.iter().zip(wire_row) {
                let value = from_wire(wire, *ty, *quantity)?;
                let mut cell = Cell::new(name.clone(), value)?;
                let column = table.column(name).expect("loaded column");
                cell.bind(column.binding(), column.name());
                cells.push(cell);
            }
            let row = Row::loaded(
                cells,
                RowLink {
                    store: self.store.clone(),
                    table: table.name().to_owned(),
                    rowid,
                },
            )?;
            table.push_loaded_row(row);
        }
        Ok(())
    }
}
