//! Tables: the owning container of columns and rows, and the storage
//! mutations that attach them

use crate::cell::Cell;
use crate::collection::{fold_name, NamedItems};
use crate::column::Column;
use crate::error::{Error, Result};
use crate::row::{Row, RowSet};
use crate::storage::{from_wire, sql, to_wire, Store, WireValue};
use mirror_value::{ColumnType, Quantity, Value};

/// A table of the mirrored database.
///
/// Owns its columns (insertion-ordered, case-insensitive names) and rows.
/// A drafted table is pure memory; attaching it through
/// [`crate::Database::add_table`] creates the physical table and inserts any
/// drafted rows. Once attached, columns are frozen, rows can only be
/// inserted or removed, and cell values can only change through
/// [`Row::set`].
#[derive(Debug)]
pub struct Table {
    name: String,
    columns: NamedItems<Column>,
    rows: RowSet,
    store: Option<Store>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Result<Table> {
        let name = name.into();
        sql::validate_name(&name)?;
        Ok(Table {
            name,
            columns: NamedItems::new(),
            rows: RowSet::default(),
            store: None,
        })
    }

    pub fn with_columns(name: impl Into<String>, columns: Vec<Column>) -> Result<Table> {
        let mut table = Table::new(name)?;
        for column in columns {
            table.add_column(column)?;
        }
        Ok(table)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename a drafted table. Attached tables rename through
    /// [`crate::Database::rename_table`], which also moves the physical
    /// table.
    pub fn set_name(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        sql::validate_name(&name)?;
        if self.is_attached() {
            return Err(Error::InvalidOperation(format!(
                "attached table {} renames through Database::rename_table",
                self.name
            )));
        }
        self.name = name;
        Ok(())
    }

    /// Whether the table is mirrored by a physical table in storage.
    pub fn is_attached(&self) -> bool {
        self.store.is_some()
    }

    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    /// Mutable access to a drafted column; the column's own setters refuse
    /// changes once attached.
    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.get_mut(name)
    }

    /// The primary-key subset of the column set, derived from the flags.
    pub fn primary_key(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.is_primary_key())
    }

    pub fn rows(&self) -> &RowSet {
        &self.rows
    }

    pub fn row_mut(&mut self, index: usize) -> Option<&mut Row> {
        self.rows.get_mut(index)
    }

    /// Add a column. On an attached table this issues
    /// `ALTER TABLE … ADD COLUMN`; primary-key and foreign-key columns
    /// cannot be added after creation, and a non-nullable addition needs a
    /// default for the existing rows.
    pub fn add_column(&mut self, mut column: Column) -> Result<&Column> {
        if self.columns.contains(column.name()) {
            return Err(Error::DuplicateName(column.name().to_owned()));
        }
        if column.is_attached() {
            return Err(Error::AlreadyAttached(format!("column {}", column.name())));
        }
        if let Some(store) = &self.store {
            if column.is_primary_key() {
                return Err(Error::TableChangeNotSupported {
                    table: self.name.clone(),
                    reason: format!("cannot add primary-key column {}", column.name()),
                });
            }
            if column.foreign_key().is_some() {
                return Err(Error::TableChangeNotSupported {
                    table: self.name.clone(),
                    reason: format!("cannot add foreign-key column {}", column.name()),
                });
            }
            if !column.is_nullable() && column.default_value().is_none() {
                return Err(Error::InvalidOperation(format!(
                    "column {} is not nullable and has no default value",
                    column.name()
                )));
            }
            column.validate_for_attach()?;

            store.execute(&sql::add_column(&self.name, &column), &[])?;
            if column.quantity() == Quantity::List {
                self.record_list_column(store, &column)?;
            }
            column.mark_attached();
        }
        let name = column.name().to_owned();
        self.columns.insert(&name, column).map(|c| &*c)
    }

    /// Remove a drafted column. Attached columns cannot be removed.
    pub fn remove_column(&mut self, name: &str) -> Result<Option<Column>> {
        match self.columns.get(name) {
            None => Ok(None),
            Some(column) if column.is_attached() => Err(Error::InvalidOperation(format!(
                "cannot remove attached column {} from table {}",
                column.name(),
                self.name
            ))),
            Some(_) => Ok(self.columns.remove(name)),
        }
    }

    /// Insert a row. On an attached table the row is validated, written and
    /// reloaded from storage to pick up generated values; on a drafted table
    /// it is simply kept until the table attaches.
    pub fn insert_row(&mut self, mut row: Row) -> Result<&mut Row> {
        if row.is_attached() {
            return Err(Error::AlreadyAttached("row".into()));
        }
        if let Some(store) = self.store.clone() {
            self.prepare_row(&mut row)?;
            self.check_duplicate_key(&row, self.rows.iter())?;
            self.write_row(&store, &mut row)?;
        }
        Ok(self.rows.push(row))
    }

    pub fn insert_cells(&mut self, cells: Vec<Cell>) -> Result<&mut Row> {
        self.insert_row(Row::with_cells(cells)?)
    }

    /// Remove (detach) the row at `index`, deleting it from storage. The
    /// returned row has its identifier cleared and can only come back as a
    /// brand-new draft.
    pub fn remove_row(&mut self, index: usize) -> Result<Row> {
        if index >= self.rows.len() {
            return Err(Error::InvalidArgument(format!(
                "row index {} out of bounds for table {} with {} rows",
                index,
                self.name,
                self.rows.len()
            )));
        }
        if let (Some(store), Some(link)) = (&self.store, self.rows.get(index).and_then(Row::link))
        {
            store.execute(
                &sql::delete_row(&self.name),
                &[WireValue::Integer(link.rowid)],
            )?;
        }
        let mut row = self.rows.remove(index);
        row.detach();
        Ok(row)
    }

    /// Remove every row, returning the detached drafts.
    pub fn clear_rows(&mut self) -> Result<Vec<Row>> {
        if let Some(store) = &self.store {
            store.execute(&sql::delete_all_rows(&self.name), &[])?;
        }
        let mut rows = self.rows.take_all();
        for row in &mut rows {
            row.detach();
        }
        Ok(rows)
    }

    /// The single integer primary-key column that aliases the storage row
    /// identifier, if the table has one. Its value is generated on insert.
    fn rowid_alias(&self) -> Option<&Column> {
        let mut key = self.primary_key();
        let candidate = key.next()?;
        if key.next().is_some() {
            return None;
        }
        (candidate.column_type() == ColumnType::Integer
            && candidate.quantity() == Quantity::Single)
            .then_some(candidate)
    }

    /// Link a drafted row's cells to this table's columns and check the
    /// entity-specific preconditions. No storage interaction.
    fn prepare_row(&self, row: &mut Row) -> Result<()> {
        for cell in row.cells_mut().iter_mut() {
            let column = self
                .columns
                .get(cell.name())
                .ok_or_else(|| Error::ColumnNotFound(cell.name().to_owned()))?;
            cell.bind(column.binding(), column.name());
            column.binding().check(column.name(), cell.value())?;
        }

        if row.cells().is_empty() {
            return Err(Error::InvalidOperation(format!(
                "cannot insert a row with no cells into table {}",
                self.name
            )));
        }

        let rowid_alias = self.rowid_alias().map(|c| fold_name(c.name()));
        let missing: Vec<String> = self
            .columns
            .iter()
            .filter(|column| {
                !column.is_nullable()
                    && column.default_value().is_none()
                    && Some(fold_name(column.name())) != rowid_alias
                    && !row.cells().contains(column.name())
            })
            .map(|column| column.name().to_owned())
            .collect();
        if !missing.is_empty() {
            return Err(Error::MissingRequiredCells {
                table: self.name.clone(),
                columns: missing,
            });
        }
        Ok(())
    }

    /// The row's values under this table's primary-key columns, in key
    /// order.
    fn key_of<'a>(&'a self, row: &'a Row) -> Vec<Option<&'a Value>> {
        self.primary_key()
            .map(|column| row.cell(column.name()).map(Cell::value))
            .collect()
    }

    fn check_duplicate_key<'a>(
        &'a self,
        row: &'a Row,
        existing: impl Iterator<Item = &'a Row>,
    ) -> Result<()> {
        let key = self.key_of(row);
        if key.iter().all(Option::is_none) {
            return Ok(());
        }
        for other in existing {
            if self.key_of(other) == key {
                let rendered: Vec<String> = key
                    .iter()
                    .map(|v| v.map_or("NULL".to_owned(), ToString::to_string))
                    .collect();
                return Err(Error::DuplicatedKey {
                    table: self.name.clone(),
                    key: rendered.join(","),
                });
            }
        }
        Ok(())
    }

    /// Insert a prepared row and reload its cells from storage.
    fn write_row(&self, store: &Store, row: &mut Row) -> Result<()> {
        let names: Vec<&str> = row.cells().iter().map(Cell::name).collect();
        let params: Vec<WireValue> = row
            .cells()
            .iter()
            .map(|cell| to_wire(cell.value()))
            .collect::<Result<_>>()?;
        let rowid = store.execute_returning_id(&sql::insert(&self.name, &names), &params)?;
        row.attach(store.clone(), self.name.clone(), rowid);
        self.reload_row(store, row, rowid)
    }

    /// Re-read every cell of an attached row, capturing values the storage
    /// layer generated (autoincrement keys, applied defaults).
    fn reload_row(&self, store: &Store, row: &mut Row, rowid: i64) -> Result<()> {
        let names: Vec<&str> = self.columns.iter().map(Column::name).collect();
        let result = store.query(
            &sql::select_row(&self.name, &names),
            &[WireValue::Integer(rowid)],
        )?;
        let Some(stored) = result.into_iter().next() else {
            return Ok(());
        };
        for (column, wire) in self.columns.iter().zip(stored) {
            let value = from_wire(wire, column.column_type(), column.quantity())?;
            match row.cells_mut().get_mut(column.name()) {
                Some(cell) => {
                    cell.bind(column.binding(), column.name());
                    cell.set_value_unchecked(value);
                }
                None => {
                    let mut cell = Cell::new(column.name(), value)?;
                    cell.bind(column.binding(), column.name());
                    row.cells_mut().insert(cell)?;
                }
            }
        }
        Ok(())
    }

    fn record_list_column(&self, store: &Store, column: &Column) -> Result<()> {
        store.execute(
            &sql::insert_list_column(),
            &[
                WireValue::Text(self.name.clone()),
                WireValue::Text(column.name().to_owned()),
                WireValue::Integer(sql::type_code(column.column_type())),
            ],
        )?;
        Ok(())
    }

    /// Everything that must hold before the table can be created in storage.
    pub(crate) fn validate_for_attach(&self) -> Result<()> {
        if self.columns.is_empty() {
            return Err(Error::InvalidOperation(format!(
                "table {} must have at least one column to be created",
                self.name
            )));
        }
        for column in self.columns.iter() {
            column.validate_for_attach()?;
        }
        Ok(())
    }

    /// Create the physical table and attach every drafted row. All rows are
    /// validated before the first storage mutation.
    pub(crate) fn attach(&mut self, store: Store) -> Result<()> {
        self.validate_for_attach()?;

        let mut rows = self.rows.take_all();
        let result = self.attach_with_rows(&store, &mut rows);
        if result.is_err() {
            // Failed attach leaves every row a draft.
            for row in rows.iter_mut() {
                row.detach();
            }
        }
        self.rows = rows_back(rows);
        result?;

        for column in self.columns.iter_mut() {
            column.mark_attached();
        }
        self.store = Some(store);
        Ok(())
    }

    fn attach_with_rows(&self, store: &Store, rows: &mut Vec<Row>) -> Result<()> {
        for row in rows.iter_mut() {
            if row.is_attached() {
                return Err(Error::AlreadyAttached("row".into()));
            }
            self.prepare_row(row)?;
        }
        // Duplicate keys among the drafted rows themselves.
        for i in 0..rows.len() {
            self.check_duplicate_key(&rows[i], rows[..i].iter())?;
        }

        store.execute(&sql::create_table(&self.name, self.columns.as_slice()), &[])?;
        for column in self.columns.iter() {
            if column.quantity() == Quantity::List {
                self.record_list_column(store, column)?;
            }
        }
        for row in rows.iter_mut() {
            self.write_row(store, row)?;
        }
        Ok(())
    }

    /// Clear all storage linkage, irrecoverably.
    pub(crate) fn detach(&mut self) {
        self.store = None;
        for column in self.columns.iter_mut() {
            column.mark_detached();
        }
        for row in self.rows.iter_mut() {
            row.detach();
        }
    }

    pub(crate) fn rename_loaded(&mut self, name: String) {
        for row in self.rows.iter_mut() {
            row.set_table_name(&name);
        }
        self.name = name;
    }

    /// Shell of a table being hydrated from storage.
    pub(crate) fn loaded(name: String, store: Store) -> Table {
        Table {
            name,
            columns: NamedItems::new(),
            rows: RowSet::default(),
            store: Some(store),
        }
    }

    pub(crate) fn push_loaded_column(&mut self, column: Column) -> Result<()> {
        let name = column.name().to_owned();
        self.columns.insert(&name, column)?;
        Ok(())
    }

    pub(crate) fn push_loaded_row(&mut self, row: Row) {
        self.rows.push(row);
    }
}

fn rows_back(rows: Vec<Row>) -> RowSet {
    let mut set = RowSet::default();
    for row in rows {
        set.push(row);
    }
    set
}
