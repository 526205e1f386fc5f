//! Rows and the row collection owned by a table

use crate::cell::{Cell, CellSet};
use crate::error::{Error, Result};
use crate::storage::{sql, to_wire, Store, WireValue};
use mirror_value::Value;

/// Storage linkage of an attached row.
#[derive(Clone, Debug)]
pub(crate) struct RowLink {
    pub store: Store,
    pub table: String,
    pub rowid: i64,
}

/// One row of a table, owning a named set of cells.
///
/// Drafted rows mutate freely. Once attached, the cell set is frozen and
/// only cell values may change, each change mirrored to storage as a point
/// update before the in-memory value moves.
#[derive(Debug, Default)]
pub struct Row {
    cells: CellSet,
    link: Option<RowLink>,
}

impl Row {
    pub fn new() -> Row {
        Row {
            cells: CellSet::new(),
            link: None,
        }
    }

    pub fn with_cells(cells: Vec<Cell>) -> Result<Row> {
        let mut row = Row::new();
        for cell in cells {
            row.add_cell(cell)?;
        }
        Ok(row)
    }

    pub fn cells(&self) -> &CellSet {
        &self.cells
    }

    pub fn cell(&self, name: &str) -> Option<&Cell> {
        self.cells.get(name)
    }

    /// The cells under this row's primary-key columns. Derived from the cell
    /// bindings; empty for rows that have never been linked.
    pub fn primary_key_cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter().filter(|cell| cell.is_primary_key())
    }

    /// Storage-assigned row identifier; present iff the row is attached.
    pub fn rowid(&self) -> Option<i64> {
        self.link.as_ref().map(|link| link.rowid)
    }

    /// Name of the owning table, while attached.
    pub fn table(&self) -> Option<&str> {
        self.link.as_ref().map(|link| link.table.as_str())
    }

    pub fn is_attached(&self) -> bool {
        self.link.is_some()
    }

    pub fn add_cell(&mut self, cell: Cell) -> Result<()> {
        if self.is_attached() {
            return Err(Error::InvalidOperation(format!(
                "cannot add cell {} to an attached row",
                cell.name()
            )));
        }
        self.cells.insert(cell)?;
        Ok(())
    }

    pub fn remove_cell(&mut self, name: &str) -> Result<Option<Cell>> {
        if self.is_attached() {
            return Err(Error::InvalidOperation(format!(
                "cannot remove cell {} from an attached row",
                name
            )));
        }
        Ok(self.cells.remove(name))
    }

    /// Set the value of an existing cell.
    ///
    /// On an attached row this issues the point update first and changes the
    /// in-memory value only if storage accepted it. Setting the value a cell
    /// already holds is a no-op.
    pub fn set(&mut self, column: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        let link = self.link.clone();
        let cell = self
            .cells
            .get_mut(column)
            .ok_or_else(|| Error::ColumnNotFound(column.to_owned()))?;
        if *cell.value() == value {
            return Ok(());
        }
        if let Some(binding) = cell.binding() {
            binding.check(cell.name(), &value)?;
        }
        if let Some(link) = link {
            let statement = sql::update_cell(&link.table, cell.name());
            let params = [to_wire(&value)?, WireValue::Integer(link.rowid)];
            link.store.execute(&statement, &params)?;
        }
        cell.set_value_unchecked(value);
        Ok(())
    }

    pub(crate) fn cells_mut(&mut self) -> &mut CellSet {
        &mut self.cells
    }

    pub(crate) fn attach(&mut self, store: Store, table: String, rowid: i64) {
        self.link = Some(RowLink {
            store,
            table,
            rowid,
        });
    }

    pub(crate) fn detach(&mut self) {
        self.link = None;
    }

    pub(crate) fn link(&self) -> Option<&RowLink> {
        self.link.as_ref()
    }

    pub(crate) fn set_table_name(&mut self, table: &str) {
        if let Some(link) = &mut self.link {
            link.table = table.to_owned();
        }
    }

    pub(crate) fn loaded(cells: Vec<Cell>, link: RowLink) -> Result<Row> {
        let mut row = Row::with_cells(cells)?;
        row.link = Some(link);
        Ok(row)
    }
}

/// The rows of one table, in load/insertion order.
///
/// Query evaluation (`filter`, `like`, `order` and the aggregates) lives in
/// [`crate::query`] and operates purely over these in-memory rows.
#[derive(Debug, Default)]
pub struct RowSet {
    rows: Vec<Row>,
}

impl RowSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    /// Index of the first row matching the predicate.
    pub fn position(&self, predicate: impl FnMut(&Row) -> bool) -> Option<usize> {
        let mut predicate = predicate;
        self.rows.iter().position(|row| predicate(row))
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Row> {
        self.rows.get_mut(index)
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, Row> {
        self.rows.iter_mut()
    }

    pub(crate) fn push(&mut self, row: Row) -> &mut Row {
        self.rows.push(row);
        self.rows.last_mut().expect("just pushed")
    }

    pub(crate) fn remove(&mut self, index: usize) -> Row {
        self.rows.remove(index)
    }

    pub(crate) fn take_all(&mut self) -> Vec<Row> {
        std::mem::take(&mut self.rows)
    }
}

impl<'a> IntoIterator for &'a RowSet {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
