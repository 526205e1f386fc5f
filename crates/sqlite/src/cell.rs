//! Cells: one value held by one row for one column

use crate::collection::NamedItems;
use crate::column::Column;
use crate::error::{Error, Result};
use crate::row::Row;
use crate::storage::sql;
use mirror_value::{ColumnType, Quantity, Value};

/// The slice of column metadata a linked cell validates against.
///
/// Copied from the column when the cell is linked. Attached columns are
/// structurally immutable, so the copy cannot go stale; cells in drafted
/// tables stay unlinked until the table attaches.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ColumnBinding {
    pub ty: ColumnType,
    pub quantity: Quantity,
    pub nullable: bool,
    pub primary_key: bool,
}

impl ColumnBinding {
    pub fn check(&self, column: &str, value: &Value) -> Result<()> {
        if value.is_null() {
            if !self.nullable {
                return Err(Error::InvalidType {
                    expected: format!("non-null value for column {}", column),
                    found: "null".into(),
                });
            }
            return Ok(());
        }

        match (self.quantity, value.quantity()) {
            (Quantity::List, Some(Quantity::Single)) => {
                return Err(Error::InvalidType {
                    expected: format!("{} list for column {}", self.ty, column),
                    found: value.kind().into(),
                });
            }
            (Quantity::Single, Some(Quantity::List)) => {
                return Err(Error::InvalidType {
                    expected: format!("single {} for column {}", self.ty, column),
                    found: value.kind().into(),
                });
            }
            _ => {}
        }

        let element = value.column_type().expect("non-null value has a type");
        let accepted = match (self.quantity, self.ty) {
            // Scalars widen on the way into a numeric or real column, the
            // same promotion the evaluator applies.
            (Quantity::Single, ColumnType::Numeric) => matches!(
                element,
                ColumnType::Integer | ColumnType::Real | ColumnType::Numeric
            ),
            (Quantity::Single, ColumnType::Real) => {
                matches!(element, ColumnType::Integer | ColumnType::Real)
            }
            // List elements must match exactly; the packed blob is decoded
            // by the column's element type alone.
            (_, ty) => element == ty,
        };
        if !accepted {
            return Err(Error::InvalidType {
                expected: format!("{} value for column {}", self.ty, column),
                found: value.kind().into(),
            });
        }
        Ok(())
    }
}

/// One value of one row under one column name.
///
/// A cell created free-standing carries only a column name until it is
/// linked during row attachment or hydration.
#[derive(Debug)]
pub struct Cell {
    name: String,
    value: Value,
    binding: Option<ColumnBinding>,
}

impl Cell {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Result<Cell> {
        let name = name.into();
        sql::validate_name(&name)?;
        Ok(Cell {
            name,
            value: value.into(),
            binding: None,
        })
    }

    /// Build a cell holding the key of `primary_row` for a foreign-key
    /// column. The referenced row must be attached to the foreign key's
    /// target table.
    pub fn referencing(column: &Column, primary_row: &Row) -> Result<Cell> {
        let fk = column.foreign_key().ok_or_else(|| {
            Error::InvalidOperation(format!("column {} is not a foreign key", column.name()))
        })?;
        let table = primary_row.table().ok_or_else(|| {
            Error::InvalidOperation(format!(
                "the row referenced through column {} is not attached",
                column.name()
            ))
        })?;
        if !table.eq_ignore_ascii_case(fk.table()) {
            return Err(Error::InvalidOperation(format!(
                "column {} references table {}, but the row belongs to {}",
                column.name(),
                fk.table(),
                table
            )));
        }
        let key = primary_row
            .cell(fk.column())
            .ok_or_else(|| Error::ColumnNotFound(fk.column().to_owned()))?;
        Cell::new(column.name(), key.value().clone())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Element type of the linked column. None while the cell is unlinked.
    pub fn column_type(&self) -> Option<ColumnType> {
        self.binding.map(|b| b.ty)
    }

    pub fn is_primary_key(&self) -> bool {
        self.binding.is_some_and(|b| b.primary_key)
    }

    pub(crate) fn binding(&self) -> Option<&ColumnBinding> {
        self.binding.as_ref()
    }

    pub(crate) fn bind(&mut self, binding: ColumnBinding, canonical_name: &str) {
        self.binding = Some(binding);
        if self.name != canonical_name {
            self.name = canonical_name.to_owned();
        }
    }

    pub(crate) fn set_value_unchecked(&mut self, value: Value) {
        self.value = value;
    }
}

/// The named cell set owned by one row.
#[derive(Debug, Default)]
pub struct CellSet {
    items: NamedItems<Cell>,
}

impl CellSet {
    pub(crate) fn new() -> Self {
        Self {
            items: NamedItems::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.items.contains(name)
    }

    pub fn get(&self, name: &str) -> Option<&Cell> {
        self.items.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.items.iter()
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut Cell> {
        self.items.get_mut(name)
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Cell> {
        self.items.iter_mut()
    }

    pub(crate) fn insert(&mut self, cell: Cell) -> Result<&mut Cell> {
        let name = cell.name().to_owned();
        self.items.insert(&name, cell)
    }

    pub(crate) fn remove(&mut self, name: &str) -> Option<Cell> {
        self.items.remove(name)
    }
}
