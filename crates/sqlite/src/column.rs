//! Columns and their foreign-key references

use crate::cell::ColumnBinding;
use crate::error::{Error, Result};
use crate::storage::sql;
use crate::table::Table;
use mirror_value::{ColumnType, Quantity, Value};

/// A reference from a column to the primary-key column of another table.
///
/// Held as a `(table name, column name)` pair; resolution against a value
/// happens through [`crate::Database::referenced_row`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForeignKey {
    table: String,
    column: String,
}

impl ForeignKey {
    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn column(&self) -> &str {
        &self.column
    }
}

/// One column of a table.
///
/// Drafted columns mutate freely through the setters; once attached every
/// structural property is frozen and the setters fail with
/// `InvalidOperation`.
#[derive(Debug)]
pub struct Column {
    name: String,
    ty: ColumnType,
    quantity: Quantity,
    nullable: bool,
    primary_key: bool,
    default: Option<Value>,
    foreign_key: Option<ForeignKey>,
    attached: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, ty: ColumnType) -> Result<Column> {
        let name = name.into();
        sql::validate_name(&name)?;
        Ok(Column {
            name,
            ty,
            quantity: Quantity::Single,
            nullable: true,
            primary_key: false,
            default: None,
            foreign_key: None,
            attached: false,
        })
    }

    /// Makes this a list column: each cell packs a homogeneous list of the
    /// element type into one stored blob.
    pub fn list(mut self) -> Self {
        self.quantity = Quantity::List;
        self
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        if self.primary_key && nullable {
            return self;
        }
        self.nullable = nullable;
        self
    }

    /// Marks this column as (part of) the primary key. Implies non-nullable.
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    pub fn default(mut self, value: impl Into<Value>) -> Self {
        let value = value.into();
        self.default = (!value.is_null()).then_some(value);
        self
    }

    /// Makes this column a foreign key to `column` of `table`. The target
    /// must be a primary-key column; the column's element type is taken from
    /// the target. The target table must be attached by the time this column
    /// attaches.
    pub fn references(mut self, table: &Table, column: &str) -> Result<Self> {
        let target = table
            .column(column)
            .ok_or_else(|| Error::ColumnNotFound(column.to_owned()))?;
        if !target.is_primary_key() {
            return Err(Error::InvalidOperation(format!(
                "column {} of table {} is not a primary key",
                target.name(),
                table.name()
            )));
        }
        self.ty = target.column_type();
        self.foreign_key = Some(ForeignKey {
            table: table.name().to_owned(),
            column: target.name().to_owned(),
        });
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column_type(&self) -> ColumnType {
        self.ty
    }

    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn foreign_key(&self) -> Option<&ForeignKey> {
        self.foreign_key.as_ref()
    }

    /// Whether the column is mirrored by a physical column in storage.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    fn frozen(&self) -> Result<()> {
        if self.attached {
            return Err(Error::InvalidOperation(format!(
                "attached column {} cannot be changed",
                self.name
            )));
        }
        Ok(())
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        sql::validate_name(&name)?;
        self.frozen()?;
        self.name = name;
        Ok(())
    }

    pub fn set_type(&mut self, ty: ColumnType) -> Result<()> {
        self.frozen()?;
        self.ty = ty;
        Ok(())
    }

    pub fn set_quantity(&mut self, quantity: Quantity) -> Result<()> {
        self.frozen()?;
        self.quantity = quantity;
        Ok(())
    }

    pub fn set_nullable(&mut self, nullable: bool) -> Result<()> {
        self.frozen()?;
        if self.primary_key && nullable {
            return Err(Error::InvalidOperation(format!(
                "primary-key column {} cannot be nullable",
                self.name
            )));
        }
        self.nullable = nullable;
        Ok(())
    }

    pub fn set_primary_key(&mut self, primary_key: bool) -> Result<()> {
        self.frozen()?;
        self.primary_key = primary_key;
        if primary_key {
            self.nullable = false;
        }
        Ok(())
    }

    pub fn set_default(&mut self, value: impl Into<Value>) -> Result<()> {
        self.frozen()?;
        let value = value.into();
        self.default = (!value.is_null()).then_some(value);
        Ok(())
    }

    /// Checks the invariants an attaching column must satisfy regardless of
    /// whether its table is already in storage.
    pub(crate) fn validate_for_attach(&self) -> Result<()> {
        if self.primary_key && self.nullable {
            return Err(Error::InvalidOperation(format!(
                "primary-key column {} cannot be nullable",
                self.name
            )));
        }
        if let Some(default) = &self.default {
            let scalar_binding = ColumnBinding {
                ty: self.ty,
                quantity: Quantity::Single,
                nullable: true,
                primary_key: self.primary_key,
            };
            if self.quantity == Quantity::List {
                return Err(Error::InvalidType {
                    expected: format!("no default for list column {}", self.name),
                    found: default.kind().into(),
                });
            }
            scalar_binding.check(&self.name, default)?;
        }
        Ok(())
    }

    pub(crate) fn binding(&self) -> ColumnBinding {
        ColumnBinding {
            ty: self.ty,
            quantity: self.quantity,
            nullable: self.nullable,
            primary_key: self.primary_key,
        }
    }

    pub(crate) fn mark_attached(&mut self) {
        self.attached = true;
    }

    pub(crate) fn mark_detached(&mut self) {
        self.attached = false;
    }

    pub(crate) fn set_foreign_key_loaded(&mut self, table: String, column: String) {
        self.foreign_key = Some(ForeignKey { table, column });
    }

    /// Rebuild a column from the storage catalog during hydration.
    pub(crate) fn from_catalog(
        name: String,
        ty: ColumnType,
        quantity: Quantity,
        nullable: bool,
        primary_key: bool,
        default: Option<Value>,
    ) -> Column {
        Column {
            name,
            ty,
            quantity,
            nullable,
            primary_key,
            default,
            foreign_key: None,
            attached: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let column = Column::new("value", ColumnType::Text).unwrap();
        assert!(column.is_nullable());
        assert!(!column.is_primary_key());
        assert_eq!(column.quantity(), Quantity::Single);
        assert!(!column.is_attached());
    }

    #[test]
    fn test_primary_key_implies_not_null() {
        let column = Column::new("id", ColumnType::Integer).unwrap().primary_key();
        assert!(!column.is_nullable());
        // Trying to flip it back is ignored by the builder…
        let column = column.nullable(true);
        assert!(!column.is_nullable());
        // …and rejected by the setter.
        let mut column = column;
        assert!(column.set_nullable(true).is_err());
    }

    #[test]
    fn test_invalid_names_rejected() {
        assert!(Column::new("", ColumnType::Integer).is_err());
        assert!(Column::new("a\"b", ColumnType::Integer).is_err());
        assert!(Column::new("Complex1Column &Name_", ColumnType::Integer).is_ok());
    }

    #[test]
    fn test_attached_column_is_frozen() {
        let mut column = Column::new("value", ColumnType::Integer).unwrap();
        column.mark_attached();
        assert!(column.set_name("other").is_err());
        assert!(column.set_type(ColumnType::Text).is_err());
        assert!(column.set_nullable(false).is_err());
        assert!(column.set_primary_key(true).is_err());
        assert!(column.set_default(5i64).is_err());
    }

    #[test]
    fn test_list_default_rejected_at_attach() {
        let column = Column::new("list", ColumnType::Integer)
            .unwrap()
            .list()
            .default(5i64);
        assert!(column.validate_for_attach().is_err());
    }

    #[test]
    fn test_default_kind_must_match() {
        let column = Column::new("num", ColumnType::Integer)
            .unwrap()
            .default("not a number");
        assert!(column.validate_for_attach().is_err());
    }
}
