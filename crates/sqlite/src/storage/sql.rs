//! Statement text the mirror produces for the storage engine
//!
//! All identifiers are double-quoted; a name containing a double quote is
//! rejected up front as `InvalidName`. Parameters are positional (`?1`…).

use crate::column::Column;
use crate::error::{Error, Result};
use mirror_value::{ColumnType, Quantity, Value};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Reserved metadata table recording `(table, column, element type)` for
/// every list-quantity column, since SQLite's own schema cannot tell a
/// packed list from a plain blob column.
pub(crate) const LIST_COLUMNS_TABLE: &str = "mirror_listcolumns";

pub(crate) fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() || name.contains('"') {
        return Err(Error::InvalidName(name.to_owned()));
    }
    Ok(())
}

fn quote(ident: &str) -> String {
    format!("\"{}\"", ident)
}

/// Declared affinity of a column definition; list columns are stored packed.
fn declared_type(column: &Column) -> ColumnType {
    match column.quantity() {
        Quantity::List => ColumnType::Blob,
        Quantity::Single => column.column_type(),
    }
}

fn column_def(column: &Column) -> String {
    let mut def = format!("{} {}", quote(column.name()), declared_type(column));
    if !column.is_nullable() {
        def.push_str(" NOT NULL");
    }
    if let Some(default) = column.default_value() {
        def.push_str(" DEFAULT ");
        def.push_str(&default_literal(default));
    }
    def
}

/// Render a scalar default as a SQL literal.
pub(crate) fn default_literal(value: &Value) -> String {
    match value {
        Value::Text(s) => format!("'{}'", s.replace('\'', "''")),
        Value::Blob(bytes) => {
            let mut hex = String::with_capacity(bytes.len() * 2);
            for byte in bytes {
                hex.push_str(&format!("{:02x}", byte));
            }
            format!("X'{}'", hex)
        }
        other => other.to_string(),
    }
}

/// Parse a default literal read back from the catalog.
pub(crate) fn parse_default_literal(raw: &str, ty: ColumnType) -> Result<Value> {
    let invalid = || Error::InvalidArgument(format!("invalid default literal {:?}", raw));
    match ty {
        ColumnType::Text => {
            let trimmed = raw.trim();
            // Unquoted text defaults occur in externally created schemas.
            match trimmed
                .strip_prefix('\'')
                .and_then(|s| s.strip_suffix('\''))
            {
                Some(inner) => Ok(Value::Text(inner.replace("''", "'"))),
                None => Ok(Value::Text(trimmed.to_owned())),
            }
        }
        ColumnType::Blob => {
            let trimmed = raw.trim();
            let hex = trimmed
                .strip_prefix("X'")
                .or_else(|| trimmed.strip_prefix("x'"))
                .and_then(|s| s.strip_suffix('\''))
                .ok_or_else(invalid)?;
            if hex.len() % 2 != 0 {
                return Err(invalid());
            }
            let bytes = (0..hex.len())
                .step_by(2)
                .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid()))
                .collect::<Result<Vec<_>>>()?;
            Ok(Value::Blob(bytes))
        }
        ColumnType::Integer => raw
            .trim()
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| invalid()),
        ColumnType::Real => raw
            .trim()
            .parse::<f64>()
            .map(Value::Real)
            .map_err(|_| invalid()),
        ColumnType::Numeric => Decimal::from_str(raw.trim())
            .map(Value::Numeric)
            .map_err(|_| invalid()),
    }
}

pub(crate) fn create_table(name: &str, columns: &[Column]) -> String {
    let mut defs: Vec<String> = columns.iter().map(column_def).collect();

    let key: Vec<String> = columns
        .iter()
        .filter(|c| c.is_primary_key())
        .map(|c| quote(c.name()))
        .collect();
    if !key.is_empty() {
        defs.push(format!("PRIMARY KEY({})", key.join(",")));
    }

    for column in columns {
        if let Some(fk) = column.foreign_key() {
            defs.push(format!(
                "FOREIGN KEY({}) REFERENCES {}({})",
                quote(column.name()),
                quote(fk.table()),
                quote(fk.column())
            ));
        }
    }

    format!("CREATE TABLE {} ({})", quote(name), defs.join(","))
}

pub(crate) fn add_column(table: &str, column: &Column) -> String {
    format!("ALTER TABLE {} ADD COLUMN {}", quote(table), column_def(column))
}

pub(crate) fn drop_table(table: &str) -> String {
    format!("DROP TABLE {}", quote(table))
}

pub(crate) fn rename_table(old: &str, new: &str) -> String {
    format!("ALTER TABLE {} RENAME TO {}", quote(old), quote(new))
}

pub(crate) fn insert(table: &str, columns: &[&str]) -> String {
    let names: Vec<String> = columns.iter().map(|c| quote(c)).collect();
    let params: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote(table),
        names.join(","),
        params.join(",")
    )
}

pub(crate) fn update_cell(table: &str, column: &str) -> String {
    format!(
        "UPDATE {} SET {} = ?1 WHERE _ROWID_ = ?2",
        quote(table),
        quote(column)
    )
}

pub(crate) fn delete_row(table: &str) -> String {
    format!("DELETE FROM {} WHERE _ROWID_ = ?1", quote(table))
}

pub(crate) fn delete_all_rows(table: &str) -> String {
    format!("DELETE FROM {}", quote(table))
}

pub(crate) fn select_row(table: &str, columns: &[&str]) -> String {
    let names: Vec<String> = columns.iter().map(|c| quote(c)).collect();
    format!(
        "SELECT {} FROM {} WHERE _ROWID_ = ?1",
        names.join(","),
        quote(table)
    )
}

pub(crate) fn select_rows(table: &str, columns: &[&str]) -> String {
    let names: Vec<String> = columns.iter().map(|c| quote(c)).collect();
    format!(
        "SELECT {},_ROWID_ FROM {}",
        names.join(","),
        quote(table)
    )
}

pub(crate) fn list_tables() -> String {
    "SELECT \"name\" FROM \"sqlite_master\" WHERE \"type\"='table'".to_owned()
}

pub(crate) fn table_info(table: &str) -> String {
    format!("PRAGMA table_info({})", quote(table))
}

pub(crate) fn foreign_key_list(table: &str) -> String {
    format!("PRAGMA foreign_key_list({})", quote(table))
}

pub(crate) fn create_list_columns_table() -> String {
    format!(
        "CREATE TABLE {} (\"table\" TEXT NOT NULL,\"column\" TEXT NOT NULL,\"type\" INTEGER NOT NULL)",
        quote(LIST_COLUMNS_TABLE)
    )
}

pub(crate) fn insert_list_column() -> String {
    format!(
        "INSERT INTO {} (\"table\",\"column\",\"type\") VALUES (?1,?2,?3)",
        quote(LIST_COLUMNS_TABLE)
    )
}

pub(crate) fn select_list_columns() -> String {
    format!(
        "SELECT \"table\",\"column\",\"type\" FROM {}",
        quote(LIST_COLUMNS_TABLE)
    )
}

pub(crate) fn delete_list_columns() -> String {
    format!("DELETE FROM {} WHERE \"table\" = ?1", quote(LIST_COLUMNS_TABLE))
}

pub(crate) fn rename_list_columns() -> String {
    format!(
        "UPDATE {} SET \"table\" = ?1 WHERE \"table\" = ?2",
        quote(LIST_COLUMNS_TABLE)
    )
}

/// Storage code for a column's element type, as recorded in the metadata
/// table.
pub(crate) fn type_code(ty: ColumnType) -> i64 {
    match ty {
        ColumnType::Integer => 0,
        ColumnType::Text => 1,
        ColumnType::Blob => 2,
        ColumnType::Real => 3,
        ColumnType::Numeric => 4,
    }
}

pub(crate) fn type_from_code(code: i64) -> Result<ColumnType> {
    Ok(match code {
        0 => ColumnType::Integer,
        1 => ColumnType::Text,
        2 => ColumnType::Blob,
        3 => ColumnType::Real,
        4 => ColumnType::Numeric,
        other => {
            return Err(Error::Storage(format!(
                "unknown element type code {} in {}",
                other, LIST_COLUMNS_TABLE
            )));
        }
    })
}

/// Column affinity from a declared type, per SQLite's determination rules.
pub(crate) fn affinity(declared: &str) -> ColumnType {
    let lower = declared.to_lowercase();
    if lower.contains("int") {
        ColumnType::Integer
    } else if lower.contains("char") || lower.contains("clob") || lower.contains("text") {
        ColumnType::Text
    } else if lower.contains("blob") || lower.is_empty() {
        ColumnType::Blob
    } else if lower.contains("real") || lower.contains("floa") || lower.contains("doub") {
        ColumnType::Real
    } else {
        ColumnType::Numeric
    }
}
