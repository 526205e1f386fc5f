//! Common fixtures for the integration tests
#![allow(dead_code)]

use mirror_sqlite::{Cell, Column, ColumnType, Database, Table, Value};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::str::FromStr;
use tempfile::TempDir;

/// A scratch database file, deleted with the directory on drop.
pub struct TestDb {
    _dir: TempDir,
    pub path: PathBuf,
}

impl TestDb {
    /// A path with no database behind it yet.
    pub fn empty() -> TestDb {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("test.sqlite");
        TestDb { _dir: dir, path }
    }

    /// A database seeded with the standard fixture:
    ///
    /// - `Table1`: `Id` integer key, `Value1` required text, `Value2` real;
    ///   rows ("Test", 15.5), ("record 2", 8.0), ("  ", NULL)
    /// - `Table2`: `Value3` text key, `Value4` text;
    ///   rows ("key", NULL), ("key2", "value")
    /// - `Table3`: `Value5` integer key, `Value6` text, `Value7` required
    ///   blob, `Value8` real, `Value9` required numeric;
    ///   row (15, "test", [0xFD, 0x13], NULL, 10.5)
    /// - `Table4`: `Table1Id` foreign key to `Table1.Id`, `Value` text;
    ///   row (id of "record 2", "value5")
    pub fn seeded() -> TestDb {
        let fixture = TestDb::empty();
        let mut database = Database::open(&fixture.path).expect("open");

        let table1 = Table::with_columns(
            "Table1",
            vec![
                column("Id", ColumnType::Integer).primary_key(),
                column("Value1", ColumnType::Text).nullable(false),
                column("Value2", ColumnType::Real),
            ],
        )
        .unwrap();
        let table1 = database.add_table(table1).unwrap();
        table1
            .insert_cells(vec![cell("Value1", "Test"), cell("Value2", 15.5)])
            .unwrap();
        table1
            .insert_cells(vec![cell("Value1", "record 2"), cell("Value2", 8.0)])
            .unwrap();
        table1
            .insert_cells(vec![cell("Value1", "  "), cell("Value2", Value::Null)])
            .unwrap();

        let table2 = Table::with_columns(
            "Table2",
            vec![
                column("Value3", ColumnType::Text).primary_key(),
                column("Value4", ColumnType::Text),
            ],
        )
        .unwrap();
        let table2 = database.add_table(table2).unwrap();
        table2
            .insert_cells(vec![cell("Value3", "key"), cell("Value4", Value::Null)])
            .unwrap();
        table2
            .insert_cells(vec![cell("Value3", "key2"), cell("Value4", "value")])
            .unwrap();

        let table3 = Table::with_columns(
            "Table3",
            vec![
                column("Value5", ColumnType::Integer).primary_key(),
                column("Value6", ColumnType::Text),
                column("Value7", ColumnType::Blob).nullable(false),
                column("Value8", ColumnType::Real),
                column("Value9", ColumnType::Numeric).nullable(false),
            ],
        )
        .unwrap();
        let table3 = database.add_table(table3).unwrap();
        table3
            .insert_cells(vec![
                cell("Value5", 15i64),
                cell("Value6", "test"),
                cell("Value7", vec![0xFDu8, 0x13].as_slice()),
                cell("Value8", Value::Null),
                cell("Value9", dec("10.5")),
            ])
            .unwrap();

        let (record2_id, table4) = {
            let table1 = database.table("Table1").unwrap();
            let record2 = table1
                .rows()
                .iter()
                .find(|row| row.cell("Value1").unwrap().value() == &Value::from("record 2"))
                .unwrap();
            let id = record2.cell("Id").unwrap().value().clone();

            let mut table4 = Table::new("Table4").unwrap();
            table4
                .add_column(
                    column("Table1Id", ColumnType::Integer)
                        .references(table1, "Id")
                        .unwrap(),
                )
                .unwrap();
            table4.add_column(column("Value", ColumnType::Text)).unwrap();
            (id, table4)
        };
        let table4 = database.add_table(table4).unwrap();
        table4
            .insert_cells(vec![
                Cell::new("Table1Id", record2_id).unwrap(),
                cell("Value", "value5"),
            ])
            .unwrap();

        fixture
    }

    pub fn open(&self) -> Database {
        Database::open(&self.path).expect("open")
    }
}

pub fn cell(name: &str, value: impl Into<Value>) -> Cell {
    Cell::new(name, value).unwrap()
}

pub fn column(name: &str, ty: ColumnType) -> Column {
    Column::new(name, ty).unwrap()
}

pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// The value of the named cell of the first row matching `column == needle`.
pub fn find_row_value<'a>(
    table: &'a Table,
    needle_column: &str,
    needle: &Value,
    wanted: &str,
) -> Option<&'a Value> {
    table
        .rows()
        .iter()
        .find(|row| row.cell(needle_column).map(|c| c.value()) == Some(needle))
        .and_then(|row| row.cell(wanted))
        .map(|cell| cell.value())
}
