//! Query evaluation over in-memory row collections
//!
//! Filtering, pattern matching, stable multi-key ordering and aggregation.
//! None of this reaches back into storage: the collections are assumed
//! already materialized.

use crate::cell::Cell;
use crate::error::{Error, Result};
use crate::like;
use crate::row::{Row, RowSet};
use mirror_value::{evaluator, Comparison, Value};
use rust_decimal::Decimal;
use std::cmp::Ordering;

/// One conjunct of a filter: `column <comparison> value`.
#[derive(Debug)]
pub struct Condition {
    column: String,
    comparison: Comparison,
    value: Value,
}

impl Condition {
    pub fn new(
        column: impl Into<String>,
        comparison: Comparison,
        value: impl Into<Value>,
    ) -> Condition {
        Condition {
            column: column.into(),
            comparison,
            value: value.into(),
        }
    }
}

/// One sort key: column name plus direction.
#[derive(Debug)]
pub struct Order {
    column: String,
    ascending: bool,
}

impl Order {
    pub fn ascending(column: impl Into<String>) -> Order {
        Order {
            column: column.into(),
            ascending: true,
        }
    }

    pub fn descending(column: impl Into<String>) -> Order {
        Order {
            column: column.into(),
            ascending: false,
        }
    }
}

impl RowSet {
    /// Rows for which every condition holds. A row whose named cell is
    /// missing is excluded rather than an error; ordering comparisons
    /// against a kind that has no order still fail.
    pub fn filter(&self, conditions: &[Condition]) -> Result<Vec<&Row>> {
        let mut matching = Vec::new();
        'rows: for row in self {
            for condition in conditions {
                let Some(cell) = row.cell(&condition.column) else {
                    continue 'rows;
                };
                if !evaluator::compare(cell.value(), &condition.value, condition.comparison)? {
                    continue 'rows;
                }
            }
            matching.push(row);
        }
        Ok(matching)
    }

    /// Rows whose text cell under `column` matches the SQL-style pattern.
    /// Cells that are missing, null or not of text kind never match.
    pub fn like(&self, column: &str, pattern: &str) -> Result<Vec<&Row>> {
        let regex = like::compile(pattern)?;
        Ok(self
            .iter()
            .filter(|row| match row.cell(column).map(Cell::value) {
                Some(Value::Text(text)) => regex.is_match(text),
                _ => false,
            })
            .collect())
    }

    /// Stable multi-key sort. Later keys break ties of earlier ones; a
    /// missing cell sorts as null, and nulls sort before every non-null
    /// value under ascending order. A key over an unorderable kind fails
    /// with `InvalidArgument`.
    pub fn order(&self, orders: &[Order]) -> Result<Vec<&Row>> {
        let mut sorted: Vec<&Row> = self.iter().collect();
        let mut failure = None;
        sorted.sort_by(|a, b| {
            for order in orders {
                let left = cell_value(a, &order.column);
                let right = cell_value(b, &order.column);
                match evaluator::ordering(left, right) {
                    Ok(Ordering::Equal) => continue,
                    Ok(found) => return if order.ascending { found } else { found.reverse() },
                    Err(err) => {
                        failure.get_or_insert(err);
                        return Ordering::Equal;
                    }
                }
            }
            Ordering::Equal
        });
        match failure {
            Some(err) => Err(err.into()),
            None => Ok(sorted),
        }
    }

    /// Largest non-null value of the column; `Null` when there is none.
    pub fn max(&self, column: &str) -> Result<Value> {
        self.fold_best(column, Comparison::GreaterThan)
    }

    /// Smallest non-null value of the column; `Null` when there is none.
    pub fn min(&self, column: &str) -> Result<Value> {
        self.fold_best(column, Comparison::LessThan)
    }

    fn fold_best(&self, column: &str, keep_if: Comparison) -> Result<Value> {
        let mut best: Option<&Value> = None;
        for value in self.column_values(column) {
            if value.is_null() {
                continue;
            }
            best = match best {
                None => Some(value),
                Some(current) => {
                    if evaluator::compare(value, current, keep_if)? {
                        Some(value)
                    } else {
                        Some(current)
                    }
                }
            };
        }
        Ok(best.cloned().unwrap_or(Value::Null))
    }

    /// Sum of the column's non-null values under the value addition rules;
    /// `Null` when there is nothing to add.
    pub fn sum(&self, column: &str) -> Result<Value> {
        let mut acc = Value::Null;
        for value in self.column_values(column) {
            acc = evaluator::sum(&acc, value)?;
        }
        Ok(acc)
    }

    /// Arithmetic mean of the column's non-null values. Fails when there are
    /// none, or when the summed kind does not divide.
    pub fn average(&self, column: &str) -> Result<Value> {
        let count = self
            .column_values(column)
            .filter(|value| !value.is_null())
            .count();
        if count == 0 {
            return Err(Error::InvalidOperation(format!(
                "average of column {} over zero non-null cells",
                column
            )));
        }
        match self.sum(column)? {
            Value::Integer(total) => Ok(Value::Real(total as f64 / count as f64)),
            Value::Real(total) => Ok(Value::Real(total / count as f64)),
            Value::Numeric(total) => total
                .checked_div(Decimal::from(count as u64))
                .map(Value::Numeric)
                .ok_or_else(|| Error::InvalidOperation("average does not divide".into())),
            other => Err(Error::InvalidType {
                expected: "numeric sum".into(),
                found: other.kind().into(),
            }),
        }
    }

    fn column_values<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a Value> {
        self.iter()
            .filter_map(move |row| row.cell(column).map(Cell::value))
    }
}

fn cell_value<'a>(row: &'a Row, column: &str) -> &'a Value {
    row.cell(column).map_or(&Value::Null, Cell::value)
}
