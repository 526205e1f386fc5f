//! Error types for the object-relational mirror

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // Naming and membership errors
    #[error("invalid name {0:?}")]
    InvalidName(String),

    #[error("duplicate name {0:?}")]
    DuplicateName(String),

    #[error("{0} is already attached")]
    AlreadyAttached(String),

    #[error("column not found: {0}")]
    ColumnNotFound(String),

    #[error("table not found: {0}")]
    TableNotFound(String),

    // Value and schema errors
    #[error("type mismatch: expected {expected}, found {found}")]
    InvalidType { expected: String, found: String },

    #[error("a row with primary key ({key}) already exists in table {table}")]
    DuplicatedKey { table: String, key: String },

    #[error("table {table} is attached and cannot be restructured: {reason}")]
    TableChangeNotSupported { table: String, reason: String },

    // Lifecycle errors
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error("required columns of table {table} have no cells: {columns:?}")]
    MissingRequiredCells { table: String, columns: Vec<String> },

    // Evaluation errors
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    // Storage-layer failures, propagated unchanged and never retried
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<mirror_value::Error> for Error {
    fn from(err: mirror_value::Error) -> Self {
        match err {
            mirror_value::Error::TypeMismatch { expected, found } => {
                Error::InvalidType { expected, found }
            }
            mirror_value::Error::Incomparable { left, right } => Error::InvalidArgument(format!(
                "values of kind {} and {} cannot be ordered",
                left, right
            )),
            mirror_value::Error::Overflow => Error::InvalidOperation("arithmetic overflow".into()),
            mirror_value::Error::Codec(detail) => Error::InvalidType {
                expected: "packed list blob".into(),
                found: detail,
            },
        }
    }
}
