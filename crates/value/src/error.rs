//! Error types for value operations

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("values of kind {left} and {right} have no defined order")]
    Incomparable { left: String, right: String },

    #[error("arithmetic overflow")]
    Overflow,

    #[error("malformed list blob: {0}")]
    Codec(String),
}
