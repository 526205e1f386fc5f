//! Mirror Value - the typed value model shared by the mirror crates
//!
//! This crate provides the closed value union stored in database cells:
//! - Five scalar kinds (integer, text, blob, real, numeric) plus null
//! - Homogeneous list forms of every scalar kind
//! - Comparison and addition with implicit numeric widening
//! - A binary codec that packs a list into one opaque blob

pub mod codec;
pub mod evaluator;
pub mod types;

mod error;

pub use error::{Error, Result};
pub use evaluator::{compare, ordering, sum, Comparison};
pub use types::{ColumnType, Quantity, Value};
