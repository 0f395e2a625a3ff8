//! Error types for the docpatch library.

use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

use crate::model::Track;

/// Result type alias for docpatch operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while reading, mutating, or persisting a document.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error serializing or deserializing the document graph.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An operation record failed validation. Raised before any mutation
    /// in the batch runs; the whole batch is rejected.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A single operation failed during execution.
    #[error("execution error: {0}")]
    Exec(#[from] ExecError),

    /// Table index does not exist.
    #[error("table {index} is out of range (document has {count} tables)")]
    TableOutOfRange {
        /// Requested table index
        index: usize,
        /// Number of tables in the document
        count: usize,
    },
}

/// Validation failures for operation records.
///
/// Any of these aborts the entire batch before the first mutation runs.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationError {
    /// The record is not a JSON object.
    #[error("operation record must be an object")]
    MalformedRecord,

    /// The `op` discriminator names no known operation.
    #[error("unknown operation: {op}")]
    UnknownOperation {
        /// The unrecognized discriminator value
        op: String,
    },

    /// A required field is absent.
    #[error("operation '{op}' is missing required field '{field}'")]
    MissingField {
        /// Operation kind
        op: String,
        /// Missing field name
        field: String,
    },

    /// A field is present but carries the wrong type.
    #[error("field '{field}' has the wrong type (expected {expected})")]
    TypeMismatch {
        /// Field name
        field: String,
        /// Expected type description
        expected: String,
    },

    /// A field carries a value outside its allowed set.
    #[error("field '{field}' has an invalid value: {message}")]
    BadValue {
        /// Field name
        field: String,
        /// What was wrong with the value
        message: String,
    },

    /// A row/column text list does not match the table dimension it targets.
    #[error("'texts' has {got} entries but the target spans {expected} cells")]
    LengthMismatch {
        /// Number of cells in the targeted row or column
        expected: usize,
        /// Number of texts supplied
        got: usize,
    },
}

/// Per-operation execution failures.
///
/// Unlike [`ValidationError`], these occur after the batch has started and
/// are reported through the [`BatchResult`](crate::engine::BatchResult)
/// rather than failing the call.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExecError {
    /// Unforced delete of a block carrying embedded non-text content.
    #[error("block {index} carries embedded content and cannot be deleted without force")]
    Protected {
        /// Index of the protected block
        index: usize,
    },

    /// Target index does not exist on its track.
    #[error("{track} index {index} is out of range (track has {count} entries)")]
    OutOfRange {
        /// Which index space the operation targeted
        track: Track,
        /// Requested index
        index: usize,
        /// Number of entries on the track
        count: usize,
    },

    /// Row index does not exist in the targeted table.
    #[error("row {row} is out of range (table has {count} rows)")]
    RowOutOfRange {
        /// Requested row
        row: usize,
        /// Number of rows in the table
        count: usize,
    },

    /// Column index does not exist in the targeted table.
    #[error("column {col} is out of range (table has {count} columns)")]
    ColOutOfRange {
        /// Requested column
        col: usize,
        /// Number of columns in the table
        count: usize,
    },

    /// The source file for an `insert_image` operation does not exist.
    #[error("image file not found: {path}")]
    ImageFileNotFound {
        /// The missing path
        path: String,
    },

    /// A replacement pattern failed to compile as a regular expression.
    #[error("invalid pattern: {pattern}")]
    InvalidPattern {
        /// The offending pattern
        pattern: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ExecError::Protected { index: 3 };
        assert_eq!(
            err.to_string(),
            "block 3 carries embedded content and cannot be deleted without force"
        );

        let err = Error::TableOutOfRange { index: 2, count: 1 };
        assert_eq!(
            err.to_string(),
            "table 2 is out of range (document has 1 tables)"
        );
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::MissingField {
            op: "delete".to_string(),
            field: "index".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "operation 'delete' is missing required field 'index'"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_exec_error_serializes_with_kind_tag() {
        let err = ExecError::Protected { index: 1 };
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "protected");
        assert_eq!(json["index"], 1);
    }
}
