//! Error taxonomy
//!
//! One enum per failure kind. Messages carry the failing dimension, the
//! offending value (trimmed), and the operation, so callers never need a
//! backtrace to locate the problem.

use thiserror::Error;

/// Trim an offending value for inclusion in an error message.
pub(crate) fn trim_value(v: impl ToString) -> String {
    let s = v.to_string();
    if s.len() > 64 {
        let mut end = 64;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}…", &s[..end])
    } else {
        s
    }
}

/// Schema and bin-configuration failures.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SchemaError {
    #[error("Unknown dimension '{dimension}' in {operation}")]
    UnknownDimension { dimension: String, operation: String },

    #[error("Dimension '{dimension}': expected {expected}, found {found} value '{value}'")]
    TypeMismatch {
        dimension: String,
        expected: String,
        found: String,
        value: String,
    },

    #[error("Dimension '{dimension}': invalid bin config: {message}")]
    InvalidBinConfig { dimension: String, message: String },
}

pub type SchemaResult<T> = Result<T, SchemaError>;

/// Dimension-ordering failures.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OrderingError {
    #[error("Supplied order is not a permutation of the schema dimensions: {message}")]
    NotAPermutation { message: String },

    #[error("Supplied order is empty")]
    EmptyOrder,

    #[error("Ordering budget field '{field}' must be positive, got {value}")]
    InvalidBudget { field: &'static str, value: String },
}

pub type OrderingResult<T> = Result<T, OrderingError>;

/// Row-compilation failures during `fit`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CompileError {
    #[error("Row {row}: dimension '{dimension}': cannot parse '{value}' as a number")]
    NumericParse {
        row: usize,
        dimension: String,
        value: String,
    },
}

pub type CompileResult<T> = Result<T, CompileError>;

/// Query-boundary failures. Queries that merely find nothing return empty
/// results, never errors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum QueryError {
    #[error("Unknown dimension '{dimension}' in {operation} pattern")]
    UnknownDimension { dimension: String, operation: String },

    #[error("exists requires a value for every dimension; '{dimension}' is absent")]
    IncompleteInput { dimension: String },

    #[error("{operation}: '{field}' must be positive, got {value}")]
    InvalidArgument {
        operation: &'static str,
        field: &'static str,
        value: String,
    },
}

impl SchemaError {
    pub fn type_mismatch(
        dimension: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
        value: impl ToString,
    ) -> Self {
        SchemaError::TypeMismatch {
            dimension: dimension.into(),
            expected: expected.into(),
            found: found.into(),
            value: trim_value(value),
        }
    }
}

impl CompileError {
    pub fn numeric_parse(row: usize, dimension: impl Into<String>, value: impl ToString) -> Self {
        CompileError::NumericParse {
            row,
            dimension: dimension.into(),
            value: trim_value(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_context() {
        let e = SchemaError::type_mismatch("qty", "numeric", "bool", "true");
        assert!(e.to_string().contains("qty"));
        assert!(e.to_string().contains("true"));

        let e = QueryError::UnknownDimension {
            dimension: "speed".into(),
            operation: "count".into(),
        };
        assert!(e.to_string().contains("speed"));
        assert!(e.to_string().contains("count"));
    }

    #[test]
    fn test_long_values_are_trimmed() {
        let long = "x".repeat(200);
        let e = CompileError::numeric_parse(3, "qty", &long);
        assert!(e.to_string().len() < 200);
    }
}
