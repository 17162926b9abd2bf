//! Tabledd Core - Value, schema and configuration types
//!
//! This crate provides the foundational types shared by the tabledd diagram
//! engine: the tagged runtime [`Value`], dimension schemas, numeric binning,
//! build/query configuration, and the error taxonomy.

pub mod binning;
pub mod config;
pub mod error;
pub mod schema;
pub mod value;

pub use binning::{fit_binner, BinConfig, BinModel, BinStrategy};
pub use config::{BuildConfig, CompileMethod, Objective, OrderingConfig, OrderingStrategy, QueryConfig};
pub use error::{CompileError, OrderingError, QueryError, SchemaError};
pub use schema::{Dimension, DimensionType, Schema, DEFAULT_MISSING_TOKEN};
pub use value::Value;
