//! Build orchestration
//!
//! [`Builder::fit`] turns a schema, a configuration and a sequence of rows
//! into a compiled [`Mdd`]: fit bin models for the numeric dimensions, label
//! every row, choose the dimension order, then hand the projected rows to the
//! configured compiler.

use crate::node::NodeId;
use crate::ordering;
use crate::row::Row;
use crate::slice;
use crate::store::Mdd;
use crate::trie;
use rustc_hash::FxHashMap;
use tabledd_core::error::{CompileError, OrderingError, SchemaError};
use tabledd_core::{
    fit_binner, BinModel, BuildConfig, CompileMethod, OrderingStrategy, Schema, Value,
};
use thiserror::Error;
use tracing::debug;

/// Any failure raised while fitting a diagram.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Ordering(#[from] OrderingError),
    #[error(transparent)]
    Compile(#[from] CompileError),
}

/// Compiles tables into diagrams.
#[derive(Debug, Clone)]
pub struct Builder {
    pub schema: Schema,
    pub config: BuildConfig,
}

impl Builder {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            config: BuildConfig::default(),
        }
    }

    pub fn with_config(mut self, config: BuildConfig) -> Self {
        self.config = config;
        self
    }

    /// Fit a diagram, choosing the dimension order per the configuration.
    pub fn fit(&self, rows: &[Row]) -> Result<Mdd, BuildError> {
        self.fit_impl(rows, None)
    }

    /// Fit a diagram with a caller-supplied dimension order. The order must
    /// be a permutation of the schema names.
    pub fn fit_with_order(&self, rows: &[Row], order: &[String]) -> Result<Mdd, BuildError> {
        self.fit_impl(rows, Some(order))
    }

    fn fit_impl(&self, rows: &[Row], explicit: Option<&[String]>) -> Result<Mdd, BuildError> {
        let bin_models = self.fit_bin_models(rows)?;
        let labeled = self.label_rows(rows, &bin_models)?;

        let names = self.schema.names();
        let order = match explicit {
            Some(o) => ordering::fixed_order(&names, o)?.order,
            None => match self.config.ordering {
                OrderingStrategy::Fixed => names.clone(),
                OrderingStrategy::Heuristic => ordering::propose_order(&names, &labeled).order,
                OrderingStrategy::Search => {
                    ordering::search_order(&names, &labeled, &self.config.ordering_config)?.order
                }
            },
        };

        let idxs: Vec<usize> = order
            .iter()
            .map(|n| names.iter().position(|m| m == n).expect("order is a permutation"))
            .collect();
        let projected: Vec<Vec<Value>> = labeled
            .iter()
            .map(|r| idxs.iter().map(|&i| r[i].clone()).collect())
            .collect();

        let depth = order.len();
        let (nodes, root) = match self.config.compilation_method {
            CompileMethod::Trie => {
                let store = trie::build_trie(&projected, depth);
                if self.config.enable_reduction {
                    trie::reduce(store.into_nodes(), depth)
                } else {
                    (store.into_nodes(), 0 as NodeId)
                }
            }
            CompileMethod::Slice => slice::compile_slice(&projected, depth),
        };

        let mdd = Mdd::from_parts(
            order,
            nodes,
            root,
            depth,
            self.config.laplace_alpha,
            bin_models,
        );
        let size = mdd.size();
        debug!(
            rows = rows.len(),
            nodes = size.nodes,
            arcs = size.arcs,
            method = ?self.config.compilation_method,
            "fit finished"
        );
        Ok(mdd)
    }

    /// Fit one bin model per numeric dimension from the raw column values.
    fn fit_bin_models(&self, rows: &[Row]) -> Result<FxHashMap<String, BinModel>, BuildError> {
        let mut models = FxHashMap::default();
        for dim in self.schema.dims() {
            if !dim.is_numeric() {
                continue;
            }
            let mut values = Vec::new();
            for (i, row) in rows.iter().enumerate() {
                match row.get(&dim.name) {
                    None | Some(Value::Missing) => {}
                    Some(Value::Int(n)) => values.push(*n as f64),
                    Some(Value::Float(x)) => {
                        if !x.is_nan() {
                            values.push(*x);
                        }
                    }
                    Some(Value::Str(s)) => match s.parse::<f64>() {
                        Ok(x) => values.push(x),
                        Err(_) => {
                            return Err(CompileError::numeric_parse(i, &dim.name, s).into());
                        }
                    },
                    Some(v @ Value::Bool(_)) => {
                        return Err(SchemaError::type_mismatch(
                            &dim.name,
                            "numeric",
                            v.type_name(),
                            v,
                        )
                        .into());
                    }
                }
            }
            let cfg = dim
                .bins
                .clone()
                .or_else(|| self.config.default_numeric_bins.clone())
                .unwrap_or_default();
            let model = fit_binner(&dim.name, &values, &cfg, dim.missing_token.clone())?;
            models.insert(dim.name.clone(), model);
        }
        Ok(models)
    }

    /// Turn raw rows into label tuples in schema order: numeric values go
    /// through their bin model, everything else becomes its own label, and
    /// absent or missing cells become the dimension's missing token.
    fn label_rows(
        &self,
        rows: &[Row],
        bin_models: &FxHashMap<String, BinModel>,
    ) -> Result<Vec<Vec<Value>>, BuildError> {
        let mut labeled = Vec::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            let mut out = Vec::with_capacity(self.schema.len());
            for dim in self.schema.dims() {
                let raw = row.get(&dim.name).cloned().unwrap_or(Value::Missing);
                let label = match bin_models.get(&dim.name) {
                    Some(model) => match raw {
                        Value::Str(s) => {
                            let x: f64 = s.parse().map_err(|_| {
                                CompileError::numeric_parse(i, &dim.name, &s)
                            })?;
                            model.apply(&Value::Float(x))
                        }
                        other => model.apply(&other),
                    },
                    None => {
                        if raw.is_missing() {
                            dim.missing_token.clone()
                        } else {
                            raw
                        }
                    }
                };
                out.push(label);
            }
            labeled.push(out);
        }
        Ok(labeled)
    }
}
