//! # causalid Core
//!
//! Causal effect identification over graphs with latent confounders: the ID
//! algorithm, back-door and front-door adjustment, path validity checks and
//! the estimators that consume an adjustment set.

pub mod engine;
pub mod estimation;

// Re-export commonly used types
pub use causalid_prob::{display_vars, var_set, ProbExpr, VarSet, Variable};
pub use engine::adjustment::{AdjustmentConfig, AdjustmentResult, AdjustmentSets, AdjustmentStyle};
pub use engine::errors::{CausalError, Criterion};
pub use engine::graph::{CausalGraph, GraphBuilder};
pub use engine::identify::id;
pub use engine::model::{CausalModel, Identification, IdentificationEvent, IdentifyMethod, ModelConfig};
pub use estimation::{DataTable, Effect, EstimationQuery, Estimator, Quantity};

/// Parse, validate and build a causal graph from its textual description.
///
/// This is a convenience function that combines parsing, validation and
/// construction, converting frontend errors to core errors.
pub fn graph_from_source(source: &str) -> Result<CausalGraph, CausalError> {
    let ast = causalid_frontend::parse_graph(source)?;
    causalid_frontend::validate_graph(&ast)?;
    CausalGraph::from_ast(&ast)
}
