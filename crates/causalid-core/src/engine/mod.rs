//! The identification engine for causal graphs.
//!
//! This module provides:
//! - **errors**: Error types for identification failures
//! - **graph**: Causal graph with copy-on-write views and bidirected confounders
//! - **latent_dag**: Explicit-latent DAG used for d-separation and path queries
//! - **identify**: The ID algorithm over symbolic probability expressions
//! - **backdoor** / **frontdoor**: Adjustment-set searches
//! - **validity**: Path and adjustment-set checks
//! - **model**: The `CausalModel` facade tying identification to estimation

pub mod adjustment;
pub mod backdoor;
pub mod errors;
pub mod frontdoor;
pub mod graph;
pub mod hidden_confounder;
pub mod identify;
pub mod latent_dag;
pub mod model;
pub mod validity;
