//! # causalid-prob
//!
//! Variables and symbolic probability expressions shared by the causal
//! identification engine and its tools.

pub mod expr;
pub mod variable;

// Re-export commonly used types
pub use expr::ProbExpr;
pub use variable::{display_vars, var_set, VarSet, Variable};
