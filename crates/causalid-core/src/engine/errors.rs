//! Error types for identification, adjustment search and estimation.

use std::fmt;

use causalid_prob::{display_vars, VarSet, Variable};
use thiserror::Error;

use crate::engine::adjustment::AdjustmentStyle;

impl From<causalid_frontend::FrontendError> for CausalError {
    fn from(err: causalid_frontend::FrontendError) -> Self {
        match err {
            causalid_frontend::FrontendError::ParseError(msg) => CausalError::Parse(msg),
            causalid_frontend::FrontendError::ValidationError(msg) => CausalError::Validation(msg),
            causalid_frontend::FrontendError::ValidationDiagnostic(diag) => {
                CausalError::Validation(diag.to_string())
            }
            _ => CausalError::Internal(format!("unexpected frontend error: {:?}", err)),
        }
    }
}

/// Which adjustment criterion a search was run for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Criterion {
    Backdoor,
    Frontdoor,
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Backdoor => f.write_str("backdoor"),
            Self::Frontdoor => f.write_str("frontdoor"),
        }
    }
}

/// Errors raised by the identification engine and its collaborators.
///
/// None of these is retried or recovered from internally: every failure is
/// returned to the caller with enough context (treatment, outcome, style) to
/// tell which query failed.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CausalError {
    /// The interventional distribution is provably not identifiable.
    #[error(
        "P({} | do({})) is not identifiable in the current graph",
        display_vars(.outcome),
        display_vars(.treatment)
    )]
    Identification { treatment: VarSet, outcome: VarSet },

    /// No adjustment set satisfies the criterion under the requested style.
    #[error(
        "no set satisfies the {criterion} criterion ({style}) for treatment {{{}}} and outcome {{{}}}",
        display_vars(.treatment),
        display_vars(.outcome)
    )]
    NoAdjustmentSet {
        criterion: Criterion,
        style: AdjustmentStyle,
        treatment: VarSet,
        outcome: VarSet,
    },

    /// Malformed call: unknown variables, bad style names, wrong arity.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The sequence is not a path of the graph.
    #[error("not a valid path: [{}]", display_vars(.0))]
    InvalidPath(Vec<Variable>),

    /// The path does not start with an edge into its first vertex.
    #[error("not a backdoor path: [{}]", display_vars(.0))]
    NotABackdoorPath(Vec<Variable>),

    /// Syntax error in a graph description.
    #[error("parse error: {0}")]
    Parse(String),

    /// Semantic error in a graph description or graph construction.
    #[error("validation error: {0}")]
    Validation(String),

    /// Numerical failure during estimation (singular system, NaN/Inf).
    #[error("numerical error: {0}")]
    Numerical(String),

    /// Internal error (programmer error, not user error).
    #[error("internal error: {0}")]
    Internal(String),
}

impl CausalError {
    pub(crate) fn no_adjustment_set(
        criterion: Criterion,
        style: AdjustmentStyle,
        treatment: &VarSet,
        outcome: &VarSet,
    ) -> Self {
        Self::NoAdjustmentSet {
            criterion,
            style,
            treatment: treatment.clone(),
            outcome: outcome.clone(),
        }
    }
}
