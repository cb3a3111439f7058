//! # Effect Estimation
//!
//! Numeric estimation of causal effects once identification has produced an
//! adjustment set. Estimators see only the data, the variables involved and
//! the quantity asked for; they never inspect the graph.

pub mod data;
pub mod doubly_robust;
pub mod regression;
pub mod slearner;

use std::fmt;
use std::str::FromStr;

use causalid_prob::Variable;

use crate::engine::errors::CausalError;

pub use data::DataTable;
pub use doubly_robust::{DoublyRobust, DoublyRobustConfig};
pub use slearner::SLearner;

/// Which causal quantity to estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Quantity {
    /// Average treatment effect over all rows.
    #[default]
    Ate,
    /// Average effect over the rows matching the query's conditions.
    Cate,
    /// Per-unit effects.
    Ite,
    /// Per-unit effects on the rows matching the query's conditions.
    Cite,
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ate => "ATE",
            Self::Cate => "CATE",
            Self::Ite => "ITE",
            Self::Cite => "CITE",
        })
    }
}

impl FromStr for Quantity {
    type Err = CausalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ATE" => Ok(Self::Ate),
            "CATE" => Ok(Self::Cate),
            "ITE" => Ok(Self::Ite),
            "CITE" => Ok(Self::Cite),
            _ => Err(CausalError::InvalidArgument(format!(
                "unknown quantity '{}' (expected ATE, CATE, ITE or CITE)",
                s
            ))),
        }
    }
}

/// An estimation request.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimationQuery {
    pub outcome: Variable,
    pub treatment: Variable,
    pub adjustment: Vec<Variable>,
    pub quantity: Quantity,
    /// `(column, value)` pairs selecting rows for `Cate` and `Cite`.
    pub conditions: Vec<(Variable, f64)>,
    /// Row indices for `Ite` and `Cite`; all rows when `None`.
    pub individuals: Option<Vec<usize>>,
    pub treated_value: f64,
    pub control_value: f64,
}

impl EstimationQuery {
    /// Average treatment effect of a binary 0/1 treatment.
    pub fn ate(outcome: impl Into<Variable>, treatment: impl Into<Variable>, adjustment: Vec<Variable>) -> Self {
        Self {
            outcome: outcome.into(),
            treatment: treatment.into(),
            adjustment,
            quantity: Quantity::Ate,
            conditions: Vec::new(),
            individuals: None,
            treated_value: 1.0,
            control_value: 0.0,
        }
    }

    pub fn with_quantity(mut self, quantity: Quantity) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_conditions(mut self, conditions: Vec<(Variable, f64)>) -> Self {
        self.conditions = conditions;
        self
    }

    pub fn with_individuals(mut self, rows: Vec<usize>) -> Self {
        self.individuals = Some(rows);
        self
    }

    /// Checks that every referenced column exists.
    pub(crate) fn check_columns(&self, data: &DataTable) -> Result<(), CausalError> {
        let referenced = [&self.outcome, &self.treatment]
            .into_iter()
            .chain(&self.adjustment)
            .chain(self.conditions.iter().map(|(v, _)| v));
        for name in referenced {
            data.column(name.name())?;
        }
        if self.adjustment.contains(&self.treatment) || self.adjustment.contains(&self.outcome) {
            return Err(CausalError::InvalidArgument(
                "adjustment set overlaps treatment or outcome".into(),
            ));
        }
        Ok(())
    }

    /// Rows the effect is reported on.
    pub(crate) fn evaluation_rows(&self, data: &DataTable) -> Result<Vec<usize>, CausalError> {
        let conditioned = matches!(self.quantity, Quantity::Cate | Quantity::Cite);
        if conditioned && self.conditions.is_empty() {
            return Err(CausalError::InvalidArgument(format!(
                "{} needs at least one condition",
                self.quantity
            )));
        }
        let mut rows = if conditioned {
            data.rows_where(&self.conditions)?
        } else {
            data.all_rows()
        };
        if let (Some(individuals), Quantity::Ite | Quantity::Cite) = (&self.individuals, self.quantity) {
            if let Some(&bad) = individuals.iter().find(|&&r| r >= data.rows()) {
                return Err(CausalError::InvalidArgument(format!(
                    "row {} out of range for {} rows",
                    bad,
                    data.rows()
                )));
            }
            rows.retain(|r| individuals.contains(r));
        }
        if rows.is_empty() {
            return Err(CausalError::InvalidArgument(format!(
                "no rows selected for {}",
                self.quantity
            )));
        }
        Ok(rows)
    }

    /// Averages per-unit effects for `Ate`/`Cate`, keeps them otherwise.
    pub(crate) fn summarise(&self, per_unit: Vec<f64>) -> Result<Effect, CausalError> {
        if per_unit.iter().any(|v| !v.is_finite()) {
            return Err(CausalError::Numerical("non-finite effect estimate".into()));
        }
        Ok(match self.quantity {
            Quantity::Ate | Quantity::Cate => {
                Effect::Scalar(per_unit.iter().sum::<f64>() / per_unit.len() as f64)
            }
            Quantity::Ite | Quantity::Cite => Effect::PerUnit(per_unit),
        })
    }
}

/// Estimated effect.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Effect {
    Scalar(f64),
    PerUnit(Vec<f64>),
}

impl Effect {
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Self::Scalar(v) => Some(*v),
            Self::PerUnit(_) => None,
        }
    }

    pub fn per_unit(&self) -> Option<&[f64]> {
        match self {
            Self::Scalar(_) => None,
            Self::PerUnit(v) => Some(v),
        }
    }
}

/// A numeric effect estimator.
pub trait Estimator: Send + Sync {
    fn name(&self) -> &'static str;

    fn estimate(&self, data: &DataTable, query: &EstimationQuery) -> Result<Effect, CausalError>;
}
