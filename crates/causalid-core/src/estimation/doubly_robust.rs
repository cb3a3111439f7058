//! Doubly-robust (augmented inverse propensity weighted) estimator.
//!
//! Three models are fitted:
//!
//! 1. an outcome model on the treated rows and one on the control rows,
//!    each a linear regression on the adjustment set,
//! 2. a logistic propensity model for being treated given the adjustment set.
//!
//! The per-unit score is
//!
//! ```text
//! (I_t y / p_t + (p_t - I_t) m_t / p_t) - (I_0 y / p_0 + (p_0 - I_0) m_0 / p_0)
//! ```
//!
//! where `I_t`, `I_0` indicate the unit's group, `p_t` is its propensity
//! (`p_0 = 1 - p_t`) and `m_t`, `m_0` the two outcome predictions. The
//! estimate stays consistent when either the outcome models or the
//! propensity model is correct.

use crate::engine::errors::CausalError;
use crate::estimation::data::DataTable;
use crate::estimation::regression::{IrlsOptions, LinearModel, LogisticModel};
use crate::estimation::{Effect, EstimationQuery, Estimator};

/// Configuration for [`DoublyRobust`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DoublyRobustConfig {
    /// Propensities are clipped to `[clip, 1 - clip]`.
    pub propensity_clip: f64,
    /// IRLS iteration limit for the propensity model.
    pub max_iterations: usize,
    /// IRLS convergence threshold on the largest coefficient step.
    pub tolerance: f64,
    /// L2 penalty on the propensity coefficients.
    pub ridge: f64,
}

impl Default for DoublyRobustConfig {
    fn default() -> Self {
        Self {
            propensity_clip: 1e-3,
            max_iterations: 50,
            tolerance: 1e-8,
            ridge: 1e-6,
        }
    }
}

impl DoublyRobustConfig {
    pub fn validate(self) -> Result<Self, CausalError> {
        if !(self.propensity_clip > 0.0 && self.propensity_clip < 0.5) {
            return Err(CausalError::InvalidArgument(
                "doubly robust: propensity_clip must be in (0, 0.5)".into(),
            ));
        }
        if self.max_iterations == 0 {
            return Err(CausalError::InvalidArgument(
                "doubly robust: max_iterations must be > 0".into(),
            ));
        }
        if !(self.tolerance > 0.0 && self.tolerance.is_finite()) {
            return Err(CausalError::InvalidArgument(
                "doubly robust: tolerance must be finite and > 0".into(),
            ));
        }
        if !(self.ridge >= 0.0 && self.ridge.is_finite()) {
            return Err(CausalError::InvalidArgument(
                "doubly robust: ridge must be finite and >= 0".into(),
            ));
        }
        Ok(self)
    }
}

/// Doubly-robust effect estimator.
#[derive(Debug, Clone, Copy, Default)]
pub struct DoublyRobust {
    config: DoublyRobustConfig,
}

impl DoublyRobust {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DoublyRobustConfig) -> Result<Self, CausalError> {
        Ok(Self {
            config: config.validate()?,
        })
    }

    pub fn config(&self) -> &DoublyRobustConfig {
        &self.config
    }
}

impl Estimator for DoublyRobust {
    fn name(&self) -> &'static str {
        "DoublyRobust"
    }

    fn estimate(&self, data: &DataTable, query: &EstimationQuery) -> Result<Effect, CausalError> {
        query.check_columns(data)?;
        let config = self.config.validate()?;
        let treatment = data.column(query.treatment.name())?;

        let group = |value: f64| -> Vec<usize> {
            (0..data.rows()).filter(|&r| treatment[r] == value).collect()
        };
        let treated = group(query.treated_value);
        let control = group(query.control_value);
        if treated.is_empty() || control.is_empty() {
            return Err(CausalError::InvalidArgument(format!(
                "doubly robust: need rows with {} = {} and {} = {}",
                query.treatment, query.treated_value, query.treatment, query.control_value
            )));
        }

        let fit_outcome = |rows: &[usize]| {
            LinearModel::fit(
                &data.design(&query.adjustment, rows, true)?,
                &data.vector(query.outcome.name(), rows)?,
            )
        };
        let treated_model = fit_outcome(&treated)?;
        let control_model = fit_outcome(&control)?;

        let all = data.all_rows();
        let labels = nalgebra::DVector::from_iterator(
            all.len(),
            all.iter().map(|&r| if treatment[r] == query.treated_value { 1.0 } else { 0.0 }),
        );
        let propensity = LogisticModel::fit(
            &data.design(&query.adjustment, &all, true)?,
            &labels,
            IrlsOptions {
                max_iterations: config.max_iterations,
                tolerance: config.tolerance,
                ridge: config.ridge,
            },
        )?;

        let rows = query.evaluation_rows(data)?;
        let x = data.design(&query.adjustment, &rows, true)?;
        let m_t = treated_model.predict(&x);
        let m_0 = control_model.predict(&x);
        let p = propensity.predict_proba(&x);
        let y = data.vector(query.outcome.name(), &rows)?;

        let clip = config.propensity_clip;
        let scores = rows
            .iter()
            .enumerate()
            .map(|(i, &r)| {
                let i_t = if treatment[r] == query.treated_value { 1.0 } else { 0.0 };
                let i_0 = if treatment[r] == query.control_value { 1.0 } else { 0.0 };
                let p_t = p[i].clamp(clip, 1.0 - clip);
                let p_0 = 1.0 - p_t;
                (y[i] * i_t / p_t + (p_t - i_t) * m_t[i] / p_t)
                    - (y[i] * i_0 / p_0 + (p_0 - i_0) * m_0[i] / p_0)
            })
            .collect();

        #[cfg(feature = "tracing")]
        tracing::debug!(
            treated = treated.len(),
            control = control.len(),
            "doubly robust: fitted outcome and propensity models"
        );

        query.summarise(scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimation::testdata;
    use crate::estimation::Quantity;

    #[test]
    fn recovers_confounded_effect() {
        let data = testdata::confounded(2000, 2.0, 42);
        let query = EstimationQuery::ate("y", "t", vec!["w".into(), "g".into()]);
        let ate = DoublyRobust::new()
            .estimate(&data, &query)
            .unwrap()
            .as_scalar()
            .unwrap();
        assert!((ate - 2.0).abs() < 0.2, "ate = {}", ate);
    }

    #[test]
    fn conditional_average() {
        let data = testdata::confounded(2000, 2.0, 9);
        let query = EstimationQuery::ate("y", "t", vec!["w".into()])
            .with_quantity(Quantity::Cate)
            .with_conditions(vec![("g".into(), 0.0)]);
        let cate = DoublyRobust::new()
            .estimate(&data, &query)
            .unwrap()
            .as_scalar()
            .unwrap();
        assert!((cate - 2.0).abs() < 0.3, "cate = {}", cate);
    }

    #[test]
    fn needs_both_groups() {
        let data = DataTable::from_columns([
            ("t", vec![1.0, 1.0, 1.0]),
            ("w", vec![0.0, 1.0, 2.0]),
            ("y", vec![1.0, 2.0, 3.0]),
        ])
        .unwrap();
        let query = EstimationQuery::ate("y", "t", vec!["w".into()]);
        assert!(matches!(
            DoublyRobust::new().estimate(&data, &query),
            Err(CausalError::InvalidArgument(_))
        ));
    }

    #[test]
    fn config_validation() {
        let bad = DoublyRobustConfig {
            propensity_clip: 0.7,
            ..DoublyRobustConfig::default()
        };
        assert!(DoublyRobust::with_config(bad).is_err());
        assert!(DoublyRobust::with_config(DoublyRobustConfig::default()).is_ok());
    }
}
