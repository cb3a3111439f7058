//! Single-model meta-learner.

use causalid_prob::Variable;
use nalgebra::DMatrix;

use crate::engine::errors::CausalError;
use crate::estimation::data::DataTable;
use crate::estimation::regression::LinearModel;
use crate::estimation::{Effect, EstimationQuery, Estimator};

/// Fits one linear model of the outcome on `[treatment, adjustment]` and
/// reads effects off as the difference between predictions with the
/// treatment forced to its treated and control values.
#[derive(Debug, Clone, Copy, Default)]
pub struct SLearner;

impl SLearner {
    pub fn new() -> Self {
        Self
    }
}

impl Estimator for SLearner {
    fn name(&self) -> &'static str {
        "SLearner"
    }

    fn estimate(&self, data: &DataTable, query: &EstimationQuery) -> Result<Effect, CausalError> {
        query.check_columns(data)?;
        let features: Vec<Variable> = std::iter::once(query.treatment.clone())
            .chain(query.adjustment.iter().cloned())
            .collect();

        let all = data.all_rows();
        let model = LinearModel::fit(
            &data.design(&features, &all, true)?,
            &data.vector(query.outcome.name(), &all)?,
        )?;

        let rows = query.evaluation_rows(data)?;
        let x = data.design(&features, &rows, true)?;
        let predict_at = |value: f64| {
            let mut forced: DMatrix<f64> = x.clone();
            forced.column_mut(1).fill(value);
            model.predict(&forced)
        };
        let effects = predict_at(query.treated_value) - predict_at(query.control_value);
        query.summarise(effects.iter().copied().collect())
    }
}
