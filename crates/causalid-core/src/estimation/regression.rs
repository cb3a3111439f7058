//! Least-squares kernels: ordinary least squares and logistic regression by
//! iteratively reweighted least squares.

use nalgebra::{DMatrix, DVector};

use crate::engine::errors::CausalError;

/// Fitted linear model `y = X b`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    coefficients: DVector<f64>,
}

impl LinearModel {
    /// Solves the normal equations `X'X b = X'y`.
    ///
    /// `x` must already carry an intercept column if one is wanted.
    pub fn fit(x: &DMatrix<f64>, y: &DVector<f64>) -> Result<Self, CausalError> {
        if x.nrows() != y.len() {
            return Err(CausalError::InvalidArgument(format!(
                "design has {} rows but response has {}",
                x.nrows(),
                y.len()
            )));
        }
        if x.nrows() < x.ncols() {
            return Err(CausalError::Numerical(format!(
                "{} rows cannot determine {} coefficients",
                x.nrows(),
                x.ncols()
            )));
        }
        let xt = x.transpose();
        let coefficients = (&xt * x)
            .cholesky()
            .ok_or_else(|| CausalError::Numerical("singular design matrix".into()))?
            .solve(&(&xt * y));
        finite(&coefficients, "regression coefficients")?;
        Ok(Self { coefficients })
    }

    pub fn coefficients(&self) -> &DVector<f64> {
        &self.coefficients
    }

    pub fn predict(&self, x: &DMatrix<f64>) -> DVector<f64> {
        x * &self.coefficients
    }

    /// `y - X b`.
    pub fn residuals(&self, x: &DMatrix<f64>, y: &DVector<f64>) -> DVector<f64> {
        y - self.predict(x)
    }
}

/// Fitted logistic model `P(y = 1) = sigmoid(X b)`.
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticModel {
    coefficients: DVector<f64>,
}

/// Iteration controls for [`LogisticModel::fit`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IrlsOptions {
    pub max_iterations: usize,
    pub tolerance: f64,
    /// L2 penalty keeping separable data bounded.
    pub ridge: f64,
}

impl Default for IrlsOptions {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            tolerance: 1e-8,
            ridge: 1e-6,
        }
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl LogisticModel {
    /// Newton-Raphson on the penalised log-likelihood. `y` holds 0/1 labels.
    pub fn fit(x: &DMatrix<f64>, y: &DVector<f64>, options: IrlsOptions) -> Result<Self, CausalError> {
        if x.nrows() != y.len() {
            return Err(CausalError::InvalidArgument(format!(
                "design has {} rows but labels have {}",
                x.nrows(),
                y.len()
            )));
        }
        let (n, k) = x.shape();
        let mut beta = DVector::zeros(k);
        for _ in 0..options.max_iterations {
            let p = (x * &beta).map(sigmoid);
            let weights = p.map(|pi| (pi * (1.0 - pi)).max(1e-10));

            let mut hessian = DMatrix::<f64>::identity(k, k) * options.ridge;
            for i in 0..n {
                let row = x.row(i);
                hessian += row.transpose() * row * weights[i];
            }
            let gradient = x.transpose() * (y - &p) - &beta * options.ridge;

            let step = hessian
                .cholesky()
                .ok_or_else(|| CausalError::Numerical("singular propensity Hessian".into()))?
                .solve(&gradient);
            beta += &step;
            finite(&beta, "propensity coefficients")?;
            if step.amax() < options.tolerance {
                break;
            }
        }
        Ok(Self { coefficients: beta })
    }

    pub fn coefficients(&self) -> &DVector<f64> {
        &self.coefficients
    }

    pub fn predict_proba(&self, x: &DMatrix<f64>) -> DVector<f64> {
        (x * &self.coefficients).map(sigmoid)
    }
}

pub(crate) fn finite(values: &DVector<f64>, what: &str) -> Result<(), CausalError> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(CausalError::Numerical(format!("non-finite {}", what)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ols_recovers_exact_line() {
        let x = DMatrix::from_row_slice(4, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0, 1.0, 3.0]);
        let y = DVector::from_vec(vec![1.0, 3.0, 5.0, 7.0]);
        let model = LinearModel::fit(&x, &y).unwrap();
        assert!((model.coefficients()[0] - 1.0).abs() < 1e-9);
        assert!((model.coefficients()[1] - 2.0).abs() < 1e-9);
        assert!(model.residuals(&x, &y).amax() < 1e-9);
    }

    #[test]
    fn ols_reports_collinearity() {
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 0.0, 1.0, 0.0]);
        let y = DVector::from_vec(vec![1.0, 2.0, 3.0]);
        assert!(matches!(
            LinearModel::fit(&x, &y),
            Err(CausalError::Numerical(_))
        ));
    }

    #[test]
    fn logistic_orders_probabilities() {
        let xs = [-2.0, -1.5, -1.0, -0.5, 0.5, 1.0, 1.5, 2.0, -0.2, 0.2];
        let labels = [0.0, 0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 1.0, 0.0, 1.0];
        let x = DMatrix::from_fn(xs.len(), 2, |i, j| if j == 0 { 1.0 } else { xs[i] });
        let y = DVector::from_column_slice(&labels);
        let model = LogisticModel::fit(&x, &y, IrlsOptions::default()).unwrap();
        let p = model.predict_proba(&x);
        assert!(model.coefficients()[1] > 0.0);
        assert!(p[0] < 0.5 && p[7] > 0.5);
        assert!(p.iter().all(|v| (0.0..=1.0).contains(v)));
    }
}
