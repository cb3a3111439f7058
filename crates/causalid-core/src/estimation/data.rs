//! Column-oriented numeric data.

use std::collections::BTreeMap;

use causalid_prob::Variable;
use nalgebra::{DMatrix, DVector};

use crate::engine::errors::CausalError;

/// Named `f64` columns of equal length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataTable {
    rows: usize,
    columns: BTreeMap<Variable, Vec<f64>>,
}

impl DataTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from `(name, values)` pairs.
    pub fn from_columns<I, K>(columns: I) -> Result<Self, CausalError>
    where
        I: IntoIterator<Item = (K, Vec<f64>)>,
        K: Into<Variable>,
    {
        let mut table = Self::new();
        for (name, values) in columns {
            table.insert_column(name, values)?;
        }
        Ok(table)
    }

    /// Adds or replaces a column. Its length must match the table's.
    pub fn insert_column(&mut self, name: impl Into<Variable>, values: Vec<f64>) -> Result<(), CausalError> {
        let name = name.into();
        let replacing_only = self.columns.len() == 1 && self.columns.contains_key(&name);
        if !self.columns.is_empty() && !replacing_only && values.len() != self.rows {
            return Err(CausalError::InvalidArgument(format!(
                "column '{}' has {} rows, table has {}",
                name,
                values.len(),
                self.rows
            )));
        }
        self.rows = values.len();
        self.columns.insert(name, values);
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &Variable> {
        self.columns.keys()
    }

    pub fn column(&self, name: &str) -> Result<&[f64], CausalError> {
        self.columns
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| CausalError::InvalidArgument(format!("no data column '{}'", name)))
    }

    /// Column `name` restricted to `rows`.
    pub fn vector(&self, name: &str, rows: &[usize]) -> Result<DVector<f64>, CausalError> {
        let column = self.column(name)?;
        Ok(DVector::from_iterator(rows.len(), rows.iter().map(|&r| column[r])))
    }

    /// Design matrix over `rows`: an optional leading column of ones, then
    /// one column per entry of `names`.
    pub fn design(&self, names: &[Variable], rows: &[usize], intercept: bool) -> Result<DMatrix<f64>, CausalError> {
        let columns = names
            .iter()
            .map(|n| self.column(n.name()))
            .collect::<Result<Vec<_>, _>>()?;
        let offset = usize::from(intercept);
        Ok(DMatrix::from_fn(rows.len(), columns.len() + offset, |i, j| {
            if intercept && j == 0 {
                1.0
            } else {
                columns[j - offset][rows[i]]
            }
        }))
    }

    /// Indices of every row.
    pub fn all_rows(&self) -> Vec<usize> {
        (0..self.rows).collect()
    }

    /// Rows where every `(column, value)` pair matches exactly.
    pub fn rows_where(&self, conditions: &[(Variable, f64)]) -> Result<Vec<usize>, CausalError> {
        let columns = conditions
            .iter()
            .map(|(name, value)| self.column(name.name()).map(|c| (c, *value)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((0..self.rows)
            .filter(|&r| columns.iter().all(|(c, v)| c[r] == *v))
            .collect())
    }
}
