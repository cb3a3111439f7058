//! Types shared by the back-door and front-door searches.

use std::fmt;
use std::str::FromStr;

use causalid_prob::{ProbExpr, VarSet, Variable};
use smallvec::SmallVec;

use crate::engine::errors::CausalError;

/// How many adjustment sets a search returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum AdjustmentStyle {
    /// Back-door: the treatment's direct parents, no search.
    /// Front-door: same as `Minimal`.
    #[default]
    Simple,
    /// The first valid candidate in power-set order (smallest size first).
    Minimal,
    /// Every valid candidate, in power-set order.
    All,
}

impl fmt::Display for AdjustmentStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Simple => "simple",
            Self::Minimal => "minimal",
            Self::All => "all",
        })
    }
}

impl FromStr for AdjustmentStyle {
    type Err = CausalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "simple" => Ok(Self::Simple),
            "minimal" => Ok(Self::Minimal),
            "all" => Ok(Self::All),
            other => Err(CausalError::InvalidArgument(format!(
                "unknown adjustment style '{}' (expected simple, minimal or all)",
                other
            ))),
        }
    }
}

/// Adjustment set(s) found by a search.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum AdjustmentSets {
    /// `simple` and `minimal` styles.
    Single(Vec<Variable>),
    /// `all` style, in enumeration order.
    All(Vec<Vec<Variable>>),
}

impl AdjustmentSets {
    /// The set the accompanying expression was built from.
    pub fn primary(&self) -> &[Variable] {
        match self {
            Self::Single(set) => set,
            Self::All(sets) => sets.first().map(Vec::as_slice).unwrap_or(&[]),
        }
    }

    /// Every returned set.
    pub fn sets(&self) -> Vec<&[Variable]> {
        match self {
            Self::Single(set) => vec![set.as_slice()],
            Self::All(sets) => sets.iter().map(Vec::as_slice).collect(),
        }
    }
}

/// Adjustment set(s) together with the matching estimand.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AdjustmentResult {
    pub sets: AdjustmentSets,
    pub prob: ProbExpr,
}

impl AdjustmentResult {
    /// The adjustment set to hand to an estimator.
    pub fn adjustment(&self) -> &[Variable] {
        self.sets.primary()
    }
}

/// Limits on the power-set enumeration behind `minimal`/`all` searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AdjustmentConfig {
    /// Largest candidate set tried. `None` tries every size.
    pub max_candidate_size: Option<usize>,
    /// Largest candidate pool enumerated in full by an `all` search without
    /// a size bound. First-match searches are never limited by it.
    pub max_pool_size: usize,
}

impl Default for AdjustmentConfig {
    fn default() -> Self {
        Self {
            max_candidate_size: None,
            max_pool_size: 20,
        }
    }
}

impl AdjustmentConfig {
    pub fn validate(self) -> Result<Self, CausalError> {
        if self.max_pool_size == 0 || self.max_pool_size >= usize::BITS as usize {
            return Err(CausalError::InvalidArgument(format!(
                "adjustment search: max_pool_size must be in 1..{}",
                usize::BITS
            )));
        }
        Ok(self)
    }

    /// Candidate subsets of `pool` in power-set order, produced lazily.
    pub(crate) fn candidates<'a>(&self, pool: &'a [Variable]) -> PowerSet<'a> {
        PowerSet::new(pool, self.max_candidate_size.unwrap_or(pool.len()))
    }

    /// Every candidate subset of `pool`, for searches that must see them all.
    ///
    /// Without `max_candidate_size` the pool may hold at most
    /// `max_pool_size` variables.
    pub(crate) fn exhaustive(&self, pool: &[Variable]) -> Result<Vec<VarSet>, CausalError> {
        if self.max_candidate_size.is_none() && pool.len() > self.max_pool_size {
            return Err(CausalError::InvalidArgument(format!(
                "adjustment search: {} candidate variables exceed max_pool_size {}; set max_candidate_size to bound the search",
                pool.len(),
                self.max_pool_size
            )));
        }
        Ok(self.candidates(pool).collect())
    }
}

/// Subsets of a pool by ascending size; subsets of one size come in
/// lexicographic index order.
#[derive(Debug, Clone)]
pub(crate) struct PowerSet<'a> {
    pool: &'a [Variable],
    size: usize,
    max_size: usize,
    indices: SmallVec<[usize; 8]>,
}

impl<'a> PowerSet<'a> {
    pub(crate) fn new(pool: &'a [Variable], max_size: usize) -> Self {
        Self {
            pool,
            size: 0,
            max_size: max_size.min(pool.len()),
            indices: SmallVec::new(),
        }
    }

    fn advance(&mut self) {
        let (n, k) = (self.pool.len(), self.size);
        match (0..k).rev().find(|&i| self.indices[i] < i + n - k) {
            Some(i) => {
                self.indices[i] += 1;
                for j in i + 1..k {
                    self.indices[j] = self.indices[j - 1] + 1;
                }
            }
            None => {
                self.size += 1;
                self.indices = (0..self.size).collect();
            }
        }
    }
}

impl Iterator for PowerSet<'_> {
    type Item = VarSet;

    fn next(&mut self) -> Option<VarSet> {
        if self.size > self.max_size {
            return None;
        }
        let subset = self.indices.iter().map(|&i| self.pool[i].clone()).collect();
        self.advance();
        Some(subset)
    }
}
