//! Symbolic probability expressions.
//!
//! A [`ProbExpr`] describes a distribution over named variables without
//! holding any numbers: a single (conditional) factor, a product of factors,
//! a marginalisation, or a ratio. Identification builds these bottom-up and
//! an estimator later decides how to evaluate them.
//!
//! Values are never mutated in place. Every operation that "changes" an
//! expression returns a new one, so the same expression can be handed to
//! independent recursive branches.

use std::collections::BTreeSet;
use std::fmt;

use crate::variable::{display_vars, VarSet};

/// A (possibly compound) probability expression.
///
/// Factors of a product live in an ordered set: identical factors are stored
/// once and rendering is deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ProbExpr {
    /// `P(variables | conditional)`.
    Leaf {
        variables: VarSet,
        conditional: VarSet,
    },
    /// Product of factors.
    Product(BTreeSet<ProbExpr>),
    /// `sum_{over} expr`.
    Marginal { over: VarSet, expr: Box<ProbExpr> },
    /// `numerator / denominator`, used for conditional renormalisation.
    Ratio {
        numerator: Box<ProbExpr>,
        denominator: Box<ProbExpr>,
    },
}

impl ProbExpr {
    /// Joint distribution `P(variables)`.
    pub fn joint(variables: VarSet) -> Self {
        Self::Leaf {
            variables,
            conditional: VarSet::new(),
        }
    }

    /// Conditional distribution `P(variables | conditional)`.
    pub fn conditional(variables: VarSet, conditional: VarSet) -> Self {
        Self::Leaf {
            variables,
            conditional,
        }
    }

    /// Product of `factors`.
    ///
    /// Duplicate factors collapse, and a product of exactly one factor is
    /// that factor.
    pub fn product<I>(factors: I) -> Self
    where
        I: IntoIterator<Item = ProbExpr>,
    {
        let mut factors: BTreeSet<ProbExpr> = factors.into_iter().collect();
        if factors.len() == 1 {
            if let Some(only) = factors.pop_first() {
                return only;
            }
        }
        Self::Product(factors)
    }

    /// Sums `over` out of `expr`.
    ///
    /// Marginalising over nothing returns `expr`; nested marginals merge.
    pub fn marginal(over: VarSet, expr: ProbExpr) -> Self {
        if over.is_empty() {
            return expr;
        }
        match expr {
            Self::Marginal {
                over: inner_over,
                expr: inner,
            } => Self::Marginal {
                over: over.union(&inner_over).cloned().collect(),
                expr: inner,
            },
            other => Self::Marginal {
                over,
                expr: Box::new(other),
            },
        }
    }

    pub fn ratio(numerator: ProbExpr, denominator: ProbExpr) -> Self {
        Self::Ratio {
            numerator: Box::new(numerator),
            denominator: Box::new(denominator),
        }
    }

    /// True for a single `P(..|..)` factor.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf { .. })
    }

    /// Restricts this distribution over `universe` down to `keep`.
    ///
    /// A leaf simply names `keep` as its target variables (its conditioning
    /// set is kept). A compound expression is wrapped in a marginal over
    /// `universe - keep`.
    pub fn restrict_to(&self, keep: &VarSet, universe: &VarSet) -> ProbExpr {
        match self {
            Self::Leaf { conditional, .. } => Self::Leaf {
                variables: keep.clone(),
                conditional: conditional.clone(),
            },
            other => {
                let dropped: VarSet = universe.difference(keep).cloned().collect();
                Self::marginal(dropped, other.clone())
            }
        }
    }

    /// Number of leaf factors in the expression tree.
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Leaf { .. } => 1,
            Self::Product(factors) => factors.iter().map(ProbExpr::leaf_count).sum(),
            Self::Marginal { expr, .. } => expr.leaf_count(),
            Self::Ratio {
                numerator,
                denominator,
            } => numerator.leaf_count() + denominator.leaf_count(),
        }
    }
}

impl fmt::Display for ProbExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf {
                variables,
                conditional,
            } => {
                write!(f, "P({}", display_vars(variables))?;
                if !conditional.is_empty() {
                    write!(f, "|{}", display_vars(conditional))?;
                }
                f.write_str(")")
            }
            Self::Product(factors) => {
                if factors.is_empty() {
                    return f.write_str("1");
                }
                for factor in factors {
                    write!(f, "{}", factor)?;
                }
                Ok(())
            }
            Self::Marginal { over, expr } => {
                write!(f, "sum_{{{}}}[{}]", display_vars(over), expr)
            }
            Self::Ratio {
                numerator,
                denominator,
            } => write!(f, "[{}]/[{}]", numerator, denominator),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variable::var_set;
    use std::collections::HashSet;

    fn p(vars: &[&str], cond: &[&str]) -> ProbExpr {
        ProbExpr::conditional(var_set(vars.iter().copied()), var_set(cond.iter().copied()))
    }

    #[test]
    fn renders_backdoor_formula() {
        let expr = ProbExpr::marginal(
            var_set(["W"]),
            ProbExpr::product([p(&["Y"], &["W", "X"]), p(&["W"], &[])]),
        );
        assert_eq!(expr.to_string(), "sum_{W}[P(W)P(Y|W,X)]");
    }

    #[test]
    fn product_collapses_duplicates_and_singletons() {
        let single = ProbExpr::product([p(&["A"], &[]), p(&["A"], &[])]);
        assert_eq!(single, p(&["A"], &[]));

        let empty = ProbExpr::product(std::iter::empty());
        assert_eq!(empty.to_string(), "1");
    }

    #[test]
    fn marginal_over_nothing_is_identity() {
        let inner = p(&["C"], &["A"]);
        assert_eq!(ProbExpr::marginal(VarSet::new(), inner.clone()), inner);
    }

    #[test]
    fn nested_marginals_merge() {
        let inner = ProbExpr::product([p(&["A"], &[]), p(&["B"], &["A"])]);
        let once = ProbExpr::marginal(var_set(["A"]), inner.clone());
        let twice = ProbExpr::marginal(var_set(["B"]), once);
        assert_eq!(twice, ProbExpr::marginal(var_set(["A", "B"]), inner));
    }

    #[test]
    fn factor_order_does_not_matter() {
        let left = ProbExpr::product([p(&["A"], &[]), p(&["B"], &["A"])]);
        let right = ProbExpr::product([p(&["B"], &["A"]), p(&["A"], &[])]);
        assert_eq!(left, right);

        let mut seen = HashSet::new();
        seen.insert(left);
        assert!(seen.contains(&right));
    }

    #[test]
    fn restrict_leaf_replaces_targets() {
        let joint = ProbExpr::joint(var_set(["A", "B", "C"]));
        let universe = var_set(["A", "B", "C"]);
        let restricted = joint.restrict_to(&var_set(["C"]), &universe);
        assert_eq!(restricted, ProbExpr::joint(var_set(["C"])));
        // the original is untouched
        assert_eq!(joint, ProbExpr::joint(var_set(["A", "B", "C"])));
    }

    #[test]
    fn restrict_compound_marginalises() {
        let prod = ProbExpr::product([p(&["A"], &[]), p(&["C"], &["A", "B"])]);
        let universe = var_set(["A", "C"]);
        let restricted = prod.restrict_to(&var_set(["C"]), &universe);
        assert_eq!(restricted.to_string(), "sum_{A}[P(A)P(C|A,B)]");
        assert_eq!(restricted.leaf_count(), 2);
    }

    #[test]
    fn renders_ratio() {
        let expr = ProbExpr::ratio(p(&["A", "B"], &[]), p(&["B"], &[]));
        assert_eq!(expr.to_string(), "[P(A,B)]/[P(B)]");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serializes_variables_as_names() {
        let json = serde_json::to_string(&p(&["Y"], &["X"])).unwrap();
        assert!(json.contains("\"Y\""));
        let back: ProbExpr = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p(&["Y"], &["X"]));
    }
}
