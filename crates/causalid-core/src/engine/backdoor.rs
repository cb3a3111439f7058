//! Back-door adjustment search.

use causalid_prob::{ProbExpr, VarSet, Variable};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::engine::adjustment::{AdjustmentConfig, AdjustmentResult, AdjustmentSets, AdjustmentStyle};
use crate::engine::errors::{CausalError, Criterion};
use crate::engine::graph::CausalGraph;
use crate::engine::latent_dag::LatentDag;

/// Finds back-door adjustment set(s) for the effect of `treatment` on
/// `outcome`.
///
/// - `Simple` returns the union of the treatments' observed parents without
///   searching. A parent of one treatment that descends from another is not
///   corrected for.
/// - `Minimal` returns the first d-separating candidate in power-set order.
/// - `All` returns every d-separating candidate.
///
/// Candidates exclude the treatment, the outcome and every descendant of a
/// treatment. When no treatment has an observed parent and the empty set
/// does not already separate, the search fails up front.
pub fn get_backdoor_set(
    graph: &CausalGraph,
    treatment: &VarSet,
    outcome: &VarSet,
    style: AdjustmentStyle,
    config: AdjustmentConfig,
) -> Result<AdjustmentResult, CausalError> {
    let config = config.validate()?;
    let modified = graph.remove_outgoing_edges(treatment).latent_dag();
    let fail = || CausalError::no_adjustment_set(Criterion::Backdoor, style, treatment, outcome);

    let roots_only = treatment.iter().all(|t| graph.parents(t.name()).is_empty());
    if roots_only && !modified.d_separated(treatment, outcome, &VarSet::new())? {
        return Err(fail());
    }

    let sets = match style {
        AdjustmentStyle::Simple => {
            let mut parents: Vec<Variable> = Vec::new();
            for t in treatment {
                for p in graph.parents(t.name()) {
                    if !parents.contains(p) {
                        parents.push(p.clone());
                    }
                }
            }
            AdjustmentSets::Single(parents)
        }
        AdjustmentStyle::Minimal => {
            let pool = candidate_pool(graph, treatment, outcome);
            let mut found = None;
            for candidate in config.candidates(&pool) {
                if modified.d_separated(treatment, outcome, &candidate)? {
                    found = Some(candidate);
                    break;
                }
            }
            AdjustmentSets::Single(found.ok_or_else(fail)?.into_iter().collect())
        }
        AdjustmentStyle::All => {
            let pool = candidate_pool(graph, treatment, outcome);
            let candidates = config.exhaustive(&pool)?;
            let valid = separating(&modified, treatment, outcome, candidates)?;
            if valid.is_empty() {
                return Err(fail());
            }
            AdjustmentSets::All(valid.into_iter().map(|s| s.into_iter().collect()).collect())
        }
    };

    let adjustment: VarSet = sets.primary().iter().cloned().collect();
    let prob = backdoor_prob(treatment, outcome, &adjustment);

    #[cfg(feature = "tracing")]
    tracing::debug!("back-door estimand ({}): {}", style, prob);

    Ok(AdjustmentResult { sets, prob })
}

/// `sum_{adj} P(outcome | treatment, adj) P(adj)`.
///
/// With an empty adjustment set this is the plain conditional
/// `P(outcome | treatment)`.
pub fn backdoor_prob(treatment: &VarSet, outcome: &VarSet, adjustment: &VarSet) -> ProbExpr {
    let conditional = treatment.union(adjustment).cloned().collect();
    let mut factors = vec![ProbExpr::conditional(outcome.clone(), conditional)];
    if !adjustment.is_empty() {
        factors.push(ProbExpr::joint(adjustment.clone()));
    }
    ProbExpr::marginal(adjustment.clone(), ProbExpr::product(factors))
}

/// Observed nodes that are neither treatment, outcome, nor a descendant of a
/// treatment, in name order.
fn candidate_pool(graph: &CausalGraph, treatment: &VarSet, outcome: &VarSet) -> Vec<Variable> {
    let excluded = graph.descendants(treatment);
    graph
        .nodes()
        .iter()
        .filter(|n| !excluded.contains(*n) && !outcome.contains(*n))
        .cloned()
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn separating(
    dag: &LatentDag,
    treatment: &VarSet,
    outcome: &VarSet,
    candidates: Vec<VarSet>,
) -> Result<Vec<VarSet>, CausalError> {
    let mut valid = Vec::new();
    for candidate in candidates {
        if dag.d_separated(treatment, outcome, &candidate)? {
            valid.push(candidate);
        }
    }
    Ok(valid)
}

/// Validates candidates on the rayon pool; enumeration order is kept.
#[cfg(feature = "parallel")]
fn separating(
    dag: &LatentDag,
    treatment: &VarSet,
    outcome: &VarSet,
    candidates: Vec<VarSet>,
) -> Result<Vec<VarSet>, CausalError> {
    let checked = candidates
        .into_par_iter()
        .map(|candidate| {
            dag.d_separated(treatment, outcome, &candidate)
                .map(|ok| ok.then_some(candidate))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(checked.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::validity::is_valid_backdoor_set;
    use causalid_prob::{display_vars, var_set};

    /// Z1 -> X, Z1 -> Z3, Z2 -> Z3, Z2 -> Y, Z3 -> X, Z3 -> Y, X -> W -> Y
    fn pearl_graph() -> CausalGraph {
        CausalGraph::builder()
            .edge("Z1", "X")
            .edge("Z1", "Z3")
            .edge("Z2", "Z3")
            .edge("Z2", "Y")
            .edge("Z3", "X")
            .edge("Z3", "Y")
            .edge("X", "W")
            .edge("W", "Y")
            .build()
            .unwrap()
    }

    fn search(g: &CausalGraph, style: AdjustmentStyle) -> Result<AdjustmentResult, CausalError> {
        get_backdoor_set(
            g,
            &var_set(["X"]),
            &var_set(["Y"]),
            style,
            AdjustmentConfig::default(),
        )
    }

    #[test]
    fn simple_returns_parents() {
        let result = search(&pearl_graph(), AdjustmentStyle::Simple).unwrap();
        assert_eq!(
            result.sets,
            AdjustmentSets::Single(vec!["Z1".into(), "Z3".into()])
        );
        assert_eq!(result.prob.to_string(), "sum_{Z1,Z3}[P(Y|X,Z1,Z3)P(Z1,Z3)]");
    }

    #[test]
    fn minimal_is_first_smallest_separator() {
        let result = search(&pearl_graph(), AdjustmentStyle::Minimal).unwrap();
        assert_eq!(display_vars(result.adjustment()), "Z1,Z3");
    }

    #[test]
    fn all_lists_every_separator_in_enumeration_order() {
        let g = pearl_graph();
        let result = search(&g, AdjustmentStyle::All).unwrap();
        let AdjustmentSets::All(sets) = &result.sets else {
            panic!("expected all-style sets");
        };
        let rendered: Vec<String> = sets.iter().map(|s| display_vars(s)).collect();
        assert_eq!(rendered, vec!["Z1,Z3", "Z2,Z3", "Z1,Z2,Z3"]);
        for set in sets {
            let set: VarSet = set.iter().cloned().collect();
            assert!(is_valid_backdoor_set(&g, &set, &var_set(["X"]), &var_set(["Y"])).unwrap());
        }
    }

    #[test]
    fn unconfounded_root_treatment_needs_nothing() {
        let g = CausalGraph::builder()
            .edge("X", "M")
            .edge("M", "Y")
            .build()
            .unwrap();
        let result = search(&g, AdjustmentStyle::Simple).unwrap();
        assert!(result.adjustment().is_empty());
        assert_eq!(result.prob.to_string(), "P(Y|X)");

        let all = search(&g, AdjustmentStyle::All).unwrap();
        assert_eq!(all.sets, AdjustmentSets::All(vec![vec![]]));
    }

    #[test]
    fn latent_confounding_of_a_root_fails_the_pre_check() {
        let g = CausalGraph::builder()
            .edge("X", "M")
            .edge("M", "Y")
            .confounded("X", "Y")
            .build()
            .unwrap();
        for style in [AdjustmentStyle::Simple, AdjustmentStyle::Minimal, AdjustmentStyle::All] {
            assert!(matches!(
                search(&g, style),
                Err(CausalError::NoAdjustmentSet { criterion: Criterion::Backdoor, .. })
            ));
        }
    }

    #[test]
    fn no_separator_among_candidates() {
        // X <-> Y stays open whatever is conditioned on
        let g = CausalGraph::builder()
            .edge("P", "X")
            .edge("X", "Y")
            .confounded("X", "Y")
            .build()
            .unwrap();
        let err = search(&g, AdjustmentStyle::All).unwrap_err();
        assert!(matches!(err, CausalError::NoAdjustmentSet { style: AdjustmentStyle::All, .. }));
    }

    #[test]
    fn size_bound_limits_the_search() {
        let config = AdjustmentConfig {
            max_candidate_size: Some(1),
            ..AdjustmentConfig::default()
        };
        let err = get_backdoor_set(
            &pearl_graph(),
            &var_set(["X"]),
            &var_set(["Y"]),
            AdjustmentStyle::Minimal,
            config,
        )
        .unwrap_err();
        assert!(matches!(err, CausalError::NoAdjustmentSet { .. }));
    }

    #[test]
    fn minimal_search_is_not_limited_by_pool_size() {
        let mut builder = CausalGraph::builder().edge("P", "X").edge("P", "Y").edge("X", "Y");
        for i in 0..21 {
            builder = builder.edge(format!("Z{}", i), "Y");
        }
        let g = builder.build().unwrap();

        let minimal = search(&g, AdjustmentStyle::Minimal).unwrap();
        assert_eq!(display_vars(minimal.adjustment()), "P");

        assert!(matches!(
            search(&g, AdjustmentStyle::All),
            Err(CausalError::InvalidArgument(_))
        ));
    }
}
