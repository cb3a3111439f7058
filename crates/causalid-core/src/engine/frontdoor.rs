//! Front-door adjustment search.
//!
//! A set `Z` satisfies the front-door criterion for `t -> o` when
//!
//! 1. every directed path from `t` to `o` passes through `Z`,
//! 2. no open back-door path leads from `t` into a member of `Z`,
//! 3. `{t}` blocks every back-door path from `Z` to `o`.

use causalid_prob::{ProbExpr, VarSet, Variable};

use crate::engine::adjustment::{AdjustmentConfig, AdjustmentResult, AdjustmentSets, AdjustmentStyle};
use crate::engine::errors::{CausalError, Criterion};
use crate::engine::graph::CausalGraph;
use crate::engine::latent_dag::LatentDag;
use crate::engine::validity::{backdoor_paths, is_connected_backdoor_path, is_valid_backdoor_set};

/// Whether `set` satisfies the front-door criterion for `treatment` on
/// `outcome`. The empty set never does.
pub fn is_frontdoor_set(
    graph: &CausalGraph,
    set: &VarSet,
    treatment: &Variable,
    outcome: &Variable,
) -> Result<bool, CausalError> {
    if set.contains(treatment) || set.contains(outcome) {
        return Err(CausalError::InvalidArgument(format!(
            "front-door set must not contain the treatment '{}' or outcome '{}'",
            treatment, outcome
        )));
    }
    frontdoor_holds(graph, &graph.latent_dag(), set, treatment, outcome)
}

fn frontdoor_holds(
    graph: &CausalGraph,
    dag: &LatentDag,
    set: &VarSet,
    treatment: &Variable,
    outcome: &Variable,
) -> Result<bool, CausalError> {
    if set.is_empty() {
        return Ok(false);
    }

    let intercepted = graph
        .all_directed_paths(treatment, outcome)
        .iter()
        .all(|path| path.iter().any(|n| set.contains(n)));
    if !intercepted {
        return Ok(false);
    }

    for mediator in set {
        for path in backdoor_paths(dag, treatment, mediator) {
            if is_connected_backdoor_path(dag, &path)? {
                return Ok(false);
            }
        }
    }

    let t: VarSet = [treatment.clone()].into_iter().collect();
    let o: VarSet = [outcome.clone()].into_iter().collect();
    is_valid_backdoor_set(graph, &t, set, &o)
}

/// Finds front-door adjustment set(s) for a single treatment and outcome.
///
/// Candidates are the nodes lying on some directed path from treatment to
/// outcome. `Simple` and `Minimal` both return the first valid candidate in
/// power-set order.
pub fn get_frontdoor_set(
    graph: &CausalGraph,
    treatment: &VarSet,
    outcome: &VarSet,
    style: AdjustmentStyle,
    config: AdjustmentConfig,
) -> Result<AdjustmentResult, CausalError> {
    let config = config.validate()?;
    let (t, o) = match (single(treatment), single(outcome)) {
        (Some(t), Some(o)) => (t, o),
        _ => {
            return Err(CausalError::InvalidArgument(
                "front-door adjustment needs exactly one treatment and one outcome".into(),
            ))
        }
    };

    let mut on_paths = VarSet::new();
    for path in graph.all_directed_paths(t, o) {
        on_paths.extend(path);
    }
    on_paths.remove(t);
    on_paths.remove(o);
    let pool: Vec<Variable> = on_paths.into_iter().collect();

    let dag = graph.latent_dag();
    let mut valid = Vec::new();
    if style == AdjustmentStyle::All {
        for candidate in config.exhaustive(&pool)? {
            if frontdoor_holds(graph, &dag, &candidate, t, o)? {
                valid.push(candidate);
            }
        }
    } else {
        for candidate in config.candidates(&pool) {
            if frontdoor_holds(graph, &dag, &candidate, t, o)? {
                valid.push(candidate);
                break;
            }
        }
    }

    let Some(adjustment) = valid.first().cloned() else {
        return Err(CausalError::no_adjustment_set(
            Criterion::Frontdoor,
            style,
            treatment,
            outcome,
        ));
    };
    let sets = match style {
        AdjustmentStyle::All => {
            AdjustmentSets::All(valid.into_iter().map(|s| s.into_iter().collect()).collect())
        }
        _ => AdjustmentSets::Single(adjustment.iter().cloned().collect()),
    };
    let prob = frontdoor_prob(t, o, &adjustment);

    #[cfg(feature = "tracing")]
    tracing::debug!("front-door estimand ({}): {}", style, prob);

    Ok(AdjustmentResult { sets, prob })
}

/// `sum_{Z} P(Z | t) sum_{t} P(o | t, Z) P(t)`.
pub fn frontdoor_prob(treatment: &Variable, outcome: &Variable, mediators: &VarSet) -> ProbExpr {
    let t: VarSet = [treatment.clone()].into_iter().collect();
    let o: VarSet = [outcome.clone()].into_iter().collect();
    let inner = ProbExpr::marginal(
        t.clone(),
        ProbExpr::product([
            ProbExpr::conditional(o, t.union(mediators).cloned().collect()),
            ProbExpr::joint(t.clone()),
        ]),
    );
    ProbExpr::marginal(
        mediators.clone(),
        ProbExpr::product([ProbExpr::conditional(mediators.clone(), t), inner]),
    )
}

fn single(set: &VarSet) -> Option<&Variable> {
    match set.len() {
        1 => set.first(),
        _ => None,
    }
}
