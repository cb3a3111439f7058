//! # General Identification
//!
//! The ID algorithm of Shpitser & Pearl (2006) for semi-Markovian graphs.
//! Given outcomes `y`, treatments `x`, the current distribution `prob` and
//! graph, it either expresses `P(y | do(x))` in terms of `prob` or proves
//! that no such expression exists.
//!
//! Branches are tried in order; the first that applies wins:
//!
//! 1. `x` is empty: restrict `prob` to `y`.
//! 2. Some node is not an ancestor of `y`: project onto the ancestors.
//! 3. Some non-treatment node stops being an ancestor of `y` once edges into
//!    `x` are cut: intervene on it as well.
//! 4. `G \ x` splits into several c-components: identify each one and
//!    multiply.
//! 5. `G` is a single c-component: not identifiable.
//! 6. The component of `G \ x` is a c-component of `G`: product of
//!    topological conditionals.
//! 7. Otherwise recurse into the enclosing c-component of `G`.
//!
//! The recursion never mutates its arguments. Every branch that narrows the
//! graph asks for a view, so sibling calls of branch 4 all see the same
//! graph and distribution.

use causalid_prob::{ProbExpr, VarSet, Variable};
use rustc_hash::FxHashMap;

use crate::engine::errors::CausalError;
use crate::engine::graph::CausalGraph;

/// Identifies `P(y | do(x))`, starting from the distribution `prob` over
/// `graph`.
///
/// Fails with [`CausalError::Identification`] naming `x` and `y` when the
/// effect is not identifiable.
pub fn id(y: &VarSet, x: &VarSet, prob: &ProbExpr, graph: &CausalGraph) -> Result<ProbExpr, CausalError> {
    identify_rec(y, x, prob, graph, 0).map_err(|err| match err {
        CausalError::Identification { .. } => CausalError::Identification {
            treatment: x.clone(),
            outcome: y.clone(),
        },
        other => other,
    })
}

fn identify_rec(
    y: &VarSet,
    x: &VarSet,
    prob: &ProbExpr,
    graph: &CausalGraph,
    depth: usize,
) -> Result<ProbExpr, CausalError> {
    let v = graph.nodes();

    // 1
    if x.is_empty() {
        return Ok(prob.restrict_to(y, v));
    }

    // 2
    let ancestors = graph.ancestors(y);
    if ancestors.len() < v.len() {
        trace_branch(depth, 2, y, x);
        let sub = graph.build_sub_graph(&ancestors);
        let x: VarSet = x.intersection(&ancestors).cloned().collect();
        return identify_rec(y, &x, &prob.restrict_to(&ancestors, v), &sub, depth + 1);
    }

    // 3
    let cut_ancestors = graph.remove_incoming_edges(x).ancestors(y);
    let w: VarSet = v
        .iter()
        .filter(|n| !x.contains(*n) && !cut_ancestors.contains(*n))
        .cloned()
        .collect();
    if !w.is_empty() {
        trace_branch(depth, 3, y, x);
        let x: VarSet = x.union(&w).cloned().collect();
        return identify_rec(y, &x, prob, graph, depth + 1);
    }

    // 4
    let mut components = graph.remove_nodes(x).c_components();
    if components.len() > 1 {
        trace_branch(depth, 4, y, x);
        let factors = components
            .iter()
            .map(|s| {
                let rest: VarSet = v.difference(s).cloned().collect();
                identify_rec(s, &rest, prob, graph, depth + 1)
            })
            .collect::<Result<Vec<_>, _>>()?;
        let summed: VarSet = v
            .iter()
            .filter(|n| !y.contains(*n) && !x.contains(*n))
            .cloned()
            .collect();
        return Ok(ProbExpr::marginal(summed, ProbExpr::product(factors)));
    }
    let s = components.pop().ok_or_else(|| {
        CausalError::Internal("no nodes left once treatments are removed".into())
    })?;

    // 5
    let full_components = graph.c_components();
    if full_components.len() == 1 {
        trace_branch(depth, 5, y, x);
        return Err(CausalError::Identification {
            treatment: x.clone(),
            outcome: y.clone(),
        });
    }

    let order = graph.topological_order();
    let position: FxHashMap<&Variable, usize> = order.iter().enumerate().map(|(i, n)| (n, i)).collect();
    let factors_for = |members: &VarSet| -> Vec<ProbExpr> {
        members
            .iter()
            .map(|m| {
                let earlier = position.get(m).map_or(&order[..0], |&i| &order[..i]);
                ProbExpr::conditional(
                    [m.clone()].into_iter().collect(),
                    earlier.iter().cloned().collect(),
                )
            })
            .collect()
    };

    // 6
    if full_components.contains(&s) {
        trace_branch(depth, 6, y, x);
        let summed: VarSet = s.difference(y).cloned().collect();
        return Ok(ProbExpr::marginal(summed, ProbExpr::product(factors_for(&s))));
    }

    // 7
    let enclosing = full_components
        .iter()
        .find(|c| s.is_subset(c))
        .ok_or_else(|| CausalError::Internal("c-component of G \\ X outside every c-component of G".into()))?;
    trace_branch(depth, 7, y, x);
    let sub_prob = ProbExpr::product(factors_for(enclosing));
    let sub_graph = graph.build_sub_graph(enclosing);
    let x: VarSet = x.intersection(enclosing).cloned().collect();
    identify_rec(y, &x, &sub_prob, &sub_graph, depth + 1)
}

#[cfg(feature = "tracing")]
fn trace_branch(depth: usize, branch: u8, y: &VarSet, x: &VarSet) {
    tracing::debug!(
        depth,
        branch,
        "id: P({} | do({}))",
        causalid_prob::display_vars(y),
        causalid_prob::display_vars(x)
    );
}

#[cfg(not(feature = "tracing"))]
#[inline(always)]
fn trace_branch(_depth: usize, _branch: u8, _y: &VarSet, _x: &VarSet) {}
