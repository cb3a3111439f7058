//! d-separation based predicates behind the adjustment searches.
//!
//! Path arguments are sequences of node names in the explicit-latent view
//! ([`LatentDag`]), so a path may pass through a latent confounder.

use causalid_prob::{VarSet, Variable};

use crate::engine::errors::CausalError;
use crate::engine::graph::CausalGraph;
use crate::engine::latent_dag::LatentDag;

/// Every back-door path from `treatment` to `outcome`.
///
/// A back-door path is a simple path of the undirected explicit-latent view
/// with at least one interior node whose first edge points into `treatment`.
pub fn backdoor_paths(dag: &LatentDag, treatment: &Variable, outcome: &Variable) -> Vec<Vec<Variable>> {
    let parents = dag.parents(treatment.name());
    dag.all_simple_paths(treatment, outcome)
        .into_iter()
        .filter(|p| p.len() > 2 && parents.contains(&p[1]))
        .collect()
}

/// Whether `path` has a collider.
///
/// A collider exists when an edge leaving the start (`p[i-1] -> p[i]`) is
/// later followed by an edge pointing back (`p[i-1] <- p[i]`). When
/// `backdoor` is false the path is read as if its first step left the start,
/// so any edge pointing back counts. A path whose second node is not a parent
/// of its first is never read as a back-door path.
///
/// A sequence that is not a simple path of the view (unknown node,
/// non-adjacent neighbours, repeated node) is an `InvalidPath`. Paths of two
/// nodes have no interior node and never have a collider.
pub fn has_collider(dag: &LatentDag, path: &[Variable], backdoor: bool) -> Result<bool, CausalError> {
    if path.len() < 2 || !dag.is_path(path) {
        return Err(CausalError::InvalidPath(path.to_vec()));
    }
    if path.len() == 2 {
        return Ok(false);
    }
    let backdoor = backdoor && dag.has_edge(path[1].name(), path[0].name());
    if backdoor && path.len() == 3 {
        return Ok(false);
    }

    let mut leaving = !backdoor;
    for step in path.windows(2) {
        if dag.has_edge(step[0].name(), step[1].name()) {
            leaving = true;
        } else if leaving {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Whether `path` is an open back-door path: it has no collider and is one of
/// the back-door paths between its endpoints.
pub fn is_connected_backdoor_path(dag: &LatentDag, path: &[Variable]) -> Result<bool, CausalError> {
    let (Some(first), Some(second), Some(last)) = (path.first(), path.get(1), path.last()) else {
        return Err(CausalError::InvalidPath(path.to_vec()));
    };
    if !dag.has_edge(second.name(), first.name()) {
        return Err(CausalError::NotABackdoorPath(path.to_vec()));
    }
    if has_collider(dag, path, true)? {
        return Ok(false);
    }
    Ok(backdoor_paths(dag, first, last).iter().any(|p| p == path))
}

/// Whether `set` blocks every back-door path from `treatment` to `outcome`.
///
/// Tested as d-separation in the explicit-latent view of the graph with the
/// treatment's outgoing edges removed.
pub fn is_valid_backdoor_set(
    graph: &CausalGraph,
    set: &VarSet,
    treatment: &VarSet,
    outcome: &VarSet,
) -> Result<bool, CausalError> {
    graph
        .remove_outgoing_edges(treatment)
        .latent_dag()
        .d_separated(treatment, outcome, set)
}
