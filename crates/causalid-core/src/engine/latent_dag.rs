//! Explicit-latent view of a causal graph.
//!
//! Latent confounders become ordinary root nodes with an edge to each of
//! their observed children. Path and d-separation queries run on this view so
//! that confounding shows up as an ordinary `A <- U -> B` fork.

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use causalid_prob::{display_vars, VarSet, Variable};

use crate::engine::errors::CausalError;
use crate::engine::graph::CausalGraphInner;

static EMPTY: VarSet = VarSet::new();

/// A DAG over observed and latent nodes.
#[derive(Debug, Clone, Default)]
pub struct LatentDag {
    parents: FxHashMap<Variable, VarSet>,
    children: FxHashMap<Variable, VarSet>,
    latents: VarSet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Direction {
    /// Reached from a child, travelling against an edge.
    Up,
    /// Reached from a parent, travelling along an edge.
    Down,
}

impl LatentDag {
    pub(crate) fn new(graph: &CausalGraphInner) -> Self {
        let mut dag = LatentDag::default();
        for node in &graph.nodes {
            dag.parents.insert(node.clone(), graph.parents[node].iter().cloned().collect());
            dag.children.insert(node.clone(), graph.children[node].clone());
        }
        for (latent, children) in &graph.latents {
            dag.latents.insert(latent.clone());
            dag.parents.insert(latent.clone(), VarSet::new());
            dag.children.insert(latent.clone(), children.clone());
            for child in children {
                dag.parents
                    .entry(child.clone())
                    .or_default()
                    .insert(latent.clone());
            }
        }
        dag
    }

    pub fn contains(&self, node: &str) -> bool {
        self.parents.contains_key(node)
    }

    pub fn is_latent(&self, node: &str) -> bool {
        self.latents.contains(node)
    }

    pub fn latents(&self) -> &VarSet {
        &self.latents
    }

    pub fn node_count(&self) -> usize {
        self.parents.len()
    }

    /// Direct parents of `node`, latents included.
    pub fn parents(&self, node: &str) -> &VarSet {
        self.parents.get(node).unwrap_or(&EMPTY)
    }

    /// Direct children of `node`.
    pub fn children(&self, node: &str) -> &VarSet {
        self.children.get(node).unwrap_or(&EMPTY)
    }

    /// True when `from -> to` is an edge.
    pub fn has_edge(&self, from: &str, to: &str) -> bool {
        self.children(from).contains(to)
    }

    /// Neighbours of `node` ignoring edge direction, in name order.
    fn neighbors(&self, node: &str) -> VarSet {
        self.parents(node)
            .union(self.children(node))
            .cloned()
            .collect()
    }

    /// Strict ancestors of `node`.
    pub fn ancestors(&self, node: &str) -> VarSet {
        self.reach(node, |n| self.parents(n))
    }

    /// Strict descendants of `node`.
    pub fn descendants(&self, node: &str) -> VarSet {
        self.reach(node, |n| self.children(n))
    }

    fn reach<'a, F>(&'a self, start: &str, next: F) -> VarSet
    where
        F: Fn(&str) -> &'a VarSet,
    {
        let mut seen = VarSet::new();
        let mut stack: SmallVec<[&Variable; 16]> = next(start).iter().collect();
        while let Some(node) = stack.pop() {
            if seen.insert(node.clone()) {
                stack.extend(next(node.name()).iter());
            }
        }
        seen
    }

    /// True when `path` is a simple path of the undirected view: every entry
    /// is a node, no node repeats, and consecutive entries are adjacent (in
    /// either direction).
    pub fn is_path(&self, path: &[Variable]) -> bool {
        if path.is_empty() || !path.iter().all(|n| self.contains(n.name())) {
            return false;
        }
        let mut seen = FxHashSet::default();
        if !path.iter().all(|n| seen.insert(n)) {
            return false;
        }
        path.windows(2)
            .all(|w| self.has_edge(w[0].name(), w[1].name()) || self.has_edge(w[1].name(), w[0].name()))
    }

    /// Every simple path between `from` and `to` in the undirected view.
    ///
    /// Paths are produced depth first, visiting neighbours in name order.
    pub fn all_simple_paths(&self, from: &Variable, to: &Variable) -> Vec<Vec<Variable>> {
        let mut paths = Vec::new();
        if from == to || !self.contains(from.name()) || !self.contains(to.name()) {
            return paths;
        }
        let mut path = vec![from.clone()];
        let mut on_path: FxHashSet<Variable> = FxHashSet::default();
        on_path.insert(from.clone());
        self.extend_paths(to, &mut path, &mut on_path, &mut paths);
        paths
    }

    fn extend_paths(
        &self,
        target: &Variable,
        path: &mut Vec<Variable>,
        on_path: &mut FxHashSet<Variable>,
        out: &mut Vec<Vec<Variable>>,
    ) {
        let Some(last) = path.last() else {
            return;
        };
        for next in self.neighbors(last.name()) {
            if &next == target {
                let mut found = path.clone();
                found.push(next);
                out.push(found);
            } else if on_path.insert(next.clone()) {
                path.push(next.clone());
                self.extend_paths(target, path, on_path, out);
                path.pop();
                on_path.remove(&next);
            }
        }
    }

    /// Whether `z` d-separates `x` from `y`.
    ///
    /// Uses the reachability formulation: walk active trails out of `x`,
    /// passing colliders only when they are (ancestors of) members of `z`.
    /// Empty `x` or `y` are trivially separated. The three sets must be
    /// disjoint and name nodes of the view.
    pub fn d_separated(&self, x: &VarSet, y: &VarSet, z: &VarSet) -> Result<bool, CausalError> {
        for node in x.iter().chain(y).chain(z) {
            if !self.contains(node.name()) {
                return Err(CausalError::InvalidArgument(format!(
                    "'{}' is not a node of the graph",
                    node
                )));
            }
        }
        let overlap: VarSet = x
            .intersection(y)
            .chain(x.intersection(z))
            .chain(y.intersection(z))
            .cloned()
            .collect();
        if !overlap.is_empty() {
            return Err(CausalError::InvalidArgument(format!(
                "d-separation sets overlap on {{{}}}",
                display_vars(&overlap)
            )));
        }
        if x.is_empty() || y.is_empty() {
            return Ok(true);
        }

        // z together with its ancestors: colliders in here are open
        let mut opened: FxHashSet<&Variable> = FxHashSet::default();
        let mut stack: Vec<&Variable> = z.iter().collect();
        while let Some(node) = stack.pop() {
            if opened.insert(node) {
                stack.extend(self.parents(node.name()).iter());
            }
        }

        let mut visited: FxHashSet<(&Variable, Direction)> = FxHashSet::default();
        let mut queue: Vec<(&Variable, Direction)> = x.iter().map(|n| (n, Direction::Up)).collect();
        while let Some((node, dir)) = queue.pop() {
            if !visited.insert((node, dir)) {
                continue;
            }
            let blocked = z.contains(node);
            if !blocked && y.contains(node) {
                return Ok(false);
            }
            match dir {
                Direction::Up if !blocked => {
                    queue.extend(self.parents(node.name()).iter().map(|p| (p, Direction::Up)));
                    queue.extend(self.children(node.name()).iter().map(|c| (c, Direction::Down)));
                }
                Direction::Up => {}
                Direction::Down => {
                    if !blocked {
                        queue.extend(self.children(node.name()).iter().map(|c| (c, Direction::Down)));
                    }
                    if opened.contains(node) {
                        queue.extend(self.parents(node.name()).iter().map(|p| (p, Direction::Up)));
                    }
                }
            }
        }
        Ok(true)
    }
}
