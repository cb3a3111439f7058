//! # Causal Graph
//!
//! A semi-Markovian causal graph: a DAG over observed variables plus latent
//! confounders, each latent pointing at the observed variables it affects.
//! A bidirected arc `A <-> B` is a latent with children `{A, B}`.
//!
//! ## Views
//!
//! Identification recurses over many variants of one graph (sub-graphs, edge
//! cuts, node removals). Every such operation takes `&self` and returns a new
//! [`CausalGraph`]; the receiver is never touched. The graph data lives behind
//! an `Arc`, so a view that changes nothing costs a reference count increment,
//! and the mutation entry points used by the hidden-confounder routine copy on
//! write when the data is shared.
//!
//! ## Invariants
//!
//! - every observed node has a `parents` and a `children` entry
//! - `parents` and `children` mirror each other
//! - latent names are disjoint from observed names, and every latent has at
//!   least one child
//! - the observed part is acyclic (checked on construction and on `add_edges`)

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use causalid_frontend::{confounder_name, GraphAst, StatementKind};
use causalid_prob::{display_vars, ProbExpr, VarSet, Variable};
use rustc_hash::FxHashMap;

use crate::engine::errors::CausalError;
use crate::engine::latent_dag::LatentDag;

/// Graph data shared between views.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct CausalGraphInner {
    /// Observed nodes
    pub(crate) nodes: VarSet,
    /// Direct observed parents of each node, in insertion order
    pub(crate) parents: BTreeMap<Variable, Vec<Variable>>,
    /// Direct observed children of each node
    pub(crate) children: BTreeMap<Variable, VarSet>,
    /// Latent confounders and the observed nodes they affect
    pub(crate) latents: BTreeMap<Variable, VarSet>,
}

/// A causal graph with explicit latent-confounder semantics.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CausalGraph {
    inner: Arc<CausalGraphInner>,
}

/// Incremental constructor for [`CausalGraph`].
///
/// Nodes mentioned by edges or latents are added implicitly; `node` is only
/// needed for isolated nodes.
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    nodes: Vec<Variable>,
    edges: Vec<(Variable, Variable)>,
    latents: BTreeMap<Variable, VarSet>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(mut self, name: impl Into<Variable>) -> Self {
        self.nodes.push(name.into());
        self
    }

    /// Directed edge `from -> to`.
    pub fn edge(mut self, from: impl Into<Variable>, to: impl Into<Variable>) -> Self {
        self.edges.push((from.into(), to.into()));
        self
    }

    /// Bidirected arc `a <-> b`, represented by an anonymous latent parent.
    pub fn confounded(self, a: impl Into<Variable>, b: impl Into<Variable>) -> Self {
        let (a, b) = (a.into(), b.into());
        let name = confounder_name(a.name(), b.name());
        self.latent(name, [a, b])
    }

    /// Latent confounder `name` with the given observed children.
    pub fn latent<I, S>(mut self, name: impl Into<Variable>, children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Variable>,
    {
        self.latents
            .entry(name.into())
            .or_default()
            .extend(children.into_iter().map(Into::into));
        self
    }

    pub fn build(self) -> Result<CausalGraph, CausalError> {
        let mut inner = CausalGraphInner::default();
        let mentioned = self
            .nodes
            .iter()
            .chain(self.edges.iter().flat_map(|(a, b)| [a, b]))
            .chain(self.latents.values().flatten());
        for node in mentioned {
            inner.insert_node(node.clone());
        }

        for (from, to) in &self.edges {
            if from == to {
                return Err(CausalError::Validation(format!("self loop on '{}'", from)));
            }
            inner.insert_edge(from, to);
        }

        for (latent, children) in self.latents {
            if inner.nodes.contains(&latent) {
                return Err(CausalError::Validation(format!(
                    "'{}' is both latent and observed",
                    latent
                )));
            }
            if children.is_empty() {
                return Err(CausalError::Validation(format!(
                    "latent '{}' has no children",
                    latent
                )));
            }
            inner.latents.insert(latent, children);
        }

        inner.check_acyclic()?;
        Ok(CausalGraph {
            inner: Arc::new(inner),
        })
    }
}

impl CausalGraphInner {
    fn insert_node(&mut self, node: Variable) {
        if self.nodes.insert(node.clone()) {
            self.parents.insert(node.clone(), Vec::new());
            self.children.insert(node, VarSet::new());
        }
    }

    fn insert_edge(&mut self, from: &Variable, to: &Variable) {
        self.insert_node(from.clone());
        self.insert_node(to.clone());
        if let Some(parents) = self.parents.get_mut(to) {
            if !parents.contains(from) {
                parents.push(from.clone());
            }
        }
        if let Some(children) = self.children.get_mut(from) {
            children.insert(to.clone());
        }
    }

    fn delete_edge(&mut self, from: &Variable, to: &Variable) -> bool {
        let removed = self
            .children
            .get_mut(from)
            .map(|children| children.remove(to))
            .unwrap_or(false);
        if let Some(parents) = self.parents.get_mut(to) {
            parents.retain(|p| p != from);
        }
        removed
    }

    /// Kahn's algorithm; ties are broken by name so the order is stable.
    fn topological_order(&self) -> Vec<Variable> {
        let mut in_degree: FxHashMap<&Variable, usize> = self
            .parents
            .iter()
            .map(|(node, parents)| (node, parents.len()))
            .collect();
        let mut ready: BTreeSet<&Variable> = in_degree
            .iter()
            .filter(|(_, d)| **d == 0)
            .map(|(n, _)| *n)
            .collect();

        let mut order = Vec::with_capacity(self.nodes.len());
        while let Some(node) = ready.pop_first() {
            order.push(node.clone());
            for child in self.children.get(node).into_iter().flatten() {
                if let Some(d) = in_degree.get_mut(child) {
                    *d -= 1;
                    if *d == 0 {
                        ready.insert(child);
                    }
                }
            }
        }
        order
    }

    fn check_acyclic(&self) -> Result<(), CausalError> {
        let order = self.topological_order();
        if order.len() == self.nodes.len() {
            return Ok(());
        }
        let sorted: VarSet = order.into_iter().collect();
        let on_cycle: VarSet = self.nodes.difference(&sorted).cloned().collect();
        Err(CausalError::Validation(format!(
            "directed cycle among observed nodes {{{}}}",
            display_vars(&on_cycle)
        )))
    }

    fn restricted_to(&self, keep: &VarSet) -> Self {
        let nodes: VarSet = self.nodes.intersection(keep).cloned().collect();
        let parents = nodes
            .iter()
            .map(|n| {
                let ps = self.parents[n]
                    .iter()
                    .filter(|p| nodes.contains(*p))
                    .cloned()
                    .collect();
                (n.clone(), ps)
            })
            .collect();
        let children = nodes
            .iter()
            .map(|n| {
                let cs = self.children[n].intersection(&nodes).cloned().collect();
                (n.clone(), cs)
            })
            .collect();
        let latents = self
            .latents
            .iter()
            .filter_map(|(u, cs)| {
                let cs: VarSet = cs.intersection(&nodes).cloned().collect();
                (!cs.is_empty()).then(|| (u.clone(), cs))
            })
            .collect();
        Self {
            nodes,
            parents,
            children,
            latents,
        }
    }
}

impl CausalGraph {
    pub fn builder() -> GraphBuilder {
        GraphBuilder::new()
    }

    /// Builds a graph from a validated description AST.
    pub fn from_ast(ast: &GraphAst) -> Result<Self, CausalError> {
        let mut builder = GraphBuilder::new();
        for stmt in &ast.statements {
            builder = match &stmt.kind {
                StatementKind::Nodes(names) => names.iter().fold(builder, |b, n| b.node(n.as_str())),
                StatementKind::Directed { from, to } => from.iter().fold(builder, |b, f| {
                    to.iter().fold(b, |b, t| b.edge(f.as_str(), t.as_str()))
                }),
                StatementKind::Confounded { left, right } => {
                    builder.confounded(left.as_str(), right.as_str())
                }
                StatementKind::Latent { name, children } => {
                    builder.latent(name.as_str(), children.iter().map(String::as_str))
                }
            };
        }
        builder.build()
    }

    fn from_inner(inner: CausalGraphInner) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Exclusive access to the graph data, copying it first if shared.
    fn inner_mut(&mut self) -> &mut CausalGraphInner {
        Arc::make_mut(&mut self.inner)
    }

    /// Observed nodes.
    pub fn nodes(&self) -> &VarSet {
        &self.inner.nodes
    }

    pub fn contains(&self, node: &str) -> bool {
        self.inner.nodes.contains(node)
    }

    /// Direct observed parents of every node.
    pub fn causation(&self) -> &BTreeMap<Variable, Vec<Variable>> {
        &self.inner.parents
    }

    /// Direct observed parents of `node` (empty for unknown nodes).
    pub fn parents(&self, node: &str) -> &[Variable] {
        self.inner
            .parents
            .get(node)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Direct observed children of `node`.
    pub fn children(&self, node: &str) -> impl Iterator<Item = &Variable> {
        self.inner.children.get(node).into_iter().flatten()
    }

    /// Latent confounders and their observed children.
    pub fn latents(&self) -> &BTreeMap<Variable, VarSet> {
        &self.inner.latents
    }

    pub fn edge_count(&self) -> usize {
        self.inner.children.values().map(BTreeSet::len).sum()
    }

    pub fn topological_order(&self) -> Vec<Variable> {
        self.inner.topological_order()
    }

    /// `set` together with every observed ancestor of a member of `set`.
    pub fn ancestors(&self, set: &VarSet) -> VarSet {
        self.closure(set, |n| self.parents(n.name()).iter())
    }

    /// `set` together with every observed descendant of a member of `set`.
    pub fn descendants(&self, set: &VarSet) -> VarSet {
        self.closure(set, |n| self.children(n.name()))
    }

    fn closure<'a, F, I>(&'a self, set: &VarSet, next: F) -> VarSet
    where
        F: Fn(&Variable) -> I,
        I: Iterator<Item = &'a Variable>,
    {
        let mut seen: VarSet = set
            .iter()
            .filter(|n| self.inner.nodes.contains(*n))
            .cloned()
            .collect();
        let mut stack: Vec<Variable> = seen.iter().cloned().collect();
        while let Some(node) = stack.pop() {
            for other in next(&node) {
                if seen.insert(other.clone()) {
                    stack.push(other.clone());
                }
            }
        }
        seen
    }

    /// The graph restricted to the observed nodes in `keep`.
    ///
    /// Latents keep only the children that survive; latents left without
    /// children disappear.
    pub fn build_sub_graph(&self, keep: &VarSet) -> CausalGraph {
        if self.inner.nodes.is_subset(keep) {
            return self.clone();
        }
        Self::from_inner(self.inner.restricted_to(keep))
    }

    /// The graph without the observed nodes in `set`.
    pub fn remove_nodes(&self, set: &VarSet) -> CausalGraph {
        let keep: VarSet = self.inner.nodes.difference(set).cloned().collect();
        self.build_sub_graph(&keep)
    }

    /// The graph with every edge into `set` cut, latent arcs included.
    pub fn remove_incoming_edges(&self, set: &VarSet) -> CausalGraph {
        let mut inner = (*self.inner).clone();
        for node in set {
            let Some(parents) = inner.parents.get_mut(node).map(std::mem::take) else {
                continue;
            };
            for parent in parents {
                if let Some(children) = inner.children.get_mut(&parent) {
                    children.remove(node);
                }
            }
        }
        for children in inner.latents.values_mut() {
            children.retain(|c| !set.contains(c));
        }
        inner.latents.retain(|_, children| !children.is_empty());
        Self::from_inner(inner)
    }

    /// The graph with every observed edge out of `set` cut.
    pub fn remove_outgoing_edges(&self, set: &VarSet) -> CausalGraph {
        let mut inner = (*self.inner).clone();
        for node in set {
            let Some(children) = inner.children.get_mut(node).map(std::mem::take) else {
                continue;
            };
            for child in children {
                if let Some(parents) = inner.parents.get_mut(&child) {
                    parents.retain(|p| p != node);
                }
            }
        }
        Self::from_inner(inner)
    }

    /// Maximal sets of observed nodes connected through latent confounders.
    ///
    /// Every node belongs to exactly one component; components are ordered by
    /// their smallest member.
    pub fn c_components(&self) -> Vec<VarSet> {
        let index: FxHashMap<&Variable, usize> = self
            .inner
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n, i))
            .collect();
        let mut parent: Vec<usize> = (0..index.len()).collect();

        fn find(parent: &mut [usize], mut i: usize) -> usize {
            while parent[i] != i {
                parent[i] = parent[parent[i]];
                i = parent[i];
            }
            i
        }

        for children in self.inner.latents.values() {
            let mut members = children.iter().filter_map(|c| index.get(c).copied());
            if let Some(first) = members.next() {
                for other in members {
                    let (a, b) = (find(&mut parent, first), find(&mut parent, other));
                    if a != b {
                        parent[b] = a;
                    }
                }
            }
        }

        let mut groups: BTreeMap<usize, VarSet> = BTreeMap::new();
        for (node, &i) in &index {
            let root = find(&mut parent, i);
            groups.entry(root).or_default().insert((*node).clone());
        }
        let mut components: Vec<VarSet> = groups.into_values().collect();
        components.sort_by(|a, b| a.first().cmp(&b.first()));
        components
    }

    /// Explicit-latent view: latents become ordinary root nodes.
    pub fn latent_dag(&self) -> LatentDag {
        LatentDag::new(&self.inner)
    }

    /// Every simple directed path `from -> .. -> to` over observed edges.
    pub fn all_directed_paths(&self, from: &Variable, to: &Variable) -> Vec<Vec<Variable>> {
        let mut paths = Vec::new();
        if !self.contains(from.name()) || !self.contains(to.name()) || from == to {
            return paths;
        }
        let mut path = vec![from.clone()];
        self.extend_directed_paths(to, &mut path, &mut paths);
        paths
    }

    fn extend_directed_paths(
        &self,
        target: &Variable,
        path: &mut Vec<Variable>,
        out: &mut Vec<Vec<Variable>>,
    ) {
        let Some(last) = path.last().cloned() else {
            return;
        };
        for child in self.children(last.name()) {
            if child == target {
                let mut found = path.clone();
                found.push(child.clone());
                out.push(found);
            } else if !path.contains(child) {
                path.push(child.clone());
                self.extend_directed_paths(target, path, out);
                path.pop();
            }
        }
    }

    /// The observational joint `P(V)` over all observed nodes.
    pub fn joint(&self) -> ProbExpr {
        ProbExpr::joint(self.inner.nodes.clone())
    }

    // ------------------------------------------------------------------
    // Mutation (used by the hidden-confounder routine only)
    // ------------------------------------------------------------------

    pub fn add_nodes<I, S>(&mut self, nodes: I) -> Result<(), CausalError>
    where
        I: IntoIterator<Item = S>,
        S: Into<Variable>,
    {
        let nodes: Vec<Variable> = nodes.into_iter().map(Into::into).collect();
        if let Some(latent) = nodes.iter().find(|n| self.inner.latents.contains_key(*n)) {
            return Err(CausalError::InvalidArgument(format!(
                "'{}' is already a latent variable",
                latent
            )));
        }
        let inner = self.inner_mut();
        for node in nodes {
            inner.insert_node(node);
        }
        Ok(())
    }

    /// Adds directed edges between observed nodes.
    ///
    /// Unknown endpoints are rejected and the graph is left unchanged when
    /// an edge would close a cycle.
    pub fn add_edges<I, A, B>(&mut self, edges: I) -> Result<(), CausalError>
    where
        I: IntoIterator<Item = (A, B)>,
        A: Into<Variable>,
        B: Into<Variable>,
    {
        let mut candidate = (*self.inner).clone();
        for (from, to) in edges {
            let (from, to) = (from.into(), to.into());
            for end in [&from, &to] {
                if !candidate.nodes.contains(end) {
                    return Err(CausalError::InvalidArgument(format!(
                        "unknown node '{}'",
                        end
                    )));
                }
            }
            if from == to {
                return Err(CausalError::InvalidArgument(format!(
                    "self loop on '{}'",
                    from
                )));
            }
            candidate.insert_edge(&from, &to);
        }
        candidate.check_acyclic()?;
        self.inner = Arc::new(candidate);
        Ok(())
    }

    /// Removes directed edges; returns how many existed.
    pub fn remove_edges<'a, I>(&mut self, edges: I) -> usize
    where
        I: IntoIterator<Item = (&'a Variable, &'a Variable)>,
    {
        let edges: Vec<_> = edges
            .into_iter()
            .filter(|(from, to)| self.inner.children.get(*from).map_or(false, |c| c.contains(*to)))
            .collect();
        if edges.is_empty() {
            return 0;
        }
        let inner = self.inner_mut();
        edges
            .into_iter()
            .filter(|(from, to)| inner.delete_edge(from, to))
            .count()
    }

    /// Removes a latent confounder; returns its former children.
    pub fn remove_latent(&mut self, latent: &str) -> Option<VarSet> {
        if !self.inner.latents.contains_key(latent) {
            return None;
        }
        self.inner_mut().latents.remove(latent)
    }
}
