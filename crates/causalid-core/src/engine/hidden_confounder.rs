//! # Hidden-Confounder Proxies
//!
//! A best-effort heuristic that replaces latent confounders by observed
//! proxy columns. It has no identifiability guarantee and is kept apart from
//! the identification algorithms.
//!
//! Each pass walks the observed nodes in topological order and looks for a
//! node with exactly one latent ancestor `U` whose observed ancestors have no
//! latent ancestor at all. Such a node is regressed on its observed
//! ancestors; the residual becomes a new data column standing in for `U`.
//! The graph is then rewired: edges among `U`'s descendants are dropped, the
//! proxy becomes their common observed parent and `U` disappears.
//!
//! Passes repeat until one creates no proxy.

use causalid_prob::{VarSet, Variable};

use crate::engine::errors::CausalError;
use crate::engine::graph::CausalGraph;
use crate::estimation::data::DataTable;
use crate::estimation::regression::LinearModel;

/// Configuration for [`estimate_hidden_confounders`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProxyConfig {
    /// Proxy column name is this prefix followed by the lower-cased latent
    /// name.
    pub proxy_prefix: String,
    /// Upper bound on passes.
    pub max_passes: usize,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            proxy_prefix: "estimate_".into(),
            max_passes: 64,
        }
    }
}

impl ProxyConfig {
    pub fn validate(self) -> Result<Self, CausalError> {
        if self.proxy_prefix.is_empty() {
            return Err(CausalError::InvalidArgument(
                "hidden confounders: proxy_prefix must not be empty".into(),
            ));
        }
        if self.max_passes == 0 {
            return Err(CausalError::InvalidArgument(
                "hidden confounders: max_passes must be > 0".into(),
            ));
        }
        Ok(self)
    }
}

/// One latent replaced by a proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProxyEstimate {
    pub latent: Variable,
    pub proxy: Variable,
    /// The node whose residual became the proxy.
    pub source: Variable,
    /// Its observed ancestors, the regressors.
    pub regressors: Vec<Variable>,
    /// Observed nodes now children of the proxy.
    pub children: VarSet,
}

/// Outcome of [`estimate_hidden_confounders`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProxyReport {
    pub proxies: Vec<ProxyEstimate>,
    pub passes: usize,
    /// Latents still in the graph afterwards.
    pub remaining_latents: usize,
}

/// Replaces latent confounders by regression-residual proxies until no more
/// can be found. Mutates both `graph` and `data`.
pub fn estimate_hidden_confounders(
    graph: &mut CausalGraph,
    data: &mut DataTable,
    config: ProxyConfig,
) -> Result<ProxyReport, CausalError> {
    let config = config.validate()?;
    let mut report = ProxyReport::default();

    while report.passes < config.max_passes {
        report.passes += 1;
        let found = run_pass(graph, data, &config)?;
        if found.is_empty() {
            break;
        }
        report.proxies.extend(found);
    }

    report.remaining_latents = graph.latents().len();

    #[cfg(feature = "tracing")]
    tracing::debug!(
        proxies = report.proxies.len(),
        passes = report.passes,
        remaining = report.remaining_latents,
        "hidden confounder estimation done"
    );

    Ok(report)
}

fn run_pass(
    graph: &mut CausalGraph,
    data: &mut DataTable,
    config: &ProxyConfig,
) -> Result<Vec<ProxyEstimate>, CausalError> {
    let mut found = Vec::new();
    let mut handled = VarSet::new();

    for node in graph.topological_order() {
        let dag = graph.latent_dag();
        let ancestors = dag.ancestors(node.name());
        let mut latent_ancestors = ancestors.iter().filter(|a| dag.is_latent(a.name()));
        let (Some(latent), None) = (latent_ancestors.next(), latent_ancestors.next()) else {
            continue;
        };
        if handled.contains(latent) {
            continue;
        }
        let regressors: Vec<Variable> = ancestors
            .iter()
            .filter(|a| !dag.is_latent(a.name()))
            .cloned()
            .collect();
        let clean = regressors
            .iter()
            .all(|a| dag.ancestors(a.name()).iter().all(|b| !dag.is_latent(b.name())));
        if !clean {
            continue;
        }

        let latent = latent.clone();
        let proxy = Variable::new(format!("{}{}", config.proxy_prefix, latent.name().to_lowercase()));
        if graph.contains(proxy.name()) || data.has_column(proxy.name()) {
            return Err(CausalError::InvalidArgument(format!(
                "proxy name '{}' is already taken",
                proxy
            )));
        }

        let rows = data.all_rows();
        let target = data.vector(node.name(), &rows)?;
        let x = data.design(&regressors, &rows, true)?;
        let residual = LinearModel::fit(&x, &target)?.residuals(&x, &target);
        data.insert_column(proxy.clone(), residual.iter().copied().collect())?;

        let children = dag.descendants(latent.name());
        let internal: Vec<(&Variable, &Variable)> = children
            .iter()
            .flat_map(|a| children.iter().map(move |b| (a, b)))
            .filter(|(a, b)| a != b)
            .collect();
        graph.remove_edges(internal);
        graph.add_nodes([proxy.clone()])?;
        graph.add_edges(children.iter().map(|c| (proxy.clone(), c.clone())))?;
        graph.remove_latent(latent.name());

        #[cfg(feature = "tracing")]
        tracing::debug!("proxy '{}' stands in for latent '{}' (from '{}')", proxy, latent, node);

        handled.insert(latent.clone());
        found.push(ProxyEstimate {
            latent,
            proxy,
            source: node,
            regressors,
            children,
        });
    }
    Ok(found)
}
