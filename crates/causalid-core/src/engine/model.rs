//! # Causal Model
//!
//! Entry point tying the engine together: a [`CausalModel`] owns a graph and
//! dispatches identification requests to the ID algorithm or to one of the
//! adjustment searches, then optionally hands the adjustment set to an
//! estimator.
//!
//! Nothing is printed. Callers who want to see estimands or adjustment sets
//! as they are produced register an observer with
//! [`CausalModel::with_observer`].

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use causalid_prob::{display_vars, ProbExpr, VarSet, Variable};

use crate::engine::adjustment::{AdjustmentConfig, AdjustmentResult, AdjustmentStyle};
use crate::engine::backdoor::get_backdoor_set;
use crate::engine::errors::{CausalError, Criterion};
use crate::engine::frontdoor::{get_frontdoor_set, is_frontdoor_set};
use crate::engine::graph::CausalGraph;
use crate::engine::hidden_confounder::{estimate_hidden_confounders, ProxyConfig, ProxyEstimate, ProxyReport};
use crate::engine::identify::id;
use crate::engine::validity;
use crate::estimation::{DataTable, Effect, EstimationQuery, Estimator, SLearner};

/// Identification strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IdentifyMethod {
    /// The ID algorithm; yields an expression, no adjustment set.
    #[default]
    General,
    Backdoor(AdjustmentStyle),
    Frontdoor(AdjustmentStyle),
}

impl IdentifyMethod {
    /// Builds a method from a method name and a style name.
    ///
    /// `"default"` selects the ID algorithm and ignores the style.
    pub fn parse(method: &str, style: &str) -> Result<Self, CausalError> {
        match method {
            "default" | "general" => Ok(Self::General),
            "backdoor" => Ok(Self::Backdoor(style.parse()?)),
            "frontdoor" => Ok(Self::Frontdoor(style.parse()?)),
            other => Err(CausalError::InvalidArgument(format!(
                "unknown identification method '{}' (expected default, backdoor or frontdoor)",
                other
            ))),
        }
    }

    pub fn criterion(&self) -> Option<Criterion> {
        match self {
            Self::General => None,
            Self::Backdoor(_) => Some(Criterion::Backdoor),
            Self::Frontdoor(_) => Some(Criterion::Frontdoor),
        }
    }
}

impl FromStr for IdentifyMethod {
    type Err = CausalError;

    /// Method name with the `simple` style.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s, "simple")
    }
}

impl fmt::Display for IdentifyMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::General => f.write_str("default"),
            Self::Backdoor(style) => write!(f, "backdoor ({})", style),
            Self::Frontdoor(style) => write!(f, "frontdoor ({})", style),
        }
    }
}

/// Result of [`CausalModel::identify`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Identification {
    Expression(ProbExpr),
    Adjustment(AdjustmentResult),
}

impl Identification {
    pub fn prob(&self) -> &ProbExpr {
        match self {
            Self::Expression(prob) => prob,
            Self::Adjustment(result) => &result.prob,
        }
    }

    pub fn adjustment(&self) -> Option<&AdjustmentResult> {
        match self {
            Self::Expression(_) => None,
            Self::Adjustment(result) => Some(result),
        }
    }
}

/// Notifications sent to a model's observer.
#[derive(Debug, Clone, Copy)]
pub enum IdentificationEvent<'a> {
    /// An estimand was built.
    Estimand {
        method: IdentifyMethod,
        prob: &'a ProbExpr,
    },
    /// An adjustment set was handed to the estimator.
    AdjustmentSet {
        criterion: Criterion,
        set: &'a [Variable],
    },
    /// The hidden-confounder routine created a proxy.
    ProxyEstimated(&'a ProxyEstimate),
}

/// Observer callback.
pub type Observer = Arc<dyn Fn(&IdentificationEvent<'_>) + Send + Sync>;

/// Model-wide configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelConfig {
    pub adjustment: AdjustmentConfig,
    pub proxy: ProxyConfig,
}

impl ModelConfig {
    pub fn validate(self) -> Result<Self, CausalError> {
        Ok(Self {
            adjustment: self.adjustment.validate()?,
            proxy: self.proxy.validate()?,
        })
    }
}

/// A causal graph together with the identification and estimation
/// machinery that runs on it.
pub struct CausalModel {
    graph: CausalGraph,
    config: ModelConfig,
    estimator: Box<dyn Estimator>,
    observer: Option<Observer>,
}

impl fmt::Debug for CausalModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CausalModel")
            .field("graph", &self.graph)
            .field("config", &self.config)
            .field("estimator", &self.estimator.name())
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl CausalModel {
    /// Model with default configuration and the [`SLearner`] estimator.
    pub fn new(graph: CausalGraph) -> Self {
        Self {
            graph,
            config: ModelConfig::default(),
            estimator: Box::new(SLearner::new()),
            observer: None,
        }
    }

    pub fn with_config(graph: CausalGraph, config: ModelConfig) -> Result<Self, CausalError> {
        Ok(Self {
            config: config.validate()?,
            ..Self::new(graph)
        })
    }

    pub fn with_estimator(mut self, estimator: Box<dyn Estimator>) -> Self {
        self.estimator = estimator;
        self
    }

    pub fn with_observer<F>(mut self, observer: F) -> Self
    where
        F: Fn(&IdentificationEvent<'_>) + Send + Sync + 'static,
    {
        self.observer = Some(Arc::new(observer));
        self
    }

    pub fn graph(&self) -> &CausalGraph {
        &self.graph
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn estimator(&self) -> &dyn Estimator {
        self.estimator.as_ref()
    }

    fn notify(&self, event: IdentificationEvent<'_>) {
        if let Some(observer) = &self.observer {
            observer(&event);
        }
    }

    // ------------------------------------------------------------------
    // Identification
    // ------------------------------------------------------------------

    /// Identifies the effect of `treatment` on `outcome` with `method`.
    pub fn identify(
        &self,
        treatment: &VarSet,
        outcome: &VarSet,
        method: IdentifyMethod,
    ) -> Result<Identification, CausalError> {
        self.check_query(treatment, outcome)?;
        let identification = match method {
            IdentifyMethod::General => {
                Identification::Expression(id(outcome, treatment, &self.graph.joint(), &self.graph)?)
            }
            IdentifyMethod::Backdoor(style) => Identification::Adjustment(get_backdoor_set(
                &self.graph,
                treatment,
                outcome,
                style,
                self.config.adjustment,
            )?),
            IdentifyMethod::Frontdoor(style) => Identification::Adjustment(get_frontdoor_set(
                &self.graph,
                treatment,
                outcome,
                style,
                self.config.adjustment,
            )?),
        };
        self.notify(IdentificationEvent::Estimand {
            method,
            prob: identification.prob(),
        });
        Ok(identification)
    }

    /// `P(outcome | do(treatment))` by the ID algorithm over the observed
    /// joint distribution.
    pub fn id(&self, outcome: &VarSet, treatment: &VarSet) -> Result<ProbExpr, CausalError> {
        self.check_names(outcome.iter().chain(treatment))?;
        if outcome.is_empty() {
            return Err(CausalError::InvalidArgument("outcome set is empty".into()));
        }
        if let Some(shared) = outcome.intersection(treatment).next() {
            return Err(CausalError::InvalidArgument(format!(
                "'{}' is both treatment and outcome",
                shared
            )));
        }
        id(outcome, treatment, &self.graph.joint(), &self.graph)
    }

    pub fn get_backdoor_set(
        &self,
        treatment: &VarSet,
        outcome: &VarSet,
        style: AdjustmentStyle,
    ) -> Result<AdjustmentResult, CausalError> {
        self.check_query(treatment, outcome)?;
        get_backdoor_set(&self.graph, treatment, outcome, style, self.config.adjustment)
    }

    pub fn get_frontdoor_set(
        &self,
        treatment: &VarSet,
        outcome: &VarSet,
        style: AdjustmentStyle,
    ) -> Result<AdjustmentResult, CausalError> {
        self.check_query(treatment, outcome)?;
        get_frontdoor_set(&self.graph, treatment, outcome, style, self.config.adjustment)
    }

    // ------------------------------------------------------------------
    // Validity checks
    // ------------------------------------------------------------------

    pub fn backdoor_paths(&self, treatment: &Variable, outcome: &Variable) -> Result<Vec<Vec<Variable>>, CausalError> {
        self.check_names([treatment, outcome])?;
        Ok(validity::backdoor_paths(&self.graph.latent_dag(), treatment, outcome))
    }

    pub fn has_collider(&self, path: &[Variable], backdoor: bool) -> Result<bool, CausalError> {
        validity::has_collider(&self.graph.latent_dag(), path, backdoor)
    }

    pub fn is_connected_backdoor_path(&self, path: &[Variable]) -> Result<bool, CausalError> {
        validity::is_connected_backdoor_path(&self.graph.latent_dag(), path)
    }

    pub fn is_valid_backdoor_set(
        &self,
        set: &VarSet,
        treatment: &VarSet,
        outcome: &VarSet,
    ) -> Result<bool, CausalError> {
        self.check_names(set.iter().chain(treatment).chain(outcome))?;
        validity::is_valid_backdoor_set(&self.graph, set, treatment, outcome)
    }

    pub fn is_frontdoor_set(&self, set: &VarSet, treatment: &Variable, outcome: &Variable) -> Result<bool, CausalError> {
        self.check_names(set.iter().chain([treatment, outcome]))?;
        is_frontdoor_set(&self.graph, set, treatment, outcome)
    }

    // ------------------------------------------------------------------
    // Estimation
    // ------------------------------------------------------------------

    /// Runs the model's estimator on `query` as given.
    pub fn estimate(&self, data: &DataTable, query: &EstimationQuery) -> Result<Effect, CausalError> {
        self.estimator.estimate(data, query)
    }

    /// Finds an adjustment set with `method` and estimates with it.
    ///
    /// `query.adjustment` is replaced by the set found. The general method
    /// produces no adjustment set and is rejected.
    pub fn identify_estimate(
        &self,
        data: &DataTable,
        query: &EstimationQuery,
        method: IdentifyMethod,
    ) -> Result<Effect, CausalError> {
        let Some(criterion) = method.criterion() else {
            return Err(CausalError::InvalidArgument(
                "estimation needs a back-door or front-door method".into(),
            ));
        };
        let treatment: VarSet = [query.treatment.clone()].into_iter().collect();
        let outcome: VarSet = [query.outcome.clone()].into_iter().collect();
        let identification = self.identify(&treatment, &outcome, method)?;
        let adjustment = identification
            .adjustment()
            .map(|r| r.adjustment().to_vec())
            .unwrap_or_default();

        self.notify(IdentificationEvent::AdjustmentSet {
            criterion,
            set: &adjustment,
        });
        let query = EstimationQuery {
            adjustment,
            ..query.clone()
        };
        self.estimator.estimate(data, &query)
    }

    /// Replaces latent confounders by observed proxies; see
    /// [`crate::engine::hidden_confounder`].
    pub fn estimate_hidden_confounders(&mut self, data: &mut DataTable) -> Result<ProxyReport, CausalError> {
        let report = estimate_hidden_confounders(&mut self.graph, data, self.config.proxy.clone())?;
        for proxy in &report.proxies {
            self.notify(IdentificationEvent::ProxyEstimated(proxy));
        }
        Ok(report)
    }

    // ------------------------------------------------------------------
    // Argument checks
    // ------------------------------------------------------------------

    fn check_names<'a, I>(&self, names: I) -> Result<(), CausalError>
    where
        I: IntoIterator<Item = &'a Variable>,
    {
        for name in names {
            if !self.graph.contains(name.name()) {
                return Err(CausalError::InvalidArgument(format!(
                    "'{}' is not an observed node of the graph",
                    name
                )));
            }
        }
        Ok(())
    }

    fn check_query(&self, treatment: &VarSet, outcome: &VarSet) -> Result<(), CausalError> {
        if treatment.is_empty() || outcome.is_empty() {
            return Err(CausalError::InvalidArgument(
                "treatment and outcome must be non-empty".into(),
            ));
        }
        self.check_names(treatment.iter().chain(outcome))?;
        let shared: VarSet = treatment.intersection(outcome).cloned().collect();
        if !shared.is_empty() {
            return Err(CausalError::InvalidArgument(format!(
                "{{{}}} both treatment and outcome",
                display_vars(&shared)
            )));
        }
        Ok(())
    }
}
