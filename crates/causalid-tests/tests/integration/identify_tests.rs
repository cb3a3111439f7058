use causalid_core::engine::frontdoor::frontdoor_prob;
use causalid_core::{graph_from_source, id, var_set, CausalError, CausalModel, IdentifyMethod, ProbExpr, VarSet};

fn model(src: &str) -> CausalModel {
    CausalModel::new(graph_from_source(src).expect("graph"))
}

#[test]
fn frontdoor_graph_matches_frontdoor_formula() {
    let model = model(include_str!("../../../../graphs/frontdoor.causal"));
    let (t, y) = (var_set(["Smoking"]), var_set(["Cancer"]));

    let general = model.identify(&t, &y, IdentifyMethod::General).unwrap();
    let expected = frontdoor_prob(&"Smoking".into(), &"Cancer".into(), &var_set(["Tar"]));
    assert_eq!(general.prob().to_string(), expected.to_string());
}

#[test]
fn bow_graph_is_not_identifiable() {
    let model = model(include_str!("../../../../graphs/bow.causal"));
    let err = model
        .identify(&var_set(["A"]), &var_set(["B"]), IdentifyMethod::General)
        .unwrap_err();
    assert!(matches!(err, CausalError::Identification { .. }));
    assert_eq!(err.to_string(), "P(B | do(A)) is not identifiable in the current graph");
}

#[test]
fn napkin_is_identified_only_by_id() {
    use causalid_core::AdjustmentStyle::Minimal;

    let model = model(include_str!("../../../../graphs/napkin.causal"));
    let (t, y) = (var_set(["X"]), var_set(["Y"]));
    // Branches 6 and 7 build observational conditionals from the graph's
    // topological order, so the napkin effect renders as a plain conditional.
    let general = model.identify(&t, &y, IdentifyMethod::General).unwrap();
    assert_eq!(general.prob().to_string(), "P(Y|X)");
    assert!(matches!(
        model.identify(&t, &y, IdentifyMethod::Backdoor(Minimal)),
        Err(CausalError::NoAdjustmentSet { .. })
    ));
    assert!(matches!(
        model.identify(&t, &y, IdentifyMethod::Frontdoor(Minimal)),
        Err(CausalError::NoAdjustmentSet { .. })
    ));
}

#[test]
fn pearl_graph_is_identified() {
    let model = model(include_str!("../../../../graphs/pearl_backdoor.causal"));
    let prob = model.id(&var_set(["Y"]), &var_set(["X"])).unwrap();
    match &prob {
        ProbExpr::Marginal { over, .. } => assert_eq!(over, &var_set(["W", "Z1", "Z2", "Z3"])),
        other => panic!("expected a marginal, got {other}"),
    }
    assert_eq!(
        prob.to_string(),
        "sum_{W,Z1,Z2,Z3}[P(W|X,Z1,Z2,Z3)P(Y|W,X,Z1,Z2,Z3)P(Z1)P(Z2)P(Z3|Z1,Z2)]"
    );
}

#[test]
fn id_without_intervention_is_the_outcome_marginal() {
    let graph = graph_from_source(include_str!("../../../../graphs/napkin.causal")).unwrap();
    let y = var_set(["Y", "W1"]);
    let prob = id(&y, &VarSet::new(), &graph.joint(), &graph).unwrap();
    assert_eq!(prob, ProbExpr::joint(y));
}

#[test]
fn identification_leaves_the_graph_untouched() {
    let model = model(include_str!("../../../../graphs/napkin.causal"));
    let before = model.graph().clone();
    let _ = model.id(&var_set(["Y"]), &var_set(["X"]));
    assert_eq!(model.graph(), &before);
}

#[test]
fn unknown_variables_are_rejected() {
    let model = model(include_str!("../../../../graphs/bow.causal"));
    assert!(matches!(
        model.id(&var_set(["Q"]), &var_set(["A"])),
        Err(CausalError::InvalidArgument(_))
    ));
}
