use causalid_core::{
    display_vars, graph_from_source, var_set, AdjustmentConfig, AdjustmentSets, AdjustmentStyle, CausalError,
    CausalModel, ModelConfig,
};

fn pearl() -> CausalModel {
    CausalModel::new(graph_from_source(include_str!("../../../../graphs/pearl_backdoor.causal")).unwrap())
}

#[test]
fn backdoor_styles_on_pearl_graph() {
    let model = pearl();
    let (x, y) = (var_set(["X"]), var_set(["Y"]));

    let simple = model.get_backdoor_set(&x, &y, AdjustmentStyle::Simple).unwrap();
    assert_eq!(display_vars(simple.adjustment()), "Z1,Z3");

    let minimal = model.get_backdoor_set(&x, &y, AdjustmentStyle::Minimal).unwrap();
    assert_eq!(display_vars(minimal.adjustment()), "Z1,Z3");
    assert_eq!(minimal.prob.to_string(), "sum_{Z1,Z3}[P(Y|X,Z1,Z3)P(Z1,Z3)]");

    let all = model.get_backdoor_set(&x, &y, AdjustmentStyle::All).unwrap();
    let rendered: Vec<String> = all.sets.sets().into_iter().map(|s| display_vars(s)).collect();
    assert_eq!(rendered, vec!["Z1,Z3", "Z2,Z3", "Z1,Z2,Z3"]);
}

#[test]
fn every_all_style_set_is_valid() {
    let model = pearl();
    let (x, y) = (var_set(["X"]), var_set(["Y"]));
    let all = model.get_backdoor_set(&x, &y, AdjustmentStyle::All).unwrap();
    for set in all.sets.sets() {
        let set = set.iter().cloned().collect();
        assert!(model.is_valid_backdoor_set(&set, &x, &y).unwrap());
    }
    assert!(!model.is_valid_backdoor_set(&var_set(["Z3"]), &x, &y).unwrap());
}

#[test]
fn candidate_size_bound_can_exclude_every_separator() {
    let config = ModelConfig {
        adjustment: AdjustmentConfig {
            max_candidate_size: Some(1),
            ..AdjustmentConfig::default()
        },
        ..ModelConfig::default()
    };
    let graph = graph_from_source(include_str!("../../../../graphs/pearl_backdoor.causal")).unwrap();
    let model = CausalModel::with_config(graph, config).unwrap();
    let err = model
        .get_backdoor_set(&var_set(["X"]), &var_set(["Y"]), AdjustmentStyle::Minimal)
        .unwrap_err();
    assert!(matches!(err, CausalError::NoAdjustmentSet { .. }));
}

#[test]
fn frontdoor_on_smoking_graph() {
    let model = CausalModel::new(graph_from_source(include_str!("../../../../graphs/frontdoor.causal")).unwrap());
    let (t, y) = (var_set(["Smoking"]), var_set(["Cancer"]));

    let result = model.get_frontdoor_set(&t, &y, AdjustmentStyle::Simple).unwrap();
    assert_eq!(result.sets, AdjustmentSets::Single(vec!["Tar".into()]));
    assert!(model
        .is_frontdoor_set(&var_set(["Tar"]), &"Smoking".into(), &"Cancer".into())
        .unwrap());

    assert!(matches!(
        model.get_backdoor_set(&t, &y, AdjustmentStyle::Simple),
        Err(CausalError::NoAdjustmentSet { .. })
    ));
}

#[test]
fn no_set_error_names_the_query() {
    let model = CausalModel::new(graph_from_source(include_str!("../../../../graphs/bow.causal")).unwrap());
    let err = model
        .get_frontdoor_set(&var_set(["A"]), &var_set(["B"]), AdjustmentStyle::All)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "no set satisfies the frontdoor criterion (all) for treatment {A} and outcome {B}"
    );
}
