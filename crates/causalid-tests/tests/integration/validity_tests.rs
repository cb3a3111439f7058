use causalid_core::{graph_from_source, CausalError, CausalModel, Variable};

fn path(names: &[&str]) -> Vec<Variable> {
    names.iter().map(|n| Variable::new(n)).collect()
}

fn pearl() -> CausalModel {
    CausalModel::new(graph_from_source(include_str!("../../../../graphs/pearl_backdoor.causal")).unwrap())
}

#[test]
fn enumerates_pearl_backdoor_paths() {
    let paths = pearl().backdoor_paths(&"X".into(), &"Y".into()).unwrap();
    assert_eq!(paths.len(), 4);
    assert!(paths.contains(&path(&["X", "Z3", "Y"])));
    assert!(paths.contains(&path(&["X", "Z1", "Z3", "Z2", "Y"])));
    assert!(paths.iter().all(|p| p[0].name() == "X" && p.last().map(Variable::name) == Some("Y")));
}

#[test]
fn collider_detection() {
    let model = pearl();
    assert!(model.has_collider(&path(&["X", "Z1", "Z3", "Z2", "Y"]), true).unwrap());
    assert!(!model.has_collider(&path(&["X", "Z3", "Z2", "Y"]), true).unwrap());
    assert!(!model.has_collider(&path(&["X", "W"]), true).unwrap());
    assert!(matches!(
        model.has_collider(&path(&["X", "Y"]), true),
        Err(CausalError::InvalidPath(_))
    ));
}

#[test]
fn connected_backdoor_paths() {
    let model = pearl();
    assert!(model.is_connected_backdoor_path(&path(&["X", "Z3", "Y"])).unwrap());
    assert!(!model
        .is_connected_backdoor_path(&path(&["X", "Z1", "Z3", "Z2", "Y"]))
        .unwrap());
    assert!(matches!(
        model.is_connected_backdoor_path(&path(&["X", "W", "Y"])),
        Err(CausalError::NotABackdoorPath(_))
    ));
}

#[test]
fn paths_may_cross_latents() {
    let model = CausalModel::new(graph_from_source(include_str!("../../../../graphs/frontdoor.causal")).unwrap());
    let paths = model.backdoor_paths(&"Smoking".into(), &"Cancer".into()).unwrap();
    assert_eq!(paths, vec![path(&["Smoking", "U_Cancer_Smoking", "Cancer"])]);
    assert!(model.is_connected_backdoor_path(&paths[0]).unwrap());
}
