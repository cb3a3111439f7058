use causalid_core::{graph_from_source, CausalError};
use causalid_frontend::{parse_graph, StatementKind};

#[test]
fn parses_frontdoor_graph() {
    let src = include_str!("../../../../graphs/frontdoor.causal");
    let ast = parse_graph(src).expect("parse frontdoor");
    assert_eq!(ast.statements.len(), 3);
    assert!(matches!(
        &ast.statements[2].kind,
        StatementKind::Confounded { left, right } if left == "Smoking" && right == "Cancer"
    ));
}

#[test]
fn builds_every_shipped_graph() {
    let sources = [
        include_str!("../../../../graphs/frontdoor.causal"),
        include_str!("../../../../graphs/pearl_backdoor.causal"),
        include_str!("../../../../graphs/bow.causal"),
        include_str!("../../../../graphs/hidden_confounder.causal"),
        include_str!("../../../../graphs/napkin.causal"),
    ];
    for src in sources {
        let graph = graph_from_source(src).expect("build graph");
        assert!(!graph.nodes().is_empty());
    }
}

#[test]
fn pearl_graph_shape() {
    let graph = graph_from_source(include_str!("../../../../graphs/pearl_backdoor.causal")).unwrap();
    assert_eq!(graph.nodes().len(), 6);
    assert_eq!(graph.edge_count(), 8);
    assert!(graph.latents().is_empty());
    let order = graph.topological_order();
    let pos = |name: &str| order.iter().position(|v| v.name() == name).unwrap();
    assert!(pos("Z3") < pos("X"));
    assert!(pos("W") < pos("Y"));
}

#[test]
fn napkin_latents_are_kept_by_name() {
    let graph = graph_from_source(include_str!("../../../../graphs/napkin.causal")).unwrap();
    let latents: Vec<&str> = graph.latents().keys().map(|v| v.name()).collect();
    assert_eq!(latents, vec!["U1", "U2"]);
    assert_eq!(graph.c_components().len(), 2);
}

#[test]
fn semantic_errors_surface_as_validation() {
    for src in ["A -> B\nB -> A", "latent A -> B\nA -> C", "A -> A"] {
        assert!(
            matches!(graph_from_source(src), Err(CausalError::Validation(_))),
            "{src:?} should fail validation"
        );
    }
}
