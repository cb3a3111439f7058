use causalid_core::estimation::DoublyRobust;
use causalid_core::{
    graph_from_source, AdjustmentStyle, CausalModel, DataTable, EstimationQuery, IdentifyMethod, Quantity,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Mutex};

/// `z -> t`, `z -> y`, `t -> y` with `y = 2 t + 3 z + noise`.
fn confounded_data(n: usize, seed: u64) -> DataTable {
    let mut rng = StdRng::seed_from_u64(seed);
    let (mut z, mut t, mut y) = (vec![], vec![], vec![]);
    for _ in 0..n {
        let zi: f64 = rng.gen_range(-1.0..1.0);
        let ti = if rng.gen::<f64>() < 1.0 / (1.0 + (-2.0 * zi).exp()) { 1.0 } else { 0.0 };
        z.push(zi);
        t.push(ti);
        y.push(2.0 * ti + 3.0 * zi + rng.gen_range(-0.1..0.1));
    }
    DataTable::from_columns([("z", z), ("t", t), ("y", y)]).unwrap()
}

fn model() -> CausalModel {
    CausalModel::new(graph_from_source("z -> t -> y\nz -> y").unwrap())
}

#[test]
fn backdoor_adjustment_removes_confounding() {
    let data = confounded_data(1000, 5);
    let query = EstimationQuery::ate("y", "t", Vec::new());

    let naive = model().estimate(&data, &query).unwrap().as_scalar().unwrap();
    assert!((naive - 2.0).abs() > 0.5, "naive = {naive}");

    let adjusted = model()
        .identify_estimate(&data, &query, IdentifyMethod::Backdoor(AdjustmentStyle::Minimal))
        .unwrap()
        .as_scalar()
        .unwrap();
    assert!((adjusted - 2.0).abs() < 0.05, "adjusted = {adjusted}");
}

#[test]
fn doubly_robust_agrees_with_slearner() {
    let data = confounded_data(2000, 8);
    let query = EstimationQuery::ate("y", "t", Vec::new());
    let method = IdentifyMethod::Backdoor(AdjustmentStyle::Simple);

    let slearner = model().identify_estimate(&data, &query, method).unwrap();
    let dr = model()
        .with_estimator(Box::new(DoublyRobust::new()))
        .identify_estimate(&data, &query, method)
        .unwrap();
    let (a, b) = (slearner.as_scalar().unwrap(), dr.as_scalar().unwrap());
    assert!((a - b).abs() < 0.2, "slearner = {a}, dr = {b}");
}

#[test]
fn individual_effects_for_selected_rows() {
    let data = confounded_data(100, 13);
    let query = EstimationQuery::ate("y", "t", Vec::new())
        .with_quantity(Quantity::Ite)
        .with_individuals(vec![0, 10, 20]);
    let effect = model()
        .identify_estimate(&data, &query, IdentifyMethod::Backdoor(AdjustmentStyle::Simple))
        .unwrap();
    assert_eq!(effect.per_unit().unwrap().len(), 3);
}

#[test]
fn observer_sees_the_adjustment_set() {
    use causalid_core::IdentificationEvent;

    let seen: Arc<Mutex<Vec<String>>> = Arc::default();
    let sink = Arc::clone(&seen);
    let model = model().with_observer(move |event| {
        if let IdentificationEvent::AdjustmentSet { set, .. } = event {
            sink.lock().unwrap().push(causalid_core::display_vars(set.iter()));
        }
    });
    let data = confounded_data(50, 1);
    model
        .identify_estimate(
            &data,
            &EstimationQuery::ate("y", "t", Vec::new()),
            IdentifyMethod::Backdoor(AdjustmentStyle::Simple),
        )
        .unwrap();
    assert_eq!(*seen.lock().unwrap(), vec!["z".to_string()]);
}

#[test]
fn hidden_confounder_becomes_a_proxy_column() {
    let mut rng = StdRng::seed_from_u64(77);
    let (mut w, mut x, mut y) = (vec![], vec![], vec![]);
    for _ in 0..300 {
        let u: f64 = rng.gen_range(-1.0..1.0);
        let wi: f64 = rng.gen_range(-1.0..1.0);
        let xi = wi + u + rng.gen_range(-0.05..0.05);
        w.push(wi);
        x.push(xi);
        y.push(2.0 * xi + u);
    }
    let mut data = DataTable::from_columns([("W", w), ("X", x), ("Y", y)]).unwrap();
    let mut model =
        CausalModel::new(graph_from_source(include_str!("../../../../graphs/hidden_confounder.causal")).unwrap());

    let report = model.estimate_hidden_confounders(&mut data).unwrap();
    assert_eq!(report.proxies.len(), 1);
    assert_eq!(report.remaining_latents, 0);
    assert!(data.has_column("estimate_u"));
    assert!(model.graph().contains("estimate_u"));
    assert!(model.graph().latents().is_empty());
}
