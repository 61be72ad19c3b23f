#![cfg(target_arch = "wasm32")]

use activation_graph::ActivationGraphWasm;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

fn engine() -> ActivationGraphWasm {
    ActivationGraphWasm::new(JsValue::UNDEFINED, JsValue::UNDEFINED).unwrap()
}

#[wasm_bindgen_test]
fn add_nodes_and_edges() {
    let mut graph = engine();
    graph.add_node(0, "alpha", None).unwrap();
    graph.add_node(1, "beta gamma", Some(0)).unwrap();
    graph.add_node(1, "ignored", None).unwrap();

    let first = graph.add_edge(0, 1).unwrap();
    assert_eq!(graph.add_edge(1, 0).unwrap(), first);

    assert_eq!(graph.node_count(), 2);
    assert_eq!(graph.edge_count(), 1);
    assert_eq!(graph.node_ids(), vec![0, 1]);
    assert_eq!(graph.node_label(1).unwrap(), "beta gamma");
    assert_eq!(graph.node_safe_label(1).unwrap(), "betagamma");
    assert_eq!(graph.edge_pairs(), vec![0, 1]);
    assert_eq!(graph.positions().length(), 4);
}

#[wasm_bindgen_test]
fn unknown_node_throws() {
    let mut graph = engine();
    assert!(graph.add_edge(0, 1).is_err());
    assert!(graph.select(7).is_err());
    assert!(graph.set_hovered(Some(7)).is_err());
}

#[wasm_bindgen_test]
fn selection_drives_distances() {
    let mut graph = engine();
    for id in 0..3 {
        graph.add_node(id, "n", None).unwrap();
    }
    graph.add_edge(0, 1).unwrap();
    graph.add_edge(1, 2).unwrap();

    graph.select(2).unwrap();
    graph.step(0.0);
    assert_eq!(graph.distances(), vec![2, 1, 0]);
    assert_eq!(graph.get_selected(), Some(2));

    graph.clear_select();
    graph.step(0.0);
    assert_eq!(graph.distances(), vec![-1, -1, -1]);
}

#[wasm_bindgen_test]
fn tick_with_network_snapshot() {
    let mut graph = engine();
    let snapshot = js_sys::JSON::parse(
        r#"{"names":["a","b"],"activations":[0.2,0.9],"weights":[0,0.5,0.5,0]}"#,
    )
    .unwrap();

    let dt = graph.tick_with_network(snapshot, 1.0).unwrap();
    assert!((dt - 1.0 / 60.0).abs() < 1e-6);
    assert_eq!(graph.node_count(), 2);
    assert_eq!(graph.edge_weights().to_vec(), vec![0.5]);
    assert_eq!(graph.activities().to_vec(), vec![0.2, 0.9]);
}

#[wasm_bindgen_test]
fn config_from_json() {
    let graph = ActivationGraphWasm::from_json(r#"{"physics":{"mass":2.0,"maxspeed":10.0}}"#);
    assert!(graph.is_ok());
    assert!(ActivationGraphWasm::from_json(r#"{"mass":-1.0}"#).is_err());
}

#[wasm_bindgen_test]
fn invalid_tick_config_throws() {
    let tick = js_sys::JSON::parse(r#"{"time_scale":-2}"#).unwrap();
    assert!(ActivationGraphWasm::new(JsValue::UNDEFINED, tick).is_err());
}
