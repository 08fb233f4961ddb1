use nodelink::graph::Graph;
use nodelink::runtime::registry::NodeRegistry;
use nodelink::GraphError;
use serde_json::{json, Value};
use std::sync::Arc;

/// Builds `sel, A, B` consts wired into a selector whose output feeds a watch.
fn selector_graph(sel: Value, a: Value, b: Value) -> (Graph, u64, u64) {
    let mut graph = Graph::new(Arc::new(NodeRegistry::with_builtins()));
    let sel_src = graph.add_node("basic/const", json!({ "value": sel })).unwrap();
    let a_src = graph.add_node("basic/const", json!({ "value": a })).unwrap();
    let b_src = graph.add_node("basic/const", json!({ "value": b })).unwrap();
    let selector = graph.add_node("logic/selector", json!({})).unwrap();
    let watch = graph.add_node("basic/watch", json!({})).unwrap();

    graph.connect(sel_src, 0, selector, 0).unwrap();
    graph.connect(a_src, 0, selector, 1).unwrap();
    graph.connect(b_src, 0, selector, 2).unwrap();
    graph.connect(selector, 0, watch, 0).unwrap();
    (graph, selector, watch)
}

#[test]
fn test_selector_true_picks_a() {
    let (mut graph, selector, watch) = selector_graph(json!(true), json!(7), json!(9));
    graph.run_step().expect("Evaluation pass failed");

    assert_eq!(graph.output_value(selector, 0), Some(&json!(7)));
    assert_eq!(graph.input_value(watch, 0), Some(&json!(7)));
}

#[test]
fn test_selector_false_picks_b() {
    let (mut graph, selector, _) = selector_graph(json!(false), json!(7), json!(9));
    graph.run_step().expect("Evaluation pass failed");

    assert_eq!(graph.output_value(selector, 0), Some(&json!(9)));
}

#[test]
fn test_selector_numeric_index_wraps_over_dynamic_inputs() {
    let (mut graph, selector, _) = selector_graph(json!(2.4), json!("a"), json!("b"));
    let c_slot = graph.add_dynamic_input(selector, "C").unwrap();
    let c_src = graph.add_node("basic/const", json!({ "value": "c" })).unwrap();
    graph.connect(c_src, 0, selector, c_slot).unwrap();

    graph.run_step().unwrap();
    assert_eq!(graph.output_value(selector, 0), Some(&json!("c")));

    // -1 wraps around to the last value input.
    let (mut graph, selector, _) = selector_graph(json!(-1), json!("a"), json!("b"));
    graph.run_step().unwrap();
    assert_eq!(graph.output_value(selector, 0), Some(&json!("b")));
}

#[test]
fn test_selector_without_sel_writes_nothing() {
    let mut graph = Graph::new(Arc::new(NodeRegistry::with_builtins()));
    let a_src = graph.add_node("basic/const", json!({ "value": 7 })).unwrap();
    let selector = graph.add_node("logic/selector", json!({})).unwrap();
    graph.connect(a_src, 0, selector, 1).unwrap();

    graph.run_step().unwrap();
    assert_eq!(graph.output_value(selector, 0), None);
}

#[test]
fn test_selector_rejects_non_scalar_sel() {
    let (mut graph, selector, _) = selector_graph(json!("yes"), json!(7), json!(9));

    match graph.run_step() {
        Err(GraphError::Execution { node, .. }) => assert_eq!(node, selector),
        other => panic!("expected execution error, got {:?}", other),
    }
}

#[test]
fn test_selector_output_follows_sel_changes_across_passes() {
    let (mut graph, selector, watch) = selector_graph(json!(true), json!(7), json!(9));
    graph.run_step().unwrap();
    assert_eq!(graph.input_value(watch, 0), Some(&json!(7)));

    let sel_src = graph.node(selector).unwrap().input_link(0)
        .and_then(|l| graph.link(l))
        .map(|l| l.origin_id)
        .unwrap();
    let flipped = graph.add_node("basic/const", json!({ "value": false })).unwrap();
    graph.connect(flipped, 0, selector, 0).unwrap();
    graph.remove_node(sel_src).unwrap();

    graph.run_step().unwrap();
    assert_eq!(graph.input_value(watch, 0), Some(&json!(9)));
    assert_eq!(graph.iteration(), 2);
}
