use nodelink::graph::Graph;
use nodelink::graph::loader::load_graph_document;
use nodelink::runtime::registry::NodeRegistry;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

fn demo_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos").join(name)
}

fn run_demo(name: &str) -> Graph {
    let document = load_graph_document(demo_path(name)).expect("Failed to load demo");
    let mut graph = Graph::configure(Arc::new(NodeRegistry::with_builtins()), document)
        .expect("Failed to configure demo");
    graph.run_step().expect("Evaluation pass failed");
    graph
}

#[test]
fn test_selector_demo() {
    let graph = run_demo("selector.json");
    assert_eq!(graph.input_value(5, 0), Some(&json!(7)));
    assert_eq!(graph.link(3).unwrap().target_slot, 2);
}

#[test]
fn test_formula_demo() {
    let graph = run_demo("formula.yaml");
    assert_eq!(graph.input_value(4, 0), Some(&json!(42)));
}
