use anyhow::{Result, Context as AnyhowContext};
use std::fs;
use std::path::Path;
use crate::graph::document::GraphDocument;

fn is_yaml(path: &Path) -> bool {
    matches!(path.extension().and_then(|s| s.to_str()), Some("yaml" | "yml"))
}

/// Reads a graph document; `.yaml`/`.yml` files are YAML, anything else JSON.
pub fn load_graph_document(file_path: impl AsRef<Path>) -> Result<GraphDocument> {
    let path = file_path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read graph file from {}", path.display()))?;

    let document = if is_yaml(path) {
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to deserialize YAML content from {}", path.display()))?
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to deserialize JSON content from {}", path.display()))?
    };

    Ok(document)
}

pub fn save_graph_document(file_path: impl AsRef<Path>, document: &GraphDocument) -> Result<()> {
    let path = file_path.as_ref();
    let content = if is_yaml(path) {
        serde_yaml::to_string(document)?
    } else {
        serde_json::to_string_pretty(document)?
    };

    fs::write(path, content)
        .with_context(|| format!("Failed to write graph file to {}", path.display()))?;
    Ok(())
}
