use crate::nodes::basic::{ConstDefinition, WatchDefinition};
use crate::nodes::logic::SelectorDefinition;
use crate::nodes::math::FormulaDefinition;
use crate::runtime::node::NodeDefinition;
use std::collections::HashMap;
use tracing::debug;

/// Registry for node factories, keyed by type name.
///
/// Built once at startup and shared with every graph that needs to look up
/// node constructors.
#[derive(Default)]
pub struct NodeRegistry {
    definitions: HashMap<String, Box<dyn NodeDefinition>>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(ConstDefinition));
        registry.register(Box::new(WatchDefinition));
        registry.register(Box::new(SelectorDefinition));
        registry.register(Box::new(FormulaDefinition));
        registry
    }

    /// Adds a definition, replacing any previous one with the same name.
    pub fn register(&mut self, definition: Box<dyn NodeDefinition>) {
        let name = definition.name().to_string();
        debug!(node_type = %name, "Registering node type");
        self.definitions.insert(name, definition);
    }

    pub fn get(&self, name: &str) -> Option<&dyn NodeDefinition> {
        self.definitions.get(name).map(|d| d.as_ref())
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.definitions.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }
}
