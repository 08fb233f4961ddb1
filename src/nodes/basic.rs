use crate::runtime::context::ExecContext;
use crate::runtime::node::{NodeBehavior, NodeDefinition, PortSpec};
use anyhow::{Result, anyhow};
use serde_json::Value;
use tracing::debug;

// --- CONST NODE ---

#[derive(Debug)]
pub struct ConstNode {
    value: Value,
}

pub struct ConstDefinition;

impl NodeDefinition for ConstDefinition {
    fn name(&self) -> &str { "basic/const" }
    fn inputs(&self) -> Vec<PortSpec> { Vec::new() }
    fn outputs(&self) -> Vec<PortSpec> { vec![PortSpec::any("value")] }

    fn validate(&self, properties: &Value) -> Result<()> {
        properties.get("value").map(|_| ()).ok_or(anyhow!("Missing value"))
    }

    fn prepare(&self, properties: &Value) -> Result<Box<dyn NodeBehavior>> {
        let value = properties.get("value").cloned().ok_or(anyhow!("Missing value"))?;
        Ok(Box::new(ConstNode { value }))
    }
}

impl NodeBehavior for ConstNode {
    fn execute(&mut self, ctx: &mut ExecContext<'_>) -> Result<()> {
        ctx.set_output(0, self.value.clone())
    }
}

// --- WATCH NODE ---

/// Sink that records whatever arrives on its single input.
#[derive(Debug, Default)]
pub struct WatchNode {
    last: Option<Value>,
}

pub struct WatchDefinition;

impl NodeDefinition for WatchDefinition {
    fn name(&self) -> &str { "basic/watch" }
    fn inputs(&self) -> Vec<PortSpec> { vec![PortSpec::any("value")] }
    fn outputs(&self) -> Vec<PortSpec> { Vec::new() }
    fn validate(&self, _properties: &Value) -> Result<()> { Ok(()) }
    fn prepare(&self, _properties: &Value) -> Result<Box<dyn NodeBehavior>> {
        Ok(Box::new(WatchNode::default()))
    }
}

impl NodeBehavior for WatchNode {
    fn execute(&mut self, ctx: &mut ExecContext<'_>) -> Result<()> {
        let current = ctx.get_input(0).cloned();
        if current != self.last {
            debug!(node_id = ctx.node_id, value = ?current, "Watch value changed");
            self.last = current;
        }
        Ok(())
    }
}
