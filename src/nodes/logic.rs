use crate::runtime::context::ExecContext;
use crate::runtime::node::{NodeBehavior, NodeDefinition, PortSpec};
use anyhow::{Result, bail};
use serde_json::Value;
use tracing::debug;

/// 选择器：根据 `sel` 把某一路输入转发到唯一的输出
///
/// A boolean `sel` picks `A` when true and `B` when false. A numeric `sel`
/// is rounded and wrapped over the value inputs, 0 being `A`.
#[derive(Debug, Default)]
pub struct SelectorNode {
    selected: usize,
}

pub struct SelectorDefinition;

impl NodeDefinition for SelectorDefinition {
    fn name(&self) -> &str { "logic/selector" }

    fn inputs(&self) -> Vec<PortSpec> {
        vec![PortSpec::new("sel", "boolean"), PortSpec::any("A"), PortSpec::any("B")]
    }

    fn outputs(&self) -> Vec<PortSpec> {
        vec![PortSpec::any("out")]
    }

    fn dynamic_inputs(&self) -> Vec<PortSpec> {
        vec![PortSpec::any("C"), PortSpec::any("D")]
    }

    fn validate(&self, _properties: &Value) -> Result<()> { Ok(()) }

    fn prepare(&self, _properties: &Value) -> Result<Box<dyn NodeBehavior>> {
        Ok(Box::new(SelectorNode::default()))
    }
}

impl NodeBehavior for SelectorNode {
    fn execute(&mut self, ctx: &mut ExecContext<'_>) -> Result<()> {
        let value_inputs = ctx.input_count().saturating_sub(1);
        if value_inputs == 0 {
            return Ok(());
        }

        let index = match ctx.get_input(0) {
            None | Some(Value::Null) => return Ok(()),
            Some(Value::Bool(true)) => 0,
            Some(Value::Bool(false)) => 1,
            Some(Value::Number(n)) => {
                let raw = n.as_f64().unwrap_or(0.0).round() as i64;
                raw.rem_euclid(value_inputs as i64) as usize
            }
            Some(other) => bail!("selector expects a boolean or number on sel, got {}", other),
        };
        if index != self.selected {
            debug!(node_id = ctx.node_id, from = self.selected, to = index, "Selector switched input");
            self.selected = index;
        }

        if let Some(value) = ctx.get_input(index + 1).cloned() {
            ctx.set_output(0, value)?;
        }
        Ok(())
    }
}
