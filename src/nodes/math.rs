use crate::runtime::context::ExecContext;
use crate::runtime::node::{NodeBehavior, NodeDefinition, PortSpec};
use anyhow::{Result, anyhow};
use evalexpr::{build_operator_tree, ContextWithMutableVariables, DefaultNumericTypes, HashMapContext, Node as EvalNode};
use serde_json::{Value, json};
use tracing::warn;

const VARIABLES: [&str; 2] = ["x", "y"];

#[derive(Debug)]
pub struct FormulaNode {
    formula: EvalNode,
    raw_formula: String,
}

pub struct FormulaDefinition;

impl FormulaDefinition {
    fn formula(properties: &Value) -> Result<&str> {
        properties.get("formula").and_then(|v| v.as_str()).ok_or(anyhow!("Missing formula"))
    }
}

impl NodeDefinition for FormulaDefinition {
    fn name(&self) -> &str { "math/formula" }

    fn inputs(&self) -> Vec<PortSpec> {
        VARIABLES.iter().map(|v| PortSpec::new(v, "number")).collect()
    }

    fn outputs(&self) -> Vec<PortSpec> {
        vec![PortSpec::new("value", "number")]
    }

    fn validate(&self, properties: &Value) -> Result<()> {
        let raw = Self::formula(properties)?;
        let _: EvalNode = build_operator_tree(raw)?;
        Ok(())
    }

    fn prepare(&self, properties: &Value) -> Result<Box<dyn NodeBehavior>> {
        let raw = Self::formula(properties)?;
        let formula: EvalNode = build_operator_tree(raw)?;
        Ok(Box::new(FormulaNode {
            formula,
            raw_formula: raw.to_string(),
        }))
    }
}

impl NodeBehavior for FormulaNode {
    fn execute(&mut self, ctx: &mut ExecContext<'_>) -> Result<()> {
        let mut eval_ctx = HashMapContext::<DefaultNumericTypes>::new();
        for (slot, name) in VARIABLES.iter().enumerate() {
            let ev = match ctx.get_input(slot) {
                Some(Value::Number(n)) => {
                    if let Some(i) = n.as_i64() { Some(evalexpr::Value::Int(i)) }
                    else if let Some(f) = n.as_f64() { Some(evalexpr::Value::Float(f)) }
                    else { None }
                }
                Some(Value::Bool(b)) => Some(evalexpr::Value::Boolean(*b)),
                _ => None,
            };
            if let Some(ev) = ev {
                eval_ctx.set_value(name.to_string(), ev)?;
            }
        }

        match self.formula.eval_with_context(&eval_ctx) {
            Ok(result) => {
                let json_val = match result {
                    evalexpr::Value::Int(i) => Some(json!(i)),
                    evalexpr::Value::Float(f) => Some(json!(f)),
                    evalexpr::Value::Boolean(b) => Some(Value::Bool(b)),
                    _ => None,
                };
                if let Some(jv) = json_val {
                    ctx.set_output(0, jv)?;
                }
            }
            Err(e) => warn!(node_id = ctx.node_id, "Formula evaluation failed: {} -> {}", self.raw_formula, e),
        }
        Ok(())
    }
}
