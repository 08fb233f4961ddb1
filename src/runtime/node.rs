use crate::link::SlotType;
use crate::runtime::context::ExecContext;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Debug;

/// 节点的一个输入或输出槽声明
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortSpec {
    pub name: String,
    #[serde(rename = "type", default)]
    pub slot_type: SlotType,
}

impl PortSpec {
    pub fn new(name: &str, slot_type: &str) -> Self {
        Self {
            name: name.to_string(),
            slot_type: slot_type.to_string(),
        }
    }

    /// A port accepting any data type.
    pub fn any(name: &str) -> Self {
        Self::new(name, "*")
    }
}

/// 运行时节点接口
pub trait NodeBehavior: Send + Sync + Debug {
    /// Runs once per evaluation pass.
    fn execute(&mut self, ctx: &mut ExecContext<'_>) -> Result<()>;
}

/// 节点工厂/定义接口
pub trait NodeDefinition: Send + Sync {
    fn name(&self) -> &str;
    fn inputs(&self) -> Vec<PortSpec>;
    fn outputs(&self) -> Vec<PortSpec>;

    /// Extra inputs an editor may add to an instance on demand.
    fn dynamic_inputs(&self) -> Vec<PortSpec> {
        Vec::new()
    }

    fn validate(&self, properties: &Value) -> Result<()>;
    fn prepare(&self, properties: &Value) -> Result<Box<dyn NodeBehavior>>;
}
