use crate::link::{NodeId, SlotIndex};
use anyhow::{Result, anyhow};
use serde_json::Value;

/// 执行上下文 (Execution Context)
/// 一次求值过程中交给单个节点：按索引读取输入，按索引写出输出
pub struct ExecContext<'a> {
    pub node_id: NodeId,
    inputs: &'a [Option<Value>],
    outputs: &'a mut [Option<Value>],
}

impl<'a> ExecContext<'a> {
    pub fn new(
        node_id: NodeId,
        inputs: &'a [Option<Value>],
        outputs: &'a mut [Option<Value>],
    ) -> Self {
        Self {
            node_id,
            inputs,
            outputs,
        }
    }

    /// Data delivered on input `slot`, `None` when unlinked or not yet produced.
    pub fn get_input(&self, slot: SlotIndex) -> Option<&Value> {
        self.inputs.get(slot).and_then(|v| v.as_ref())
    }

    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    pub fn set_output(&mut self, slot: SlotIndex, value: Value) -> Result<()> {
        let (node_id, count) = (self.node_id, self.outputs.len());
        let target = self.outputs.get_mut(slot).ok_or_else(|| {
            anyhow!("output slot {} out of range on node {} ({} outputs)", slot, node_id, count)
        })?;
        *target = Some(value);
        Ok(())
    }
}
