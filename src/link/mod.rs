pub mod data;

pub use data::{LinkData, NamedLink, SerializedLink};

use serde_json::Value;

use crate::error::GraphError;

pub type LinkId = u64;
pub type NodeId = u64;
pub type SlotIndex = usize;
/// 槽位数据类型标签，仅作描述用途，不做类型检查
pub type SlotType = String;

/// 图中的一条有向连线：origin 节点的输出槽 -> target 节点的输入槽
///
/// The cached midpoint is render-only state. It never takes part in
/// equality or in either serialized form.
#[derive(Debug, Clone, Default)]
pub struct LinkRecord {
    pub id: LinkId,
    pub slot_type: SlotType,
    pub origin_id: NodeId,
    pub origin_slot: SlotIndex,
    pub target_id: NodeId,
    pub target_slot: SlotIndex,
    midpoint: [f32; 2],
}

impl LinkRecord {
    pub fn new(
        id: LinkId,
        slot_type: impl Into<SlotType>,
        origin_id: NodeId,
        origin_slot: SlotIndex,
        target_id: NodeId,
        target_slot: SlotIndex,
    ) -> Self {
        Self {
            id,
            slot_type: slot_type.into(),
            origin_id,
            origin_slot,
            target_id,
            target_slot,
            midpoint: [0.0, 0.0],
        }
    }

    /// Builds a fresh record from either encoding.
    pub fn from_data(data: LinkData) -> Self {
        let mut link = Self::default();
        link.configure(data);
        link
    }

    /// Replaces the persisted fields from `data`.
    ///
    /// The named form merges: fields absent from `data` keep their current
    /// value.
    pub fn configure(&mut self, data: LinkData) {
        match data {
            LinkData::Ordered((id, origin_id, origin_slot, target_id, target_slot, slot_type)) => {
                self.id = id;
                self.origin_id = origin_id;
                self.origin_slot = origin_slot;
                self.target_id = target_id;
                self.target_slot = target_slot;
                self.slot_type = slot_type;
            }
            LinkData::Named(named) => {
                if let Some(id) = named.id {
                    self.id = id;
                }
                if let Some(slot_type) = named.slot_type {
                    self.slot_type = slot_type;
                }
                if let Some(origin_id) = named.origin_id {
                    self.origin_id = origin_id;
                }
                if let Some(origin_slot) = named.origin_slot {
                    self.origin_slot = origin_slot;
                }
                if let Some(target_id) = named.target_id {
                    self.target_id = target_id;
                }
                if let Some(target_slot) = named.target_slot {
                    self.target_slot = target_slot;
                }
            }
        }
    }

    pub fn configure_from_value(&mut self, value: &Value) -> Result<(), GraphError> {
        let data = LinkData::from_value(value)?;
        self.configure(data);
        Ok(())
    }

    /// Canonical positional form, `[id, origin_id, origin_slot, target_id, target_slot, type]`.
    pub fn serialize(&self) -> SerializedLink {
        (
            self.id,
            self.origin_id,
            self.origin_slot,
            self.target_id,
            self.target_slot,
            self.slot_type.clone(),
        )
    }

    pub fn to_named(&self) -> NamedLink {
        NamedLink {
            id: Some(self.id),
            slot_type: Some(self.slot_type.clone()),
            origin_id: Some(self.origin_id),
            origin_slot: Some(self.origin_slot),
            target_id: Some(self.target_id),
            target_slot: Some(self.target_slot),
        }
    }

    pub fn midpoint(&self) -> [f32; 2] {
        self.midpoint
    }

    pub fn set_midpoint(&mut self, pos: [f32; 2]) {
        self.midpoint = pos;
    }
}

impl PartialEq for LinkRecord {
    fn eq(&self, other: &Self) -> bool {
        self.serialize() == other.serialize()
    }
}

impl Eq for LinkRecord {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serialize_puts_type_last() {
        let link = LinkRecord::new(1, "number", 10, 0, 20, 1);
        let encoded = serde_json::to_value(LinkData::from(link.serialize())).unwrap();
        assert_eq!(encoded, json!([1, 10, 0, 20, 1, "number"]));
    }

    #[test]
    fn test_configure_from_ordered_sequence() {
        let mut link = LinkRecord::default();
        link.configure_from_value(&json!([5, 100, 2, 200, 3, "boolean"])).unwrap();

        assert_eq!(link.id, 5);
        assert_eq!(link.origin_id, 100);
        assert_eq!(link.origin_slot, 2);
        assert_eq!(link.target_id, 200);
        assert_eq!(link.target_slot, 3);
        assert_eq!(link.slot_type, "boolean");
    }

    #[test]
    fn test_named_configure_keeps_absent_fields() {
        let mut link = LinkRecord::new(3, "string", 1, 0, 2, 0);
        link.configure_from_value(&json!({ "target_slot": 4, "type": "number" })).unwrap();

        assert_eq!(link.serialize(), (3, 1, 0, 2, 4, "number".to_string()));
    }

    #[test]
    fn test_midpoint_is_not_persisted() {
        let mut link = LinkRecord::new(1, "number", 10, 0, 20, 1);
        let before = link.serialize();
        link.set_midpoint([120.5, -33.0]);

        assert_eq!(link.serialize(), before);
        assert_eq!(link, LinkRecord::new(1, "number", 10, 0, 20, 1));
        assert_eq!(link.midpoint(), [120.5, -33.0]);
    }
}
