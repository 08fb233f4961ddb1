use std::fmt;

use serde::de::value::MapAccessDeserializer;
use serde::de::{self, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use super::{LinkId, NodeId, SlotIndex, SlotType};
use crate::error::GraphError;

/// 紧凑的位置编码：`[id, origin_id, origin_slot, target_id, target_slot, type]`
///
/// The type tag is the LAST element here.
pub type SerializedLink = (LinkId, NodeId, SlotIndex, NodeId, SlotIndex, SlotType);

const ORDERED_LEN: usize = 6;

/// 按字段名编码的连线
///
/// Every field is optional so that documents written by other schema versions
/// can be merged onto an existing record. Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedLink {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<LinkId>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub slot_type: Option<SlotType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_id: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_slot: Option<SlotIndex>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_slot: Option<SlotIndex>,
}

/// One link as it appears in a graph document.
///
/// Which variant applies is decided by the decoder from the input shape:
/// sequences are `Ordered`, maps are `Named`. Nothing else is accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkData {
    Ordered(SerializedLink),
    Named(NamedLink),
}

impl LinkData {
    /// Decodes a raw JSON value, rejecting anything that fits neither form.
    pub fn from_value(value: &Value) -> Result<Self, GraphError> {
        LinkData::deserialize(value).map_err(|e| GraphError::MalformedLinkData(e.to_string()))
    }

    /// Names of the endpoint fields a named link leaves out.
    pub fn missing_endpoint_fields(&self) -> Vec<&'static str> {
        let LinkData::Named(n) = self else { return Vec::new() };
        [
            ("origin_id", n.origin_id.is_none()),
            ("origin_slot", n.origin_slot.is_none()),
            ("target_id", n.target_id.is_none()),
            ("target_slot", n.target_slot.is_none()),
        ]
        .into_iter()
        .filter(|(_, absent)| *absent)
        .map(|(name, _)| name)
        .collect()
    }

    pub fn id(&self) -> Option<LinkId> {
        match self {
            LinkData::Ordered(t) => Some(t.0),
            LinkData::Named(n) => n.id,
        }
    }
}

impl From<SerializedLink> for LinkData {
    fn from(value: SerializedLink) -> Self {
        LinkData::Ordered(value)
    }
}

impl From<NamedLink> for LinkData {
    fn from(value: NamedLink) -> Self {
        LinkData::Named(value)
    }
}

impl Serialize for LinkData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            LinkData::Ordered(t) => t.serialize(serializer),
            LinkData::Named(n) => n.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for LinkData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(LinkDataVisitor)
    }
}

struct LinkDataVisitor;

impl<'de> Visitor<'de> for LinkDataVisitor {
    type Value = LinkData;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(
            "a link as [id, origin_id, origin_slot, target_id, target_slot, type] or as an object",
        )
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<LinkData, A::Error> {
        let id = next_field(&mut seq, 0)?;
        let origin_id = next_field(&mut seq, 1)?;
        let origin_slot = next_field(&mut seq, 2)?;
        let target_id = next_field(&mut seq, 3)?;
        let target_slot = next_field(&mut seq, 4)?;
        let slot_type = next_field(&mut seq, 5)?;

        let mut extra = 0;
        while seq.next_element::<IgnoredAny>()?.is_some() {
            extra += 1;
        }
        if extra > 0 {
            return Err(de::Error::invalid_length(ORDERED_LEN + extra, &self));
        }

        Ok(LinkData::Ordered((
            id,
            origin_id,
            origin_slot,
            target_id,
            target_slot,
            slot_type,
        )))
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<LinkData, A::Error> {
        NamedLink::deserialize(MapAccessDeserializer::new(map)).map(LinkData::Named)
    }
}

fn next_field<'de, A, T>(seq: &mut A, index: usize) -> Result<T, A::Error>
where
    A: SeqAccess<'de>,
    T: Deserialize<'de>,
{
    seq.next_element()?
        .ok_or_else(|| de::Error::invalid_length(index, &LinkDataVisitor))
}
