use thiserror::Error;

use crate::link::{LinkId, NodeId, SlotIndex};

/// 图与连线操作的错误类型
#[derive(Debug, Error)]
pub enum GraphError {
    /// The raw value is neither the positional nor the named link form.
    #[error("malformed link data: {0}")]
    MalformedLinkData(String),

    #[error("unknown node type: {0}")]
    UnknownNodeType(String),

    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("link not found: {0}")]
    LinkNotFound(LinkId),

    #[error("{direction} slot {slot} out of range on node {node} ({count} slots)")]
    SlotOutOfRange {
        node: NodeId,
        direction: &'static str,
        slot: SlotIndex,
        count: usize,
    },

    #[error("{kind} declares no dynamic input named {name}")]
    UnknownDynamicInput { kind: String, name: String },

    #[error("node {node} already has an input named {name}")]
    DuplicateInput { node: NodeId, name: String },

    #[error("no {0} ids left to assign")]
    IdSpaceExhausted(&'static str),

    #[error("duplicate node id: {0}")]
    DuplicateNodeId(NodeId),

    #[error("duplicate link id: {0}")]
    DuplicateLinkId(LinkId),

    #[error("invalid properties for {kind}: {reason}")]
    InvalidProperties { kind: String, reason: String },

    #[error("cycle detected through nodes {0:?}")]
    CycleDetected(Vec<NodeId>),

    #[error("node {node} failed: {source}")]
    Execution {
        node: NodeId,
        #[source]
        source: anyhow::Error,
    },
}
