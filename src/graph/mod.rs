pub mod document;
pub mod loader;
pub mod runner;

use crate::error::GraphError;
use crate::graph::document::{GraphDocument, LinkFormat, NodeDocument, FORMAT_VERSION};
use crate::link::{LinkData, LinkId, LinkRecord, NodeId, SlotIndex};
use crate::runtime::context::ExecContext;
use crate::runtime::node::{NodeBehavior, PortSpec};
use crate::runtime::registry::NodeRegistry;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// 图中的节点实例
#[derive(Debug)]
pub struct GraphNode {
    pub id: NodeId,
    pub kind: String,
    pub properties: Value,
    pub pos: [f32; 2],
    pub inputs: Vec<PortSpec>,
    pub outputs: Vec<PortSpec>,
    /// Link feeding each input; an input takes at most one link.
    input_links: Vec<Option<LinkId>>,
    /// Last value written on each output.
    output_values: Vec<Option<Value>>,
    behavior: Box<dyn NodeBehavior>,
}

impl GraphNode {
    pub fn input_link(&self, slot: SlotIndex) -> Option<LinkId> {
        self.input_links.get(slot).copied().flatten()
    }
}

/// 节点图：持有全部节点与连线，负责分配 ID、校验槽位、执行顺序与持久化
pub struct Graph {
    id: Uuid,
    registry: Arc<NodeRegistry>,
    nodes: BTreeMap<NodeId, GraphNode>,
    links: BTreeMap<LinkId, LinkRecord>,
    last_node_id: NodeId,
    last_link_id: LinkId,
    iteration: u64,
}

impl Graph {
    pub fn new(registry: Arc<NodeRegistry>) -> Self {
        Self {
            id: Uuid::new_v4(),
            registry,
            nodes: BTreeMap::new(),
            links: BTreeMap::new(),
            last_node_id: 0,
            last_link_id: 0,
            iteration: 0,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    pub fn add_node(&mut self, kind: &str, properties: Value) -> Result<NodeId, GraphError> {
        let id = next_id(self.last_node_id, "node")?;
        self.insert_node(id, kind, properties, [0.0, 0.0])?;
        Ok(id)
    }

    fn insert_node(
        &mut self,
        id: NodeId,
        kind: &str,
        properties: Value,
        pos: [f32; 2],
    ) -> Result<(), GraphError> {
        if self.nodes.contains_key(&id) {
            return Err(GraphError::DuplicateNodeId(id));
        }

        let def = self.registry.get(kind)
            .ok_or_else(|| GraphError::UnknownNodeType(kind.to_string()))?;
        let invalid = |e: anyhow::Error| GraphError::InvalidProperties {
            kind: kind.to_string(),
            reason: e.to_string(),
        };
        def.validate(&properties).map_err(invalid)?;
        let behavior = def.prepare(&properties).map_err(invalid)?;

        let inputs = def.inputs();
        let outputs = def.outputs();
        let node = GraphNode {
            id,
            kind: kind.to_string(),
            properties,
            pos,
            input_links: vec![None; inputs.len()],
            output_values: vec![None; outputs.len()],
            inputs,
            outputs,
            behavior,
        };

        self.nodes.insert(id, node);
        self.last_node_id = self.last_node_id.max(id);
        debug!(node_id = id, node_type = kind, "Node added");
        Ok(())
    }

    /// Appends one of the inputs the node type declares as dynamic.
    pub fn add_dynamic_input(&mut self, node_id: NodeId, name: &str) -> Result<SlotIndex, GraphError> {
        let node = self.nodes.get_mut(&node_id).ok_or(GraphError::NodeNotFound(node_id))?;
        let def = self.registry.get(&node.kind)
            .ok_or_else(|| GraphError::UnknownNodeType(node.kind.clone()))?;

        let port = def.dynamic_inputs().into_iter()
            .find(|p| p.name == name)
            .ok_or_else(|| GraphError::UnknownDynamicInput {
                kind: node.kind.clone(),
                name: name.to_string(),
            })?;

        if node.inputs.iter().any(|p| p.name == port.name) {
            return Err(GraphError::DuplicateInput { node: node_id, name: port.name });
        }

        node.inputs.push(port);
        node.input_links.push(None);
        Ok(node.inputs.len() - 1)
    }

    pub fn remove_node(&mut self, node_id: NodeId) -> Result<(), GraphError> {
        if !self.nodes.contains_key(&node_id) {
            return Err(GraphError::NodeNotFound(node_id));
        }

        let attached: Vec<LinkId> = self.links.values()
            .filter(|l| l.origin_id == node_id || l.target_id == node_id)
            .map(|l| l.id)
            .collect();
        for link_id in attached {
            self.disconnect(link_id)?;
        }

        self.nodes.remove(&node_id);
        Ok(())
    }

    /// Links `origin`'s output `origin_slot` to `target`'s input `target_slot`.
    ///
    /// A link already feeding the target input is replaced.
    pub fn connect(
        &mut self,
        origin_id: NodeId,
        origin_slot: SlotIndex,
        target_id: NodeId,
        target_slot: SlotIndex,
    ) -> Result<LinkId, GraphError> {
        let slot_type = self.check_endpoints(origin_id, origin_slot, target_id, target_slot)?;
        let id = next_id(self.last_link_id, "link")?;
        let link = LinkRecord::new(id, slot_type, origin_id, origin_slot, target_id, target_slot);
        self.attach_link(link)?;
        Ok(id)
    }

    /// Returns the origin output's type when both endpoints exist and are in range.
    fn check_endpoints(
        &self,
        origin_id: NodeId,
        origin_slot: SlotIndex,
        target_id: NodeId,
        target_slot: SlotIndex,
    ) -> Result<String, GraphError> {
        let origin = self.nodes.get(&origin_id).ok_or(GraphError::NodeNotFound(origin_id))?;
        let output = origin.outputs.get(origin_slot).ok_or(GraphError::SlotOutOfRange {
            node: origin_id,
            direction: "output",
            slot: origin_slot,
            count: origin.outputs.len(),
        })?;

        let target = self.nodes.get(&target_id).ok_or(GraphError::NodeNotFound(target_id))?;
        if target_slot >= target.inputs.len() {
            return Err(GraphError::SlotOutOfRange {
                node: target_id,
                direction: "input",
                slot: target_slot,
                count: target.inputs.len(),
            });
        }

        Ok(output.slot_type.clone())
    }

    fn attach_link(&mut self, mut link: LinkRecord) -> Result<(), GraphError> {
        if self.links.contains_key(&link.id) {
            return Err(GraphError::DuplicateLinkId(link.id));
        }

        if let Some(previous) = self.nodes.get(&link.target_id).and_then(|n| n.input_link(link.target_slot)) {
            debug!(link_id = previous, "Replacing link on occupied input");
            self.disconnect(previous)?;
        }

        link.set_midpoint(self.midpoint_between(link.origin_id, link.target_id));
        if let Some(target) = self.nodes.get_mut(&link.target_id) {
            target.input_links[link.target_slot] = Some(link.id);
        }

        self.last_link_id = self.last_link_id.max(link.id);
        debug!(
            link_id = link.id,
            origin_id = link.origin_id,
            origin_slot = link.origin_slot,
            target_id = link.target_id,
            target_slot = link.target_slot,
            "Link added"
        );
        self.links.insert(link.id, link);
        Ok(())
    }

    pub fn disconnect(&mut self, link_id: LinkId) -> Result<LinkRecord, GraphError> {
        let link = self.links.remove(&link_id).ok_or(GraphError::LinkNotFound(link_id))?;
        if let Some(target) = self.nodes.get_mut(&link.target_id) {
            if let Some(slot) = target.input_links.get_mut(link.target_slot) {
                if *slot == Some(link_id) {
                    *slot = None;
                }
            }
        }
        Ok(link)
    }

    pub fn node(&self, id: NodeId) -> Option<&GraphNode> {
        self.nodes.get(&id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.values()
    }

    pub fn link(&self, id: LinkId) -> Option<&LinkRecord> {
        self.links.get(&id)
    }

    pub fn links(&self) -> impl Iterator<Item = &LinkRecord> {
        self.links.values()
    }

    /// Moves a node and recomputes the cached midpoint of every link touching it.
    pub fn set_node_position(&mut self, node_id: NodeId, pos: [f32; 2]) -> Result<(), GraphError> {
        let node = self.nodes.get_mut(&node_id).ok_or(GraphError::NodeNotFound(node_id))?;
        node.pos = pos;

        let touching: Vec<(LinkId, NodeId, NodeId)> = self.links.values()
            .filter(|l| l.origin_id == node_id || l.target_id == node_id)
            .map(|l| (l.id, l.origin_id, l.target_id))
            .collect();
        for (link_id, origin_id, target_id) in touching {
            let midpoint = self.midpoint_between(origin_id, target_id);
            if let Some(link) = self.links.get_mut(&link_id) {
                link.set_midpoint(midpoint);
            }
        }
        Ok(())
    }

    fn midpoint_between(&self, a: NodeId, b: NodeId) -> [f32; 2] {
        match (self.nodes.get(&a), self.nodes.get(&b)) {
            (Some(a), Some(b)) => [(a.pos[0] + b.pos[0]) * 0.5, (a.pos[1] + b.pos[1]) * 0.5],
            _ => [0.0, 0.0],
        }
    }

    /// Data currently delivered to `node`'s input `slot`.
    pub fn input_value(&self, node_id: NodeId, slot: SlotIndex) -> Option<&Value> {
        let link_id = self.nodes.get(&node_id)?.input_link(slot)?;
        let link = self.links.get(&link_id)?;
        self.output_value(link.origin_id, link.origin_slot)
    }

    pub fn output_value(&self, node_id: NodeId, slot: SlotIndex) -> Option<&Value> {
        self.nodes.get(&node_id)?.output_values.get(slot)?.as_ref()
    }

    /// Topological order over links, ties broken by node id.
    pub fn execution_order(&self) -> Result<Vec<NodeId>, GraphError> {
        let mut in_degree: HashMap<NodeId, usize> = self.nodes.keys().map(|&id| (id, 0)).collect();
        let mut adjacency: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        for link in self.links.values() {
            adjacency.entry(link.origin_id).or_default().push(link.target_id);
            if let Some(d) = in_degree.get_mut(&link.target_id) {
                *d += 1;
            }
        }

        let mut ready: BTreeSet<NodeId> = in_degree.iter()
            .filter(|(_, d)| **d == 0)
            .map(|(&id, _)| id)
            .collect();
        let mut order = Vec::with_capacity(self.nodes.len());

        while let Some(id) = ready.pop_first() {
            order.push(id);
            for next in adjacency.get(&id).map(|v| v.as_slice()).unwrap_or(&[]) {
                if let Some(d) = in_degree.get_mut(next) {
                    *d -= 1;
                    if *d == 0 {
                        ready.insert(*next);
                    }
                }
            }
        }

        if order.len() < self.nodes.len() {
            let mut stuck: Vec<NodeId> = in_degree.into_iter()
                .filter(|(_, d)| *d > 0)
                .map(|(id, _)| id)
                .collect();
            stuck.sort_unstable();
            return Err(GraphError::CycleDetected(stuck));
        }
        Ok(order)
    }

    /// Runs one evaluation pass over every node in execution order.
    pub fn run_step(&mut self) -> Result<(), GraphError> {
        let order = self.execution_order()?;

        for id in order {
            let inputs: Vec<Option<Value>> = match self.nodes.get(&id) {
                Some(node) => (0..node.inputs.len())
                    .map(|slot| self.input_value(id, slot).cloned())
                    .collect(),
                None => continue,
            };

            let Some(node) = self.nodes.get_mut(&id) else { continue };
            let GraphNode { behavior, output_values, .. } = node;
            let mut ctx = ExecContext::new(id, &inputs, output_values);
            behavior.execute(&mut ctx)
                .map_err(|source| GraphError::Execution { node: id, source })?;
        }

        self.iteration += 1;
        debug!(iteration = self.iteration, "Evaluation pass finished");
        Ok(())
    }

    pub fn serialize(&self) -> GraphDocument {
        self.serialize_with(LinkFormat::Ordered)
    }

    pub fn serialize_with(&self, format: LinkFormat) -> GraphDocument {
        let nodes = self.nodes.values()
            .map(|n| NodeDocument {
                id: n.id,
                kind: n.kind.clone(),
                pos: n.pos,
                properties: n.properties.clone(),
                inputs: n.inputs.clone(),
            })
            .collect();

        let links = self.links.values()
            .map(|l| match format {
                LinkFormat::Ordered => LinkData::Ordered(l.serialize()),
                LinkFormat::Named => LinkData::Named(l.to_named()),
            })
            .collect();

        GraphDocument {
            id: self.id,
            version: FORMAT_VERSION,
            last_node_id: self.last_node_id,
            last_link_id: self.last_link_id,
            nodes,
            links,
        }
    }

    /// Rebuilds a graph from a document.
    ///
    /// Named links without an `id` get a fresh one, and without a `type` take
    /// the origin output's type. Both endpoints must be present.
    pub fn configure(registry: Arc<NodeRegistry>, document: GraphDocument) -> Result<Self, GraphError> {
        if document.version != FORMAT_VERSION {
            warn!(version = document.version, "Loading graph written by another format version");
        }

        let mut graph = Graph::new(registry);
        graph.id = document.id;

        for node_doc in document.nodes {
            let NodeDocument { id, kind, pos, properties, inputs } = node_doc;
            graph.insert_node(id, &kind, properties, pos)?;

            let declared = graph.nodes.get(&id).map(|n| n.inputs.len()).unwrap_or(0);
            for extra in inputs.iter().skip(declared) {
                graph.add_dynamic_input(id, &extra.name)?;
            }
        }

        let explicit_max = document.links.iter().filter_map(|l| l.id()).max().unwrap_or(0);
        graph.last_link_id = document.last_link_id.max(explicit_max);

        for data in document.links {
            let missing = data.missing_endpoint_fields();
            if !missing.is_empty() {
                return Err(GraphError::MalformedLinkData(format!(
                    "link {:?} is missing {}",
                    data.id(),
                    missing.join(", ")
                )));
            }

            let missing_id = data.id().is_none();
            let missing_type = matches!(&data, LinkData::Named(n) if n.slot_type.is_none());
            let mut link = LinkRecord::from_data(data);
            if missing_id {
                link.id = next_id(graph.last_link_id, "link")?;
            }
            let origin_type = graph.check_endpoints(link.origin_id, link.origin_slot, link.target_id, link.target_slot)?;
            if missing_type {
                link.slot_type = origin_type;
            }
            graph.attach_link(link)?;
        }

        graph.last_node_id = graph.last_node_id.max(document.last_node_id);
        info!(
            graph_id = %graph.id,
            nodes = graph.nodes.len(),
            links = graph.links.len(),
            "Graph configured"
        );
        Ok(graph)
    }
}

fn next_id(last: u64, kind: &'static str) -> Result<u64, GraphError> {
    last.checked_add(1).ok_or(GraphError::IdSpaceExhausted(kind))
}
