//! Authoritative node and link collections
//!
//! Nodes live in an arena and are addressed by [`NodeIndex`]. Indices stay valid
//! until the next [`GraphModel::load`]: merge only ever appends, so a link never
//! outlives the nodes it points at.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::debug;

use crate::error::{GraphError, GraphResult};
use crate::geometry::Vec2;
use crate::graph_types::{LinkData, NodeData, Status};
use crate::shapes::{NodeShape, ShapeTable};

/// Handle to a node owned by a [`GraphModel`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeIndex(usize);

impl NodeIndex {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Handle to a link owned by a [`GraphModel`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct LinkIndex(usize);

impl LinkIndex {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A graph vertex with its layout state
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    /// Opaque type tag
    pub node_type: String,
    /// Display label
    pub name: String,
    pub status: Status,
    /// Newly arrived in the latest merge
    pub highlighted: bool,
    pub is_focus: bool,
    /// Written only by the force simulation
    pub position: Vec2,
    pub velocity: Vec2,
    /// Whether the simulation has given this node an initial position
    pub(crate) placed: bool,
}

impl Node {
    fn from_data(data: NodeData, status: Status, highlighted: bool) -> Self {
        let name = data.name.unwrap_or_else(|| data.node_type.clone());
        Self {
            id: data.id,
            node_type: data.node_type,
            name,
            status,
            highlighted,
            is_focus: data.focus,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            placed: false,
        }
    }

    /// Tooltip text: name, type and status on separate lines
    pub fn summary(&self) -> String {
        format!(
            "Name: {}\nType: {}\nStatus: {}",
            self.name, self.node_type, self.status
        )
    }
}

/// A directed edge between two nodes of the same model
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub source: NodeIndex,
    pub target: NodeIndex,
    pub link_type: String,
    /// Target status at the time the link was created
    pub status: Status,
    /// Stands in for one or more elided edges between the same pair
    pub is_compressed: bool,
}

/// A link together with its resolved endpoints
#[derive(Debug, Clone, Copy)]
pub struct LinkView<'a> {
    pub index: LinkIndex,
    pub link: &'a Link,
    pub source: &'a Node,
    pub target: &'a Node,
}

impl LinkView<'_> {
    /// Tooltip text: endpoint names and link type on separate lines
    pub fn summary(&self) -> String {
        format!(
            "Source: {}\nTarget: {}\nType: {}",
            self.source.name, self.target.name, self.link.link_type
        )
    }
}

/// Links touching a node, partitioned by direction and compression
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeLinks {
    pub incoming: Vec<LinkIndex>,
    pub outgoing: Vec<LinkIndex>,
    /// Compressed links in either direction
    pub compressed: Vec<LinkIndex>,
}

impl NodeLinks {
    pub fn len(&self) -> usize {
        self.incoming.len() + self.outgoing.len() + self.compressed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Default)]
pub struct GraphModel {
    nodes: Vec<Node>,
    links: Vec<Link>,
    by_id: HashMap<String, NodeIndex>,
}

impl GraphModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole graph
    ///
    /// Returns the node flagged as focus in the input, if any. When several nodes
    /// carry the flag only the last one keeps it. Nothing changes on error.
    pub fn load(
        &mut self,
        nodes: Vec<NodeData>,
        links: Vec<LinkData>,
    ) -> GraphResult<Option<NodeIndex>> {
        let seen = unique_ids(&nodes)?;
        let statuses = parse_statuses(&nodes)?;
        check_endpoints(&links, |id| seen.contains(id))?;

        self.nodes.clear();
        self.links.clear();
        self.by_id.clear();

        let mut focus = None;
        for (data, status) in nodes.into_iter().zip(statuses) {
            let index = NodeIndex(self.nodes.len());
            let node = Node::from_data(data, status, false);
            if node.is_focus {
                if let Some(previous) = focus.replace(index) {
                    self.nodes[previous.0].is_focus = false;
                }
            }
            self.by_id.insert(node.id.clone(), index);
            self.nodes.push(node);
        }

        for link in links {
            self.push_link(link);
        }

        debug!(
            nodes = self.nodes.len(),
            links = self.links.len(),
            focus = focus.map(|f| self.nodes[f.0].id.as_str()),
            "loaded graph"
        );
        Ok(focus)
    }

    /// Add new nodes and links without touching existing nodes
    ///
    /// Existing nodes lose their highlight, genuinely new ids are inserted highlighted,
    /// colliding ids are ignored. Every incoming link is appended. Focus flags in the
    /// incoming data are ignored; focus only moves through the selection controller.
    /// Returns the inserted nodes. Nothing changes on error.
    pub fn merge(
        &mut self,
        nodes: Vec<NodeData>,
        links: Vec<LinkData>,
    ) -> GraphResult<Vec<NodeIndex>> {
        let statuses = parse_statuses(&nodes)?;
        {
            let incoming = unique_ids(&nodes)?;
            check_endpoints(&links, |id| {
                self.by_id.contains_key(id) || incoming.contains(id)
            })?;
        }

        for node in &mut self.nodes {
            node.highlighted = false;
        }

        let mut inserted = Vec::new();
        for (data, status) in nodes.into_iter().zip(statuses) {
            if self.by_id.contains_key(&data.id) {
                continue;
            }
            let index = NodeIndex(self.nodes.len());
            let mut node = Node::from_data(data, status, true);
            node.is_focus = false;
            self.by_id.insert(node.id.clone(), index);
            self.nodes.push(node);
            inserted.push(index);
        }

        let link_count = links.len();
        for link in links {
            self.push_link(link);
        }

        debug!(
            inserted = inserted.len(),
            links_added = link_count,
            nodes = self.nodes.len(),
            "merged graph data"
        );
        Ok(inserted)
    }

    /// Endpoints must already be validated
    fn push_link(&mut self, data: LinkData) {
        let source = self.by_id[&data.source];
        let target = self.by_id[&data.target];
        self.links.push(Link {
            source,
            target,
            status: self.nodes[target.0].status,
            link_type: data.link_type,
            is_compressed: data.is_compressed,
        });
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Node> {
        self.index_of(id).map(|index| &self.nodes[index.0])
    }

    pub fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.by_id.get(id).copied()
    }

    pub fn node(&self, index: NodeIndex) -> Option<&Node> {
        self.nodes.get(index.0)
    }

    pub fn link(&self, index: LinkIndex) -> Option<&Link> {
        self.links.get(index.0)
    }

    /// Resolve a link's endpoints
    pub fn link_view(&self, index: LinkIndex) -> Option<LinkView<'_>> {
        let link = self.links.get(index.0)?;
        Some(LinkView {
            index,
            link,
            source: &self.nodes[link.source.0],
            target: &self.nodes[link.target.0],
        })
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn link_views(&self) -> impl Iterator<Item = LinkView<'_>> {
        (0..self.links.len()).filter_map(|i| self.link_view(LinkIndex(i)))
    }

    /// Node arena for the simulation, links read-only
    pub(crate) fn layout_parts(&mut self) -> (&mut [Node], &[Link]) {
        (&mut self.nodes, &self.links)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Partition the links touching `node_id`
    ///
    /// Compressed links are reported only under `compressed`; the rest are outgoing
    /// when the node is the source (self-loops included) and incoming otherwise.
    pub fn links_of(&self, node_id: &str) -> NodeLinks {
        let mut result = NodeLinks::default();
        let Some(node) = self.index_of(node_id) else {
            return result;
        };

        for (i, link) in self.links.iter().enumerate() {
            let index = LinkIndex(i);
            if link.source != node && link.target != node {
                continue;
            }
            if link.is_compressed {
                result.compressed.push(index);
            } else if link.source == node {
                result.outgoing.push(index);
            } else {
                result.incoming.push(index);
            }
        }
        result
    }

    pub fn nodes_by_status(&self, status: Status) -> Vec<&Node> {
        self.nodes.iter().filter(|n| n.status == status).collect()
    }

    pub fn highlighted_nodes(&self) -> Vec<&Node> {
        self.nodes.iter().filter(|n| n.highlighted).collect()
    }

    pub fn focus_node(&self) -> Option<&Node> {
        self.nodes.iter().find(|n| n.is_focus)
    }

    pub fn nodes_of_shape(&self, shape: NodeShape, table: &ShapeTable) -> Vec<&Node> {
        self.nodes
            .iter()
            .filter(|n| table.shape_of(&n.node_type) == shape)
            .collect()
    }

    /// Move the focus flag to `index` (or clear it). Returns the previous holder.
    pub(crate) fn mark_focus(&mut self, index: Option<NodeIndex>) -> Option<NodeIndex> {
        let mut previous = None;
        for (i, node) in self.nodes.iter_mut().enumerate() {
            if node.is_focus {
                node.is_focus = false;
                previous = Some(NodeIndex(i));
            }
        }
        if let Some(node) = index.and_then(|i| self.nodes.get_mut(i.0)) {
            node.is_focus = true;
        }
        previous
    }

    #[cfg(test)]
    pub(crate) fn node_mut(&mut self, index: NodeIndex) -> &mut Node {
        &mut self.nodes[index.0]
    }
}

/// Ids of one batch; a repeated id is a validation error
fn unique_ids(nodes: &[NodeData]) -> GraphResult<HashSet<&str>> {
    let mut seen = HashSet::with_capacity(nodes.len());
    for node in nodes {
        if !seen.insert(node.id.as_str()) {
            return Err(GraphError::validation(format!(
                "duplicate node id '{}'",
                node.id
            )));
        }
    }
    Ok(seen)
}

fn parse_statuses(nodes: &[NodeData]) -> GraphResult<Vec<Status>> {
    nodes.iter().map(NodeData::parsed_status).collect()
}

fn check_endpoints(links: &[LinkData], known: impl Fn(&str) -> bool) -> GraphResult<()> {
    for link in links {
        for endpoint in [&link.source, &link.target] {
            if !known(endpoint) {
                return Err(GraphError::validation(format!(
                    "link {} -> {} references unknown node '{endpoint}'",
                    link.source, link.target
                )));
            }
        }
    }
    Ok(())
}
