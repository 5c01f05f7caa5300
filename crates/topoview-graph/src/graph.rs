use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::ops::Index;
use topoview_core::{GraphError, Link, LinkId, Node, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeIndex(pub usize);

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LinkIndex(pub usize);

impl fmt::Display for LinkIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A forest of node trees with a set of links layered on top.
///
/// Nodes live in an arena in insertion order and refer to each other by id,
/// so cloning a graph never aliases the nodes of the original. Insertion is
/// idempotent: adding an entity whose id is already present is a no-op that
/// returns `false`.
#[derive(Debug, Clone, Default)]
pub struct NetworkGraph {
    nodes: Vec<Node>,
    links: Vec<Link>,
    columns: Vec<NodeId>,
    node_map: HashMap<NodeId, NodeIndex>,
    link_map: HashMap<LinkId, LinkIndex>,
}

impl NetworkGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a top-level node. The column enters without parent or children.
    pub fn add_column(&mut self, mut column: Node) -> bool {
        if self.contains_node(&column.id) {
            return false;
        }
        column.parent = None;
        if let Some(group) = column.group.as_mut() {
            group.children.clear();
        }
        self.columns.push(column.id.clone());
        self.push_node(column);
        true
    }

    /// Adds a node to the id index without touching any hierarchy.
    ///
    /// Use [`NetworkGraph::add_child_to_parent`] to keep parent and child
    /// lists consistent.
    pub fn add_node(&mut self, node: Node) -> bool {
        if self.contains_node(&node.id) {
            return false;
        }
        self.push_node(node);
        true
    }

    /// Adds `child` under `parent`, setting the back-reference and appending
    /// it to the parent's children. The child enters without children of its
    /// own. Returns `Ok(false)` if the child id already exists.
    pub fn add_child_to_parent(&mut self, mut child: Node, parent: &NodeId) -> Result<bool, GraphError> {
        let parent_idx = *self
            .node_map
            .get(parent)
            .ok_or_else(|| GraphError::UnknownParent(parent.clone()))?;
        if self.nodes[parent_idx.0].group.is_none() {
            return Err(GraphError::ParentIsLeaf(parent.clone()));
        }
        if self.contains_node(&child.id) {
            return Ok(false);
        }

        child.parent = Some(parent.clone());
        if let Some(group) = child.group.as_mut() {
            group.children.clear();
        }
        if let Some(group) = self.nodes[parent_idx.0].group.as_mut() {
            group.children.push(child.id.clone());
        }
        self.push_node(child);
        Ok(true)
    }

    pub fn add_link(&mut self, link: Link) -> bool {
        if self.link_map.contains_key(&link.id) {
            return false;
        }
        let idx = LinkIndex(self.links.len());
        self.link_map.insert(link.id.clone(), idx);
        self.links.push(link);
        true
    }

    fn push_node(&mut self, node: Node) {
        let idx = NodeIndex(self.nodes.len());
        self.node_map.insert(node.id.clone(), idx);
        self.nodes.push(node);
    }

    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.node_map.contains_key(id)
    }

    pub fn contains_link(&self, id: &LinkId) -> bool {
        self.link_map.contains_key(id)
    }

    pub fn node_index(&self, id: &NodeId) -> Option<NodeIndex> {
        self.node_map.get(id).copied()
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.node_map.get(id).map(|&idx| &self.nodes[idx.0])
    }

    /// Like [`NetworkGraph::node`], for callers that treat a miss as an error.
    pub fn try_node(&self, id: &NodeId) -> Result<&Node, GraphError> {
        self.node(id).ok_or_else(|| GraphError::UnknownNode(id.clone()))
    }

    pub fn link(&self, id: &LinkId) -> Option<&Link> {
        self.link_map.get(id).map(|&idx| &self.links[idx.0])
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

    pub fn column_ids(&self) -> &[NodeId] {
        &self.columns
    }

    pub fn columns(&self) -> impl Iterator<Item = &Node> {
        self.columns.iter().filter_map(move |id| self.node(id))
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// All links in insertion order.
    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.links.iter()
    }

    pub fn links_mut(&mut self) -> impl Iterator<Item = &mut Link> {
        self.links.iter_mut()
    }

    pub fn children(&self, id: &NodeId) -> impl Iterator<Item = &Node> {
        self.node(id)
            .map(|node| node.children())
            .unwrap_or(&[])
            .iter()
            .filter_map(move |child| self.node(child))
    }

    pub fn parent(&self, id: &NodeId) -> Option<&Node> {
        self.node(id)
            .and_then(|node| node.parent.as_ref())
            .and_then(|parent| self.node(parent))
    }

    /// Ancestors of a node, nearest first, ending with its column.
    pub fn ancestors(&self, id: &NodeId) -> Vec<&Node> {
        let mut ancestors = Vec::new();
        let mut current = self.parent(id);
        while let Some(node) = current {
            // A parent cycle can only come from a hand-built inconsistent graph.
            if ancestors.len() > self.nodes.len() {
                tracing::warn!("Parent cycle detected above node {}", id);
                break;
            }
            ancestors.push(node);
            current = self.parent(&node.id);
        }
        ancestors
    }

    /// Descendants of a node in pre-order, excluding the node itself.
    pub fn descendants(&self, id: &NodeId) -> Vec<&Node> {
        let mut descendants = Vec::new();
        let mut stack: Vec<&Node> = self.children(id).collect();
        stack.reverse();
        while let Some(node) = stack.pop() {
            if descendants.len() > self.nodes.len() {
                tracing::warn!("Child cycle detected below node {}", id);
                break;
            }
            descendants.push(node);
            let first = stack.len();
            stack.extend(self.children(&node.id));
            stack[first..].reverse();
        }
        descendants
    }

    /// A node with children whose `is_expanded` is false.
    pub fn is_collapsed(&self, id: &NodeId) -> bool {
        self.node(id)
            .is_some_and(|node| node.has_children() && !node.state.is_expanded)
    }

    /// Sorts columns and every child list with `compare`.
    pub fn sort_nodes<F>(&mut self, mut compare: F)
    where
        F: FnMut(&Node, &Node) -> Ordering,
    {
        let mut columns = std::mem::take(&mut self.columns);
        columns.sort_by(|a, b| self.compare_ids(a, b, &mut compare));
        self.columns = columns;

        for idx in 0..self.nodes.len() {
            let Some(group) = self.nodes[idx].group.as_mut() else {
                continue;
            };
            let mut children = std::mem::take(&mut group.children);
            children.sort_by(|a, b| self.compare_ids(a, b, &mut compare));
            if let Some(group) = self.nodes[idx].group.as_mut() {
                group.children = children;
            }
        }
    }

    fn compare_ids<F>(&self, a: &NodeId, b: &NodeId, compare: &mut F) -> Ordering
    where
        F: FnMut(&Node, &Node) -> Ordering,
    {
        match (self.node(a), self.node(b)) {
            (Some(a), Some(b)) => compare(a, b),
            _ => Ordering::Equal,
        }
    }

    /// Sorts the children of one parent by id.
    pub fn sort_children_by_id(&mut self, parent: &NodeId) {
        let Some(idx) = self.node_index(parent) else {
            return;
        };
        if let Some(group) = self.nodes[idx.0].group.as_mut() {
            group.children.sort();
        }
    }

    pub fn sort_links<F>(&mut self, compare: F)
    where
        F: FnMut(&Link, &Link) -> Ordering,
    {
        self.links.sort_by(compare);
        self.link_map = self
            .links
            .iter()
            .enumerate()
            .map(|(idx, link)| (link.id.clone(), LinkIndex(idx)))
            .collect();
    }

    /// Orders columns and siblings the way `reference` orders them.
    ///
    /// Nodes unknown to `reference` keep their relative order after the known
    /// ones.
    pub fn align_order_with(&mut self, reference: &NetworkGraph) {
        let mut positions: HashMap<&NodeId, usize> = HashMap::new();
        for (pos, id) in reference.column_ids().iter().enumerate() {
            positions.insert(id, pos);
        }
        for node in reference.nodes() {
            for (pos, child) in node.children().iter().enumerate() {
                positions.insert(child, pos);
            }
        }
        let key = |node: &Node| positions.get(&node.id).copied().unwrap_or(usize::MAX);
        self.sort_nodes(|a, b| key(a).cmp(&key(b)));
    }
}

impl Index<NodeIndex> for NetworkGraph {
    type Output = Node;
    fn index(&self, index: NodeIndex) -> &Self::Output {
        &self.nodes[index.0]
    }
}

impl Index<LinkIndex> for NetworkGraph {
    type Output = Link;
    fn index(&self, index: LinkIndex) -> &Self::Output {
        &self.links[index.0]
    }
}
