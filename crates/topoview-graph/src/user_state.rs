//! Sparse user-state overlays.
//!
//! An overlay entry overrides the state baked into a node or link when the
//! graph was loaded; no entry means the baseline value applies. Overlays are
//! never mutated in place: every update, single or bulk, swaps in a new map,
//! so a derivation always sees one consistent snapshot.

use crate::graph::NetworkGraph;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use topoview_core::{
    Link, LinkId, LinkUserState, LinkUserStateCounts, Node, NodeId, NodeUserState,
};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct UserStateMap<K, V> {
    entries: Arc<HashMap<K, V>>,
}

impl<K, V> Default for UserStateMap<K, V> {
    fn default() -> Self {
        Self {
            entries: Arc::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash + Clone, V: Clone> UserStateMap<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter()
    }

    /// New map with one entry set.
    pub fn with(&self, key: K, value: V) -> Self {
        let mut entries = (*self.entries).clone();
        entries.insert(key, value);
        Self {
            entries: Arc::new(entries),
        }
    }

    /// New map with all `changes` applied at once. An empty change set shares
    /// the current map.
    pub fn merged(&self, changes: HashMap<K, V>) -> Self {
        if changes.is_empty() {
            return self.clone();
        }
        let mut entries = (*self.entries).clone();
        entries.extend(changes);
        Self {
            entries: Arc::new(entries),
        }
    }

    /// Both maps are the same snapshot.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }

    pub fn to_hash_map(&self) -> HashMap<K, V> {
        (*self.entries).clone()
    }
}

impl<K: Eq + Hash, V> FromIterator<(K, V)> for UserStateMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: Arc::new(iter.into_iter().collect()),
        }
    }
}

pub type NodeUserStateMap = UserStateMap<NodeId, NodeUserState>;
pub type LinkUserStateMap = UserStateMap<LinkId, LinkUserState>;

/// Overlay value if present, else the node's baseline.
pub fn resolve_node_state(states: &NodeUserStateMap, node: &Node) -> NodeUserState {
    states.get(&node.id).copied().unwrap_or(node.state)
}

/// Overlay value if present, else the link's baseline.
pub fn resolve_link_state(states: &LinkUserStateMap, link: &Link) -> LinkUserState {
    states.get(&link.id).copied().unwrap_or(link.state)
}

/// Node and link overlays of one graph view, with a revision that bumps on
/// every effective change.
#[derive(Debug, Clone, Default)]
pub struct GraphUserState {
    nodes: NodeUserStateMap,
    links: LinkUserStateMap,
    revision: u64,
}

impl GraphUserState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_maps(nodes: NodeUserStateMap, links: LinkUserStateMap) -> Self {
        Self {
            nodes,
            links,
            revision: 0,
        }
    }

    pub fn node_states(&self) -> &NodeUserStateMap {
        &self.nodes
    }

    pub fn link_states(&self) -> &LinkUserStateMap {
        &self.links
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn node_state(&self, node: &Node) -> NodeUserState {
        resolve_node_state(&self.nodes, node)
    }

    pub fn link_state(&self, link: &Link) -> LinkUserState {
        resolve_link_state(&self.links, link)
    }

    pub fn set_node_is_pinned(&mut self, node: &Node, is_pinned: bool) {
        self.update_node(node, |state| state.is_pinned = is_pinned);
    }

    pub fn set_node_is_expanded(&mut self, node: &Node, is_expanded: bool) {
        self.update_node(node, |state| state.is_expanded = is_expanded);
    }

    pub fn set_node_is_hidden(&mut self, node: &Node, is_hidden: bool) {
        self.update_node(node, |state| state.is_hidden = is_hidden);
    }

    pub fn set_link_is_selected(&mut self, link: &Link, is_selected: bool) {
        let mut state = self.link_state(link);
        state.is_selected = is_selected;
        self.links = self.links.with(link.id.clone(), state);
        self.revision += 1;
    }

    pub fn toggle_link_selection(&mut self, link: &Link) {
        let is_selected = self.link_state(link).is_selected;
        self.set_link_is_selected(link, !is_selected);
    }

    // The first touch seeds the entry from the node's baseline, so the
    // other two fields keep their loaded values.
    fn update_node(&mut self, node: &Node, update: impl FnOnce(&mut NodeUserState)) {
        let mut state = self.node_state(node);
        update(&mut state);
        self.nodes = self.nodes.with(node.id.clone(), state);
        self.revision += 1;
    }

    /// Applies `update` to every node of `graph` and swaps in all changed
    /// entries at once. Returns the number of nodes changed.
    fn bulk_update_nodes<F>(&mut self, graph: &NetworkGraph, update: F) -> usize
    where
        F: Fn(NodeUserState) -> Option<NodeUserState>,
    {
        let changes: HashMap<NodeId, NodeUserState> = graph
            .nodes()
            .filter_map(|node| {
                update(self.node_state(node))
                    .filter(|state| *state != self.node_state(node))
                    .map(|state| (node.id.clone(), state))
            })
            .collect();
        let changed = changes.len();
        if changed > 0 {
            self.nodes = self.nodes.merged(changes);
            self.revision += 1;
        }
        changed
    }

    pub fn unhide_nodes(&mut self, graph: &NetworkGraph) -> usize {
        self.bulk_update_nodes(graph, |state| {
            state.is_hidden.then_some(NodeUserState {
                is_hidden: false,
                ..state
            })
        })
    }

    pub fn unpin_nodes(&mut self, graph: &NetworkGraph) -> usize {
        self.bulk_update_nodes(graph, |state| {
            state.is_pinned.then_some(NodeUserState {
                is_pinned: false,
                ..state
            })
        })
    }

    /// Unpins every pinned node and hides it.
    pub fn hide_pinned_nodes(&mut self, graph: &NetworkGraph) -> usize {
        self.bulk_update_nodes(graph, |state| {
            state.is_pinned.then_some(NodeUserState {
                is_pinned: false,
                is_hidden: true,
                ..state
            })
        })
    }

    /// Expands every node that has children.
    pub fn expand_all(&mut self, graph: &NetworkGraph) -> usize {
        self.set_expanded_where_children(graph, true)
    }

    /// Collapses every node that has children.
    pub fn collapse_all(&mut self, graph: &NetworkGraph) -> usize {
        self.set_expanded_where_children(graph, false)
    }

    fn set_expanded_where_children(&mut self, graph: &NetworkGraph, is_expanded: bool) -> usize {
        let changes: HashMap<NodeId, NodeUserState> = graph
            .nodes()
            .filter(|node| node.has_children())
            .map(|node| (node, self.node_state(node)))
            .filter(|(_, state)| state.is_expanded != is_expanded)
            .map(|(node, state)| {
                (
                    node.id.clone(),
                    NodeUserState {
                        is_expanded,
                        ..state
                    },
                )
            })
            .collect();
        let changed = changes.len();
        if changed > 0 {
            self.nodes = self.nodes.merged(changes);
            self.revision += 1;
        }
        changed
    }

    /// Drops both overlays; every node and link falls back to its baseline.
    pub fn clear(&mut self) {
        self.nodes = NodeUserStateMap::new();
        self.links = LinkUserStateMap::new();
        self.revision += 1;
    }

    /// Pins the first child of column `column_index` that is neither hidden
    /// nor pinned. If that child has children, its first leaf (following
    /// first children) is pinned instead. Returns the pinned node.
    pub fn pin_first_node_in_column(
        &mut self,
        graph: &NetworkGraph,
        column_index: usize,
    ) -> Option<NodeId> {
        let column = graph.column_ids().get(column_index)?;
        // Only the column's immediate children are searched.
        let candidate = graph.children(column).find(|node| {
            let state = self.node_state(node);
            !state.is_hidden && !state.is_pinned
        })?;

        let mut target = candidate;
        while let Some(first) = graph.children(&target.id).next() {
            target = first;
        }
        let target = target.clone();
        debug!("Pinning first node {} of column {}", target.id, column_index);
        self.set_node_is_pinned(&target, true);
        Some(target.id)
    }

    pub fn link_user_state_counts(&self, graph: &NetworkGraph) -> LinkUserStateCounts {
        graph
            .links()
            .fold(LinkUserStateCounts::ZERO, |counts, link| {
                counts
                    + LinkUserStateCounts {
                        selected: usize::from(self.link_state(link).is_selected),
                        total: 1,
                    }
            })
    }

    pub fn is_no_link_selected(&self, graph: &NetworkGraph) -> bool {
        self.link_user_state_counts(graph).selected == 0
    }

    pub fn is_few_links_selected(&self, graph: &NetworkGraph) -> bool {
        let counts = self.link_user_state_counts(graph);
        0 < counts.selected && counts.selected < counts.total
    }

    pub fn is_all_links_selected(&self, graph: &NetworkGraph) -> bool {
        let counts = self.link_user_state_counts(graph);
        counts.selected > 0 && counts.selected == counts.total
    }
}
