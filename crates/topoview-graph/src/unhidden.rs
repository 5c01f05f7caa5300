use crate::graph::NetworkGraph;
use crate::user_state::{NodeUserStateMap, resolve_node_state};
use topoview_core::{Node, NodeId, NodeUserState, NodeUserStateCounts};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct UnhiddenGraph {
    pub graph: NetworkGraph,
    /// `pinned` and `collapsed` count nodes of the emitted tree; `hidden`
    /// counts the hidden nodes the walk reached (not their descendants).
    pub counts: NodeUserStateCounts,
}

/// Copies `input` without hidden nodes and their subtrees.
///
/// Every emitted node carries its resolved pin and expand state. A hidden
/// node stops the walk, so its descendants are dropped whatever their own
/// flags say. Links survive only if both endpoints do.
pub fn compute_unhidden_graph(input: &NetworkGraph, node_states: &NodeUserStateMap) -> UnhiddenGraph {
    let mut unhidden = NetworkGraph::new();
    let mut counts = NodeUserStateCounts::ZERO;
    for column in input.columns() {
        counts += unhide_node(input, column, None, node_states, &mut unhidden);
    }

    for link in input.links() {
        if unhidden.contains_node(&link.source) && unhidden.contains_node(&link.target) {
            unhidden.add_link(link.clone());
        } else {
            debug!("Dropping link {} with a hidden endpoint", link.id);
        }
    }

    UnhiddenGraph {
        graph: unhidden,
        counts,
    }
}

fn unhide_node(
    input: &NetworkGraph,
    node: &Node,
    parent: Option<&NodeId>,
    node_states: &NodeUserStateMap,
    unhidden: &mut NetworkGraph,
) -> NodeUserStateCounts {
    let state = resolve_node_state(node_states, node);
    if state.is_hidden {
        return NodeUserStateCounts {
            hidden: 1,
            ..NodeUserStateCounts::ZERO
        };
    }

    let mut clone = node.clone_without_hierarchy();
    clone.state = NodeUserState {
        is_pinned: state.is_pinned,
        is_expanded: state.is_expanded,
        is_hidden: false,
    };
    let inserted = match parent {
        None => unhidden.add_column(clone),
        Some(parent) => match unhidden.add_child_to_parent(clone, parent) {
            Ok(inserted) => inserted,
            Err(err) => {
                warn!("Skipping node {}: {}", node.id, err);
                false
            }
        },
    };
    if !inserted {
        // Duplicate id in the input; its first occurrence wins.
        return NodeUserStateCounts::ZERO;
    }

    let mut counts = NodeUserStateCounts::ZERO;
    if state.is_pinned {
        counts.pinned += 1;
    }
    for child in input.children(&node.id) {
        counts += unhide_node(input, child, Some(&node.id), node_states, unhidden);
    }
    if unhidden.is_collapsed(&node.id) {
        counts.collapsed += 1;
    }
    counts
}
