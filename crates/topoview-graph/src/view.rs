use crate::graph::NetworkGraph;
use crate::grouping::compute_grouped_graph;
use crate::pinned::compute_pinned_graph;
use crate::unhidden::compute_unhidden_graph;
use crate::user_state::{GraphUserState, LinkUserStateMap, resolve_link_state};
use serde::Serialize;
use topoview_core::NodeUserStateCounts;
use tracing::debug;

/// The graph a renderer draws, derived from a canonical graph and its
/// overlays.
#[derive(Debug, Clone, Serialize)]
pub struct ViewGraph {
    #[serde(skip)]
    pub graph: NetworkGraph,
    pub counts: NodeUserStateCounts,
}

/// Runs the derivation passes in order: drop hidden subtrees, add grouped
/// links if anything is collapsed, restrict to the pinned neighborhood if
/// anything is pinned, then resolve link selection.
///
/// Each pass builds a fresh graph, so `graph` is never touched.
pub fn compute_view_graph(graph: &NetworkGraph, user_state: &GraphUserState) -> ViewGraph {
    let unhidden = compute_unhidden_graph(graph, user_state.node_states());
    let counts = unhidden.counts;
    let mut view = unhidden.graph;

    if counts.collapsed > 0 {
        view = compute_grouped_graph(&view);
    }
    if counts.pinned > 0 {
        view = compute_pinned_graph(&view);
    }
    resolve_link_states(&mut view, user_state.link_states());

    debug!(
        nodes = view.node_count(),
        links = view.link_count(),
        hidden = counts.hidden,
        pinned = counts.pinned,
        collapsed = counts.collapsed,
        "Derived view graph"
    );
    ViewGraph { graph: view, counts }
}

/// Bakes link overlay values into the links of `graph`.
pub fn resolve_link_states(graph: &mut NetworkGraph, link_states: &LinkUserStateMap) {
    for link in graph.links_mut() {
        link.state = resolve_link_state(link_states, link);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::sample_graph;
    use topoview_core::{LinkId, NodeId};

    fn id(value: &str) -> NodeId {
        NodeId::from(value)
    }

    #[test]
    fn test_no_manipulation_matches_input() {
        let input = sample_graph();
        let view = compute_view_graph(&input, &GraphUserState::new());
        assert_eq!(view.graph.node_count(), input.node_count());
        assert_eq!(view.graph.link_count(), input.link_count());
        assert_eq!(view.counts, NodeUserStateCounts::ZERO);
    }

    #[test]
    fn test_collapsed_column_gets_grouped_link() {
        let input = sample_graph();
        let mut user_state = GraphUserState::new();
        user_state.set_node_is_expanded(input.node(&id("node1")).unwrap(), false);

        let view = compute_view_graph(&input, &user_state);
        assert_eq!(view.counts.collapsed, 1);
        assert!(view.graph.contains_link(&LinkId::from("node1--node21--grouped")));
    }

    #[test]
    fn test_pin_restricts_view() {
        let input = sample_graph();
        let mut user_state = GraphUserState::new();
        user_state.set_node_is_pinned(input.node(&id("node11")).unwrap(), true);

        let view = compute_view_graph(&input, &user_state);
        let ids: Vec<&str> = view.graph.nodes().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["node1", "node11", "node2", "node21"]);
        assert_eq!(view.graph.link_count(), 1);
    }

    #[test]
    fn test_selection_is_resolved() {
        let input = sample_graph();
        let mut user_state = GraphUserState::new();
        let link = input.link(&LinkId::from("node1--node2--test")).unwrap();
        user_state.toggle_link_selection(link);

        let view = compute_view_graph(&input, &user_state);
        assert!(view.graph.link(&link.id).unwrap().state.is_selected);
        assert!(!input.link(&link.id).unwrap().state.is_selected);
    }
}
