use crate::graph::NetworkGraph;
use std::collections::HashMap;
use topoview_core::{Link, Node, NodeId};
use tracing::debug;

/// Maps every node below a collapsed node to its highest collapsed ancestor.
///
/// Nodes whose ancestor chain is fully expanded are not in the map.
pub fn highest_collapsed_ancestors(graph: &NetworkGraph) -> HashMap<NodeId, NodeId> {
    let mut ancestors = HashMap::new();
    for column in graph.columns() {
        map_collapsed(graph, column, &mut ancestors);
    }
    ancestors
}

fn map_collapsed(graph: &NetworkGraph, node: &Node, ancestors: &mut HashMap<NodeId, NodeId>) {
    if graph.is_collapsed(&node.id) {
        for descendant in graph.descendants(&node.id) {
            ancestors.insert(descendant.id.clone(), node.id.clone());
        }
        return;
    }
    for child in graph.children(&node.id) {
        map_collapsed(graph, child, ancestors);
    }
}

/// Adds a `grouped` link for every link that has an endpoint hidden inside a
/// collapsed node.
///
/// The grouped link joins the visible stand-ins of both endpoints. Several
/// real links that collapse onto the same pair yield one grouped link, and
/// two nodes inside the same collapsed node yield a grouped self-link on it.
/// The real links are kept.
pub fn compute_grouped_graph(input: &NetworkGraph) -> NetworkGraph {
    let ancestors = highest_collapsed_ancestors(input);
    let mut grouped = input.clone();

    for link in input.links() {
        let source = ancestors.get(&link.source).unwrap_or(&link.source);
        let target = ancestors.get(&link.target).unwrap_or(&link.target);
        if source == &link.source && target == &link.target {
            continue;
        }
        if !input.contains_node(source) || !input.contains_node(target) {
            debug!("Not grouping link {}: endpoint no longer in graph", link.id);
            continue;
        }
        if grouped.add_link(Link::grouped(source.clone(), target.clone())) {
            debug!("Grouped link {} as {} -> {}", link.id, source, target);
        }
    }

    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use topoview_core::{LinkId, Node};

    fn id(value: &str) -> NodeId {
        NodeId::from(value)
    }

    /// `a` (collapsed) > `a1` > `a11`, `a2`; `b` (expanded) > `b1` (collapsed) > `b11`.
    fn graph() -> NetworkGraph {
        let mut graph = NetworkGraph::new();
        graph.add_column(Node::with_group("a", "A"));
        let mut b = Node::with_group("b", "B");
        b.state.is_expanded = true;
        graph.add_column(b);
        graph.add_child_to_parent(Node::with_group("a1", "A1"), &id("a")).unwrap();
        graph.add_child_to_parent(Node::new("a11"), &id("a1")).unwrap();
        graph.add_child_to_parent(Node::new("a2"), &id("a")).unwrap();
        graph.add_child_to_parent(Node::with_group("b1", "B1"), &id("b")).unwrap();
        graph.add_child_to_parent(Node::new("b11"), &id("b1")).unwrap();
        graph
    }

    #[test]
    fn test_highest_collapsed_ancestor() {
        let ancestors = highest_collapsed_ancestors(&graph());
        // a1 is collapsed too, but a is higher.
        assert_eq!(ancestors.get(&id("a11")), Some(&id("a")));
        assert_eq!(ancestors.get(&id("a1")), Some(&id("a")));
        assert_eq!(ancestors.get(&id("b11")), Some(&id("b1")));
        assert_eq!(ancestors.get(&id("b1")), None);
        assert_eq!(ancestors.get(&id("a")), None);
    }

    #[test]
    fn test_links_into_collapsed_nodes_are_grouped() {
        let mut input = graph();
        input.add_link(Link::new("a11", "b11", "flow"));
        input.add_link(Link::new("a2", "b11", "flow"));
        input.add_link(Link::new("a2", "b11", "other"));

        let grouped = compute_grouped_graph(&input);
        let synthetic: Vec<&Link> = grouped.links().filter(|l| l.is_grouped()).collect();
        assert_eq!(synthetic.len(), 1);
        assert_eq!(synthetic[0].id, LinkId::from("a--b1--grouped"));
        assert!(!synthetic[0].can_select);
        // Real links are still there.
        assert_eq!(grouped.link_count(), 4);
    }

    #[test]
    fn test_visible_endpoint_passes_through() {
        let mut input = graph();
        input.add_link(Link::new("b1", "a11", "flow"));
        let grouped = compute_grouped_graph(&input);
        assert!(grouped.contains_link(&LinkId::from("b1--a--grouped")));
    }

    #[test]
    fn test_links_between_visible_nodes_are_untouched() {
        let mut input = graph();
        input.add_link(Link::new("a", "b1", "flow"));
        let grouped = compute_grouped_graph(&input);
        assert_eq!(grouped.link_count(), 1);
    }

    #[test]
    fn test_link_inside_one_collapsed_node_becomes_self_link() {
        let mut input = graph();
        input.add_link(Link::new("a11", "a2", "flow"));
        let grouped = compute_grouped_graph(&input);
        let link = grouped.link(&LinkId::from("a--a--grouped")).unwrap();
        assert!(link.is_self_link());
    }

    #[test]
    fn test_link_to_missing_node_is_dropped() {
        let mut input = graph();
        input.add_link(Link::new("a11", "ghost", "flow"));
        let grouped = compute_grouped_graph(&input);
        assert_eq!(grouped.links().filter(|l| l.is_grouped()).count(), 0);
    }
}
