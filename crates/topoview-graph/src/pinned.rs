use crate::graph::NetworkGraph;
use std::collections::HashMap;
use topoview_core::{Link, Node, NodeId};
use tracing::{debug, warn};

/// A node picked by the tree pass, with the children picked below it.
struct Selection {
    node: Node,
    children: Vec<Selection>,
}

/// Restricts `input` to its pinned neighborhood.
///
/// Tree pass: a node is kept if it is pinned or keeps a child. A pinned node
/// none of whose immediate children is pinned reveals the full subtree of
/// every child. Link pass: a link is kept if either endpoint is pinned in
/// `input`; both endpoints are then pulled in along with their ancestors.
///
/// Pin state is read from the nodes themselves, so `input` is expected to
/// carry resolved state (the output of the unhidden pass).
pub fn compute_pinned_graph(input: &NetworkGraph) -> NetworkGraph {
    let mut pinned = NetworkGraph::new();
    for column in input.columns() {
        if let Some(selection) = select_pinned(input, column) {
            insert_selection(&mut pinned, selection, None);
        }
    }

    for link in input.links() {
        if !is_link_end_pinned(input, link) {
            continue;
        }
        pinned.add_link(link.clone());
        ensure_node_and_ancestors(input, &mut pinned, &link.source);
        ensure_node_and_ancestors(input, &mut pinned, &link.target);
    }

    // Ancestors pulled in by links were appended; restore input order.
    pinned.align_order_with(input);
    pinned
}

fn select_pinned(input: &NetworkGraph, node: &Node) -> Option<Selection> {
    let is_pinned = node.state.is_pinned;
    let mut children: Vec<Selection> = input
        .children(&node.id)
        .filter_map(|child| select_pinned(input, child))
        .collect();

    if is_pinned && !input.children(&node.id).any(|child| child.state.is_pinned) {
        // Children already picked keep their partial selection.
        let mut picked: HashMap<NodeId, Selection> = children
            .drain(..)
            .map(|selection| (selection.node.id.clone(), selection))
            .collect();
        children = input
            .children(&node.id)
            .map(|child| {
                picked
                    .remove(&child.id)
                    .unwrap_or_else(|| full_subtree(input, child))
            })
            .collect();
    }

    if !is_pinned && children.is_empty() {
        return None;
    }
    Some(Selection {
        node: node.clone_without_hierarchy(),
        children,
    })
}

fn full_subtree(input: &NetworkGraph, node: &Node) -> Selection {
    Selection {
        node: node.clone_without_hierarchy(),
        children: input
            .children(&node.id)
            .map(|child| full_subtree(input, child))
            .collect(),
    }
}

fn insert_selection(pinned: &mut NetworkGraph, selection: Selection, parent: Option<&NodeId>) {
    let id = selection.node.id.clone();
    let inserted = match parent {
        None => pinned.add_column(selection.node),
        Some(parent) => match pinned.add_child_to_parent(selection.node, parent) {
            Ok(inserted) => inserted,
            Err(err) => {
                warn!("Skipping pinned node {}: {}", id, err);
                false
            }
        },
    };
    if !inserted {
        return;
    }
    for child in selection.children {
        insert_selection(pinned, child, Some(&id));
    }
}

fn is_link_end_pinned(input: &NetworkGraph, link: &Link) -> bool {
    let is_pinned = |id: &NodeId| input.node(id).is_some_and(|node| node.state.is_pinned);
    is_pinned(&link.source) || is_pinned(&link.target)
}

/// Inserts `id` and every missing ancestor, top-down. Ancestors enter
/// without children; only the chain leading to `id` is attached.
fn ensure_node_and_ancestors(input: &NetworkGraph, pinned: &mut NetworkGraph, id: &NodeId) {
    if pinned.contains_node(id) {
        return;
    }
    let Some(node) = input.node(id) else {
        debug!("Link endpoint {} is not in the graph", id);
        return;
    };

    let mut missing = vec![node];
    let mut anchor: Option<NodeId> = None;
    for ancestor in input.ancestors(id) {
        if pinned.contains_node(&ancestor.id) {
            anchor = Some(ancestor.id.clone());
            break;
        }
        missing.push(ancestor);
    }

    for node in missing.into_iter().rev() {
        let clone = node.clone_without_hierarchy();
        let clone_id = clone.id.clone();
        match &anchor {
            None => {
                pinned.add_column(clone);
            }
            Some(parent) => {
                if let Err(err) = pinned.add_child_to_parent(clone, parent) {
                    warn!("Cannot attach {} under {}: {}", clone_id, parent, err);
                    return;
                }
            }
        }
        anchor = Some(clone_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use topoview_core::LinkId;

    fn id(value: &str) -> NodeId {
        NodeId::from(value)
    }

    fn ids<'a>(nodes: impl IntoIterator<Item = &'a Node>) -> Vec<&'a str> {
        nodes.into_iter().map(|n| n.id.as_str()).collect()
    }

    /// Bakes a pin into the graph, the way the unhidden pass hands state over.
    fn pin(graph: &mut NetworkGraph, node: &str) {
        let mut copy = NetworkGraph::new();
        for column in graph.columns() {
            copy_with_pin(graph, column, None, node, &mut copy);
        }
        for link in graph.links() {
            copy.add_link(link.clone());
        }
        *graph = copy;
    }

    fn copy_with_pin(
        graph: &NetworkGraph,
        node: &Node,
        parent: Option<&NodeId>,
        pinned: &str,
        copy: &mut NetworkGraph,
    ) {
        let mut clone = node.clone_without_hierarchy();
        if clone.id.as_str() == pinned {
            clone.state.is_pinned = true;
        }
        match parent {
            None => {
                copy.add_column(clone);
            }
            Some(parent) => {
                copy.add_child_to_parent(clone, parent).unwrap();
            }
        }
        for child in graph.children(&node.id) {
            copy_with_pin(graph, child, Some(&node.id), pinned, copy);
        }
    }

    /// ```text
    /// a > a1 > a11, a12
    ///   > a2
    /// b > b1 > b11
    /// c > c1
    /// ```
    fn graph() -> NetworkGraph {
        let mut graph = NetworkGraph::new();
        for column in ["a", "b", "c"] {
            graph.add_column(Node::with_group(column, column));
        }
        for (child, parent, group) in [
            ("a1", "a", true),
            ("a11", "a1", false),
            ("a12", "a1", false),
            ("a2", "a", false),
            ("b1", "b", true),
            ("b11", "b1", false),
            ("c1", "c", false),
        ] {
            let node = if group {
                Node::with_group(child, child)
            } else {
                Node::new(child)
            };
            graph.add_child_to_parent(node, &id(parent)).unwrap();
        }
        graph
    }

    #[test]
    fn test_pinned_leaf_keeps_ancestor_chain_only() {
        let mut input = graph();
        pin(&mut input, "a11");
        let pinned = compute_pinned_graph(&input);
        assert_eq!(ids(pinned.nodes()), vec!["a", "a1", "a11"]);
        assert_eq!(ids(pinned.columns()), vec!["a"]);
    }

    #[test]
    fn test_pinned_parent_reveals_full_subtrees() {
        let mut input = graph();
        pin(&mut input, "a");
        let pinned = compute_pinned_graph(&input);
        assert_eq!(ids(pinned.nodes()), vec!["a", "a1", "a11", "a12", "a2"]);
        assert!(!pinned.contains_node(&id("b")));
    }

    #[test]
    fn test_pinned_child_suppresses_reveal() {
        let mut input = graph();
        pin(&mut input, "a");
        pin(&mut input, "a2");
        let pinned = compute_pinned_graph(&input);
        // a2 is pinned, so a does not reveal a1's subtree.
        assert_eq!(ids(pinned.nodes()), vec!["a", "a2"]);
    }

    #[test]
    fn test_partial_selection_survives_reveal() {
        let mut input = graph();
        pin(&mut input, "a");
        pin(&mut input, "a11");
        let pinned = compute_pinned_graph(&input);
        // a's immediate children are unpinned, so a reveals a2 in full while
        // a1 keeps only its pinned branch.
        assert_eq!(ids(pinned.children(&id("a"))), vec!["a1", "a2"]);
        assert_eq!(ids(pinned.children(&id("a1"))), vec!["a11"]);
    }

    #[test]
    fn test_links_pull_in_other_end_with_ancestors() {
        let mut input = graph();
        input.add_link(Link::new("a11", "b11", "flow"));
        input.add_link(Link::new("b11", "c1", "flow"));
        pin(&mut input, "a11");

        let pinned = compute_pinned_graph(&input);
        assert!(pinned.contains_link(&LinkId::from("a11--b11--flow")));
        assert!(!pinned.contains_link(&LinkId::from("b11--c1--flow")));
        assert_eq!(ids(pinned.columns()), vec!["a", "b"]);
        assert_eq!(ids(pinned.children(&id("b"))), vec!["b1"]);
        assert_eq!(ids(pinned.children(&id("b1"))), vec!["b11"]);
        assert!(!pinned.contains_node(&id("c")));
    }

    #[test]
    fn test_ancestor_columns_follow_input_order() {
        let mut input = graph();
        input.add_link(Link::new("c1", "a2", "flow"));
        pin(&mut input, "c1");

        let pinned = compute_pinned_graph(&input);
        // `a` was pulled in after `c` but renders first.
        assert_eq!(ids(pinned.columns()), vec!["a", "c"]);
        assert_eq!(ids(pinned.children(&id("a"))), vec!["a2"]);
    }

    #[test]
    fn test_shared_ancestor_is_inserted_once() {
        let mut input = graph();
        input.add_link(Link::new("c1", "a11", "flow"));
        input.add_link(Link::new("c1", "a12", "flow"));
        pin(&mut input, "c1");

        let pinned = compute_pinned_graph(&input);
        assert_eq!(ids(pinned.children(&id("a"))), vec!["a1"]);
        assert_eq!(ids(pinned.children(&id("a1"))), vec!["a11", "a12"]);
        assert_eq!(pinned.link_count(), 2);
    }

    #[test]
    fn test_link_to_missing_endpoint_is_ignored() {
        let mut input = graph();
        input.add_link(Link::new("c1", "ghost", "flow"));
        pin(&mut input, "c1");
        let pinned = compute_pinned_graph(&input);
        assert!(!pinned.contains_node(&id("ghost")));
    }
}
