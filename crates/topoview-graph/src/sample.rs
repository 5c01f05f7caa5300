use crate::graph::NetworkGraph;
use topoview_core::{Link, Node, NodeData, NodeId, NodeUserControl};

/// Demo graph: three columns with one child each, linked column-to-column
/// and child-to-child.
///
/// ```text
/// node1 ──► node2    node3
///  └ node11 ──► node21   └ node31
/// ```
pub fn sample_graph() -> NetworkGraph {
    let mut graph = NetworkGraph::new();
    for name in ["node1", "node2", "node3"] {
        graph.add_column(sample_node(name));
    }
    for (parent, child) in [("node1", "node11"), ("node2", "node21"), ("node3", "node31")] {
        if let Err(err) = graph.add_child_to_parent(sample_node(child), &NodeId::from(parent)) {
            tracing::error!("Sample graph is inconsistent: {}", err);
        }
    }
    graph.add_link(sample_link("node1", "node2"));
    graph.add_link(sample_link("node11", "node21"));
    graph
}

fn sample_node(name: &str) -> Node {
    let mut node = Node::with_group(name, name);
    node.data = Some(NodeData::Sample {
        name: name.to_string(),
    });
    node.state.is_expanded = true;
    node.control = NodeUserControl::NONE;
    node
}

fn sample_link(source: &str, target: &str) -> Link {
    let mut link = Link::new(source, target, "test");
    link.classes = vec!["test".to_string()];
    link
}
