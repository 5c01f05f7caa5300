use topoview_core::{Link, LinkDirection, Node, NodeId};
use topoview_graph::{GraphUserState, NetworkGraph, SimLink};

/// `columns` columns, each a tree `depth` levels deep with `fanout` children
/// per node, linked leaf-to-leaf into the next column.
pub fn generate_network(columns: usize, depth: usize, fanout: usize) -> NetworkGraph {
    let mut graph = NetworkGraph::new();
    let mut leaves_per_column = Vec::with_capacity(columns);

    for c in 0..columns {
        let root = format!("c{}", c);
        graph.add_column(group_node(&root));
        let mut level = vec![root];
        for _ in 0..depth {
            let mut next = Vec::with_capacity(level.len() * fanout);
            for parent in &level {
                for i in 0..fanout {
                    let id = format!("{}-{}", parent, i);
                    if graph
                        .add_child_to_parent(group_node(&id), &NodeId::new(parent.as_str()))
                        .is_ok()
                    {
                        next.push(id);
                    }
                }
            }
            level = next;
        }
        leaves_per_column.push(level);
    }

    for pair in leaves_per_column.windows(2) {
        for (source, target) in pair[0].iter().zip(pair[1].iter().rev()) {
            graph.add_link(Link::new(source.as_str(), target.as_str(), "flow"));
        }
    }
    graph
}

fn group_node(id: &str) -> Node {
    let mut node = Node::with_group(id, id);
    node.state.is_expanded = true;
    node
}

/// Collapses every `stride`-th node one level below the columns and pins the
/// first column.
pub fn manipulate(graph: &NetworkGraph, stride: usize) -> GraphUserState {
    let mut state = GraphUserState::new();
    let second_level: Vec<&Node> = graph
        .columns()
        .flat_map(|column| graph.children(&column.id))
        .collect();
    for node in second_level.into_iter().step_by(stride.max(1)) {
        state.set_node_is_expanded(node, false);
    }
    if let Some(first) = graph.columns().next() {
        state.set_node_is_pinned(first, true);
    }
    state
}

/// A fan-in/fan-out diagram with `width` ingress, internal and egress nodes.
pub fn generate_fan(width: usize) -> Vec<SimLink> {
    let mut links = Vec::with_capacity(width * 3);
    for i in 0..width {
        let internal = format!("int{}", i);
        links.push(SimLink::new(format!("in{}", i), internal.as_str(), LinkDirection::Ingress, "flow"));
        links.push(SimLink::new(
            internal.as_str(),
            format!("int{}", (i + 1) % width),
            LinkDirection::Internal,
            "flow",
        ));
        links.push(SimLink::new(internal.as_str(), format!("out{}", i), LinkDirection::Egress, "flow"));
    }
    links
}
