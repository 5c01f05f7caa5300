//! Link filters around pinned reference nodes.
//!
//! [`fan_in_fan_out_links`] works on a flat list of directed links with up to
//! three pinned nodes, one per [`LinkDirection`]. [`pinned_links`] is the
//! flat-graph counterpart of the pinned selector: it keeps the links touching
//! pinned nodes and the nodes those links reach.

use crate::graph::NetworkGraph;
use std::collections::HashSet;
use topoview_core::{Link, LinkDirection, Node, NodeId};

/// A link that knows which side of the graph it runs on.
pub trait DirectedLink {
    fn source(&self) -> &NodeId;
    fn target(&self) -> &NodeId;
    fn direction(&self) -> LinkDirection;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimLink {
    pub source: NodeId,
    pub target: NodeId,
    pub direction: LinkDirection,
    pub link_type: String,
}

impl SimLink {
    pub fn new(
        source: impl Into<NodeId>,
        target: impl Into<NodeId>,
        direction: LinkDirection,
        link_type: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            direction,
            link_type: link_type.into(),
        }
    }
}

impl DirectedLink for SimLink {
    fn source(&self) -> &NodeId {
        &self.source
    }

    fn target(&self) -> &NodeId {
        &self.target
    }

    fn direction(&self) -> LinkDirection {
        self.direction
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FanPins {
    pub ingress: Option<NodeId>,
    pub internal: Option<NodeId>,
    pub egress: Option<NodeId>,
}

/// Which of the three pins are present, with the pins themselves.
///
/// Variant names read ingress, internal, egress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinCombination<'a> {
    None,
    Egress(&'a NodeId),
    Internal(&'a NodeId),
    InternalEgress(&'a NodeId, &'a NodeId),
    Ingress(&'a NodeId),
    IngressEgress(&'a NodeId, &'a NodeId),
    IngressInternal(&'a NodeId, &'a NodeId),
    All(&'a NodeId, &'a NodeId, &'a NodeId),
}

impl FanPins {
    pub fn combination(&self) -> PinCombination<'_> {
        match (&self.ingress, &self.internal, &self.egress) {
            (None, None, None) => PinCombination::None,
            (None, None, Some(eg)) => PinCombination::Egress(eg),
            (None, Some(int), None) => PinCombination::Internal(int),
            (None, Some(int), Some(eg)) => PinCombination::InternalEgress(int, eg),
            (Some(ing), None, None) => PinCombination::Ingress(ing),
            (Some(ing), None, Some(eg)) => PinCombination::IngressEgress(ing, eg),
            (Some(ing), Some(int), None) => PinCombination::IngressInternal(ing, int),
            (Some(ing), Some(int), Some(eg)) => PinCombination::All(ing, int, eg),
        }
    }
}

/// Selects the links relevant to the pinned ingress, internal and egress
/// nodes.
///
/// Links are picked in two passes for the one- and two-pin cases: first the
/// links anchored on the pins, then the adjacent links of the internal nodes
/// the first pass reached. Output keeps input order within each pass.
pub fn fan_in_fan_out_links<L: DirectedLink + Clone>(links: &[L], pins: &FanPins) -> Vec<L> {
    use LinkDirection::{Egress, Ingress, Internal};

    match pins.combination() {
        PinCombination::None => links.to_vec(),
        PinCombination::Egress(eg) => with_adjacent(
            links,
            |l| l.direction() == Egress && l.target() == eg,
            |l| l.source(),
            Adjacent::IngressAndInternal,
        ),
        PinCombination::Internal(int) => keep(links, |l| match l.direction() {
            Ingress => l.target() == int,
            Internal => l.source() == int || l.target() == int,
            Egress => l.source() == int,
        }),
        PinCombination::InternalEgress(int, eg) => with_adjacent(
            links,
            |l| l.direction() == Egress && l.source() == int && l.target() == eg,
            |l| l.source(),
            Adjacent::IngressAndInternal,
        ),
        PinCombination::Ingress(ing) => with_adjacent(
            links,
            |l| l.direction() == Ingress && l.source() == ing,
            |l| l.target(),
            Adjacent::InternalAndEgress,
        ),
        PinCombination::IngressEgress(ing, eg) => with_adjacent(
            links,
            |l| match l.direction() {
                Ingress => l.source() == ing,
                Egress => l.target() == eg,
                Internal => false,
            },
            |l| match l.direction() {
                Ingress => l.target(),
                _ => l.source(),
            },
            Adjacent::Internal,
        ),
        PinCombination::IngressInternal(ing, int) => with_adjacent(
            links,
            |l| l.direction() == Ingress && l.source() == ing && l.target() == int,
            |l| l.target(),
            Adjacent::InternalAndEgress,
        ),
        PinCombination::All(ing, int, eg) => keep(links, |l| match l.direction() {
            Ingress => l.source() == ing && l.target() == int,
            Internal => l.source() == int || l.target() == int,
            Egress => l.source() == int && l.target() == eg,
        }),
    }
}

/// Links pulled in by the second pass, relative to the internal nodes found
/// by the first.
#[derive(Debug, Clone, Copy)]
enum Adjacent {
    IngressAndInternal,
    InternalAndEgress,
    Internal,
}

impl Adjacent {
    fn includes<L: DirectedLink>(self, link: &L, internal_nodes: &HashSet<&NodeId>) -> bool {
        let touches_source = internal_nodes.contains(link.source());
        let touches_target = internal_nodes.contains(link.target());
        match (self, link.direction()) {
            (_, LinkDirection::Internal) => touches_source || touches_target,
            (Adjacent::IngressAndInternal, LinkDirection::Ingress) => touches_target,
            (Adjacent::InternalAndEgress, LinkDirection::Egress) => touches_source,
            _ => false,
        }
    }
}

fn keep<L: DirectedLink + Clone>(links: &[L], predicate: impl Fn(&L) -> bool) -> Vec<L> {
    links.iter().filter(|link| predicate(link)).cloned().collect()
}

fn with_adjacent<'a, L, P, E>(links: &'a [L], anchored: P, internal_end: E, adjacent: Adjacent) -> Vec<L>
where
    L: DirectedLink + Clone,
    P: Fn(&L) -> bool,
    E: Fn(&'a L) -> &'a NodeId,
{
    let first: Vec<&'a L> = links.iter().filter(|link| anchored(link)).collect();
    let internal_nodes: HashSet<&NodeId> = first.iter().map(|link| internal_end(*link)).collect();

    let mut selected: Vec<L> = first.into_iter().cloned().collect();
    selected.extend(
        links
            .iter()
            .filter(|link| adjacent.includes(*link, &internal_nodes))
            .cloned(),
    );
    selected
}

/// Nodes and links kept by [`pinned_links`]. Links keep graph order; nodes
/// follow the order the links reach them.
#[derive(Debug, Clone)]
pub struct PinnedLinks<'a> {
    pub nodes: Vec<&'a Node>,
    pub links: Vec<&'a Link>,
}

/// Keeps the links with an endpoint that is pinned, or whose collapsed parent
/// is pinned, plus the nodes those links touch.
///
/// A pinned, expanded node with no pinned child also brings in its non-hidden
/// children. When no link qualifies the whole graph is returned.
pub fn pinned_links(graph: &NetworkGraph) -> PinnedLinks<'_> {
    let links: Vec<&Link> = graph
        .links()
        .filter(|link| {
            is_node_or_collapsed_parent_pinned(graph, &link.source)
                || is_node_or_collapsed_parent_pinned(graph, &link.target)
        })
        .collect();

    if links.is_empty() {
        return PinnedLinks {
            nodes: graph.nodes().collect(),
            links: graph.links().collect(),
        };
    }

    let mut seen: HashSet<&NodeId> = HashSet::new();
    let mut nodes: Vec<&Node> = Vec::new();
    for link in &links {
        for end in [&link.source, &link.target] {
            if let Some(node) = graph.node(end) {
                push_unique(node, &mut seen, &mut nodes);
            }
        }
    }
    for node in graph.nodes() {
        if !node.state.is_pinned || !node.state.is_expanded || node.group.is_none() {
            continue;
        }
        if graph.children(&node.id).any(|child| child.state.is_pinned) {
            continue;
        }
        for child in graph.children(&node.id).filter(|child| !child.state.is_hidden) {
            push_unique(child, &mut seen, &mut nodes);
        }
    }

    PinnedLinks { nodes, links }
}

fn push_unique<'a>(node: &'a Node, seen: &mut HashSet<&'a NodeId>, nodes: &mut Vec<&'a Node>) {
    if seen.insert(&node.id) {
        nodes.push(node);
    }
}

fn is_node_or_collapsed_parent_pinned(graph: &NetworkGraph, id: &NodeId) -> bool {
    let Some(node) = graph.node(id) else {
        return false;
    };
    if node.state.is_pinned {
        return true;
    }
    graph
        .parent(id)
        .is_some_and(|parent| !parent.state.is_expanded && parent.state.is_pinned)
}
