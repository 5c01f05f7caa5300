use crate::graph::NetworkGraph;
use crate::user_state::GraphUserState;
use crate::view::{ViewGraph, compute_view_graph};
use topoview_core::{LinkId, Node, NodeId};
use topoview_events::{Event, EventListener};
use tracing::{debug, info, warn};

/// A canonical graph, the user's overlays on it, and the view derived from
/// both.
///
/// The view is rebuilt from scratch the first time it is read after the
/// overlays or the graph change; reads in between share one cached copy.
#[derive(Debug, Clone, Default)]
pub struct GraphSession {
    graph: NetworkGraph,
    user_state: GraphUserState,
    graph_generation: u64,
    cached: Option<CachedView>,
}

#[derive(Debug, Clone)]
struct CachedView {
    graph_generation: u64,
    revision: u64,
    view: ViewGraph,
}

impl GraphSession {
    pub fn new(graph: NetworkGraph) -> Self {
        Self::with_user_state(graph, GraphUserState::new())
    }

    pub fn with_user_state(graph: NetworkGraph, user_state: GraphUserState) -> Self {
        Self {
            graph,
            user_state,
            graph_generation: 0,
            cached: None,
        }
    }

    pub fn graph(&self) -> &NetworkGraph {
        &self.graph
    }

    /// Replaces the canonical graph. Overlay entries are keyed by id, so they
    /// carry over to nodes and links that keep their ids.
    pub fn set_graph(&mut self, graph: NetworkGraph) {
        self.graph = graph;
        self.graph_generation += 1;
    }

    pub fn user_state(&self) -> &GraphUserState {
        &self.user_state
    }

    pub fn user_state_mut(&mut self) -> &mut GraphUserState {
        &mut self.user_state
    }

    /// The derived view, recomputed only if something changed since the last
    /// call.
    pub fn view(&mut self) -> &ViewGraph {
        let revision = self.user_state.revision();
        let stale = self.cached.as_ref().is_none_or(|cached| {
            cached.revision != revision || cached.graph_generation != self.graph_generation
        });
        if stale {
            self.cached = None;
        }
        let graph_generation = self.graph_generation;
        let (graph, user_state) = (&self.graph, &self.user_state);
        &self
            .cached
            .get_or_insert_with(|| CachedView {
                graph_generation,
                revision,
                view: compute_view_graph(graph, user_state),
            })
            .view
    }

    fn node(&self, id: &NodeId) -> Option<Node> {
        match self.graph.try_node(id) {
            Ok(node) => Some(node.clone()),
            Err(err) => {
                warn!("Ignoring gesture: {}", err);
                None
            }
        }
    }

    fn toggle_link(&mut self, id: &LinkId, is_selected: Option<bool>) {
        let Some(link) = self.graph.link(id) else {
            warn!("Ignoring selection of unknown link {}", id);
            return;
        };
        if !link.can_select {
            debug!("Link {} is not selectable", id);
            return;
        }
        let link = link.clone();
        match is_selected {
            Some(is_selected) => self.user_state.set_link_is_selected(&link, is_selected),
            None => self.user_state.toggle_link_selection(&link),
        }
    }
}

impl EventListener for GraphSession {
    fn handle_event(&mut self, event: &Event) {
        match event {
            Event::SetNodeIsPinned { id, is_pinned } => {
                if let Some(node) = self.node(id) {
                    self.user_state.set_node_is_pinned(&node, *is_pinned);
                }
            }
            Event::SetNodeIsExpanded { id, is_expanded } => {
                if let Some(node) = self.node(id) {
                    self.user_state.set_node_is_expanded(&node, *is_expanded);
                }
            }
            Event::SetNodeIsHidden { id, is_hidden } => {
                if let Some(node) = self.node(id) {
                    self.user_state.set_node_is_hidden(&node, *is_hidden);
                }
            }
            Event::ToggleLinkSelection { id } => self.toggle_link(id, None),
            Event::SetLinkIsSelected { id, is_selected } => self.toggle_link(id, Some(*is_selected)),
            Event::UnhideAll => {
                let changed = self.user_state.unhide_nodes(&self.graph);
                info!("Unhid {} nodes", changed);
            }
            Event::UnpinAll => {
                let changed = self.user_state.unpin_nodes(&self.graph);
                info!("Unpinned {} nodes", changed);
            }
            Event::HidePinned => {
                let changed = self.user_state.hide_pinned_nodes(&self.graph);
                info!("Hid {} pinned nodes", changed);
            }
            Event::ExpandAll => {
                self.user_state.expand_all(&self.graph);
            }
            Event::CollapseAll => {
                self.user_state.collapse_all(&self.graph);
            }
            Event::PinFirstNodeInColumn(column) => {
                if self
                    .user_state
                    .pin_first_node_in_column(&self.graph, *column)
                    .is_none()
                {
                    debug!("Column {} has no node left to pin", column);
                }
            }
            Event::AlertClick { .. } | Event::CustomNodeEvent { .. } | Event::CommandApplied { .. } => {}
        }
    }
}
