use crossbeam_channel::{Receiver, Sender, unbounded};
use serde::{Deserialize, Serialize};
use topoview_core::{LinkId, NodeId};

/// Toolbar button a node gesture came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ToolbarButton {
    Pin,
    Expand,
    Hide,
    Alert,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Event {
    // ========================================================================
    // Node gestures
    // ========================================================================
    SetNodeIsPinned {
        id: NodeId,
        is_pinned: bool,
    },
    SetNodeIsExpanded {
        id: NodeId,
        is_expanded: bool,
    },
    SetNodeIsHidden {
        id: NodeId,
        is_hidden: bool,
    },
    /// Alert badge of a node was clicked. Not handled by the graph itself.
    AlertClick {
        id: NodeId,
    },
    /// Event raised by application-defined node content.
    CustomNodeEvent {
        id: NodeId,
        name: String,
        payload: serde_json::Value,
    },

    // ========================================================================
    // Link gestures
    // ========================================================================
    ToggleLinkSelection {
        id: LinkId,
    },
    SetLinkIsSelected {
        id: LinkId,
        is_selected: bool,
    },

    // ========================================================================
    // Bulk graph operations
    // ========================================================================
    UnhideAll,
    UnpinAll,
    /// Hide every pinned node and unpin it.
    HidePinned,
    ExpandAll,
    CollapseAll,
    /// Pin the first unpinned, unhidden node of a column (0-based).
    PinFirstNodeInColumn(usize),

    // ========================================================================
    // Command palette
    // ========================================================================
    CommandApplied {
        description: String,
    },
}

impl Event {
    /// Map a node toolbar click to the event it stands for.
    ///
    /// `value` is the new state the button requests; it is ignored for
    /// [`ToolbarButton::Alert`].
    pub fn from_toolbar(button: ToolbarButton, id: NodeId, value: bool) -> Self {
        match button {
            ToolbarButton::Pin => Self::SetNodeIsPinned {
                id,
                is_pinned: value,
            },
            ToolbarButton::Expand => Self::SetNodeIsExpanded {
                id,
                is_expanded: value,
            },
            ToolbarButton::Hide => Self::SetNodeIsHidden {
                id,
                is_hidden: value,
            },
            ToolbarButton::Alert => Self::AlertClick { id },
        }
    }

    /// True for events that change the user-state overlays of a graph.
    pub fn changes_user_state(&self) -> bool {
        !matches!(
            self,
            Self::AlertClick { .. } | Self::CustomNodeEvent { .. } | Self::CommandApplied { .. }
        )
    }
}

#[derive(Clone)]
pub struct EventBus {
    tx: Sender<Event>,
    rx: Receiver<Event>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub fn sender(&self) -> Sender<Event> {
        self.tx.clone()
    }

    pub fn receiver(&self) -> Receiver<Event> {
        self.rx.clone()
    }

    pub fn publish(&self, event: Event) {
        tracing::trace!(?event, "publish");
        let _ = self.tx.send(event);
    }

    /// Dispatch all pending events to a listener.
    /// Returns the number of events dispatched.
    pub fn dispatch_to<L: EventListener>(&self, listener: &mut L) -> usize {
        let mut count = 0;
        while let Ok(event) = self.rx.try_recv() {
            listener.handle_event(&event);
            count += 1;
        }
        count
    }
}

/// Trait for components that respond to events.
/// Implement this to receive events from the EventBus.
pub trait EventListener {
    fn handle_event(&mut self, event: &Event);
}
