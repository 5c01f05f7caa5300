use crate::{NodeData, NodeId};
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

/// State the user changes by interacting with a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeUserState {
    pub is_pinned: bool,
    pub is_expanded: bool,
    pub is_hidden: bool,
}

/// Which user interactions a node allows. Fixed at construction.
///
/// Pinning a child is expected to disable pinning of its parent; callers
/// enforce that when they build the graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeUserControl {
    pub can_pin: bool,
    pub can_expand: bool,
    pub can_hide: bool,
    pub can_select: bool,
}

impl NodeUserControl {
    pub const NONE: Self = Self {
        can_pin: false,
        can_expand: false,
        can_hide: false,
        can_select: false,
    };

    pub const ALL: Self = Self {
        can_pin: true,
        can_expand: true,
        can_hide: true,
        can_select: true,
    };
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeGroup {
    pub name: String,
    /// Ordered children. Maintained through `NetworkGraph::add_child_to_parent`.
    pub children: Vec<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl NodeGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
            metadata: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    /// Back-reference used for ancestor walks only.
    pub parent: Option<NodeId>,
    pub group: Option<NodeGroup>,
    pub classes: Vec<String>,
    pub data: Option<NodeData>,
    pub state: NodeUserState,
    pub control: NodeUserControl,
}

impl Node {
    /// A leaf node with default state and no user controls.
    pub fn new(id: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            parent: None,
            group: None,
            classes: Vec::new(),
            data: None,
            state: NodeUserState::default(),
            control: NodeUserControl::NONE,
        }
    }

    /// A node that can hold children.
    pub fn with_group(id: impl Into<NodeId>, name: impl Into<String>) -> Self {
        Self {
            group: Some(NodeGroup::new(name)),
            ..Self::new(id)
        }
    }

    pub fn children(&self) -> &[NodeId] {
        self.group.as_ref().map(|g| g.children.as_slice()).unwrap_or(&[])
    }

    pub fn has_children(&self) -> bool {
        !self.children().is_empty()
    }

    /// No group, or a group without children.
    pub fn is_leaf(&self) -> bool {
        !self.has_children()
    }

    /// Copy of the node with its hierarchy links removed: no parent, and an
    /// empty child list if it has a group. Group name and metadata survive.
    pub fn clone_without_hierarchy(&self) -> Self {
        let mut clone = self.clone();
        clone.parent = None;
        if let Some(group) = clone.group.as_mut() {
            group.children.clear();
        }
        clone
    }
}

/// Tally of node states over a tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeUserStateCounts {
    pub hidden: usize,
    pub pinned: usize,
    pub collapsed: usize,
}

impl NodeUserStateCounts {
    pub const ZERO: Self = Self {
        hidden: 0,
        pinned: 0,
        collapsed: 0,
    };
}

impl Add for NodeUserStateCounts {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            hidden: self.hidden + rhs.hidden,
            pinned: self.pinned + rhs.pinned,
            collapsed: self.collapsed + rhs.collapsed,
        }
    }
}

impl AddAssign for NodeUserStateCounts {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_without_hierarchy() {
        let mut node = Node::with_group("n1", "Node 1");
        node.parent = Some(NodeId::from("root"));
        node.group.as_mut().unwrap().children.push(NodeId::from("n11"));
        node.state.is_pinned = true;

        let clone = node.clone_without_hierarchy();
        assert!(clone.parent.is_none());
        assert!(clone.is_leaf());
        assert_eq!(clone.group.as_ref().unwrap().name, "Node 1");
        assert!(clone.state.is_pinned);
        // The source is untouched.
        assert_eq!(node.children().len(), 1);
    }

    #[test]
    fn test_leaf_detection() {
        assert!(Node::new("a").is_leaf());
        assert!(Node::with_group("b", "B").is_leaf());
    }

    #[test]
    fn test_counts_add() {
        let mut total = NodeUserStateCounts::ZERO;
        total += NodeUserStateCounts {
            hidden: 1,
            pinned: 2,
            collapsed: 0,
        };
        total += NodeUserStateCounts {
            hidden: 0,
            pinned: 1,
            collapsed: 4,
        };
        assert_eq!(
            total,
            NodeUserStateCounts {
                hidden: 1,
                pinned: 3,
                collapsed: 4
            }
        );
    }
}
