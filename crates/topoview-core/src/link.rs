use crate::{LinkId, NodeId};
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

/// Link type of the synthetic links that stand in for links hidden by
/// collapsed nodes.
pub const LINK_TYPE_GROUPED: &str = "grouped";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkUserState {
    pub is_selected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub id: LinkId,
    pub source: NodeId,
    pub target: NodeId,
    /// Used as the arrowhead marker id and the class of the link lines.
    pub link_type: String,
    pub classes: Vec<String>,
    pub data: Option<serde_json::Value>,
    pub state: LinkUserState,
    pub can_select: bool,
}

impl Link {
    pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>, link_type: &str) -> Self {
        let source = source.into();
        let target = target.into();
        Self {
            id: LinkId::for_endpoints(&source, &target, link_type),
            source,
            target,
            link_type: link_type.to_string(),
            classes: Vec::new(),
            data: None,
            state: LinkUserState::default(),
            can_select: true,
        }
    }

    /// Synthetic link between the visible stand-ins of two collapsed
    /// subtrees. Never selectable.
    pub fn grouped(source: NodeId, target: NodeId) -> Self {
        Self {
            can_select: false,
            ..Self::new(source, target, LINK_TYPE_GROUPED)
        }
    }

    pub fn is_grouped(&self) -> bool {
        self.link_type == LINK_TYPE_GROUPED
    }

    pub fn is_self_link(&self) -> bool {
        self.source == self.target
    }

    pub fn touches(&self, id: &NodeId) -> bool {
        &self.source == id || &self.target == id
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkUserStateCounts {
    pub selected: usize,
    pub total: usize,
}

impl LinkUserStateCounts {
    pub const ZERO: Self = Self {
        selected: 0,
        total: 0,
    };
}

impl Add for LinkUserStateCounts {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            selected: self.selected + rhs.selected,
            total: self.total + rhs.total,
        }
    }
}

impl AddAssign for LinkUserStateCounts {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}
