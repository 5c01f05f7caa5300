use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod data;
pub mod error;
pub mod link;
pub mod node;

pub use data::NodeData;
pub use error::{EnumConversionError, GraphError};
pub use link::{LINK_TYPE_GROUPED, Link, LinkUserState, LinkUserStateCounts};
pub use node::{Node, NodeGroup, NodeUserControl, NodeUserState, NodeUserStateCounts};

/// Separator used by every composite id (link ids, grouped-link ids).
///
/// Individual id parts must not contain it if callers intend to split ids
/// back into their parts.
pub const ID_DELIMITER: &str = "--";

/// Joins id parts with [`ID_DELIMITER`].
pub fn composite_id(parts: &[&str]) -> String {
    parts.join(ID_DELIMITER)
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkId(pub String);

impl LinkId {
    /// Deterministic link id: `source--target--link_type`.
    ///
    /// Re-inserting a link between the same endpoints with the same type
    /// always yields the same id, which is what makes insertion idempotent.
    pub fn for_endpoints(source: &NodeId, target: &NodeId, link_type: &str) -> Self {
        Self(composite_id(&[source.as_str(), target.as_str(), link_type]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for LinkId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Direction of a link relative to the internal nodes of a fan-in/fan-out
/// diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkDirection {
    /// From an ingress node into an internal node.
    Ingress,
    /// Between internal nodes.
    Internal,
    /// From an internal node out to an egress node.
    Egress,
}

impl fmt::Display for LinkDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ingress => write!(f, "ingress"),
            Self::Internal => write!(f, "internal"),
            Self::Egress => write!(f, "egress"),
        }
    }
}

impl FromStr for LinkDirection {
    type Err = EnumConversionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "ingress" => Ok(Self::Ingress),
            "internal" => Ok(Self::Internal),
            "egress" => Ok(Self::Egress),
            _ => Err(EnumConversionError::InvalidLinkDirection(value.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_id_is_deterministic() {
        let a = NodeId::from("a");
        let b = NodeId::from("b");
        assert_eq!(LinkId::for_endpoints(&a, &b, "flow").as_str(), "a--b--flow");
        assert_eq!(
            LinkId::for_endpoints(&a, &b, "flow"),
            LinkId::for_endpoints(&a, &b, "flow")
        );
        assert_ne!(
            LinkId::for_endpoints(&a, &b, "flow"),
            LinkId::for_endpoints(&b, &a, "flow")
        );
    }

    #[test]
    fn test_composite_id() {
        assert_eq!(composite_id(&["node1"]), "node1");
        assert_eq!(composite_id(&["node1", "node11"]), "node1--node11");
    }

    #[test]
    fn test_link_direction_parse() {
        assert_eq!("Ingress".parse::<LinkDirection>().unwrap(), LinkDirection::Ingress);
        assert_eq!("egress".parse::<LinkDirection>().unwrap(), LinkDirection::Egress);
        assert!("sideways".parse::<LinkDirection>().is_err());
        assert_eq!(LinkDirection::Internal.to_string(), "internal");
    }

    #[test]
    fn test_ids_serialize_as_plain_strings() {
        let json = serde_json::to_string(&NodeId::from("n1")).unwrap();
        assert_eq!(json, r#""n1""#);
    }
}
