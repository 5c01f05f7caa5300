use crate::{LinkId, NodeId};
use thiserror::Error;

/// Error type for enum conversion failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnumConversionError {
    #[error("Invalid LinkDirection value: {0}")]
    InvalidLinkDirection(String),
}

/// Structural errors raised while building a graph.
///
/// Derivations never produce these: a missing lookup during derivation
/// excludes the entity instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("node {0} already exists in the graph")]
    DuplicateNode(NodeId),
    #[error("link {0} already exists in the graph")]
    DuplicateLink(LinkId),
    #[error("node {0} does not exist in the graph")]
    UnknownNode(NodeId),
    #[error("parent node {0} does not exist in the graph")]
    UnknownParent(NodeId),
    #[error("node {0} has no group and cannot hold children")]
    ParentIsLeaf(NodeId),
    #[error("link {link} references missing endpoint {endpoint}")]
    UnknownLinkEndpoint { link: LinkId, endpoint: NodeId },
}
