//! JSON form of a graph and of its user-state overlays.
//!
//! A graph document nests children inside their parents:
//!
//! ```json
//! {
//!   "columns": [
//!     { "id": "node1", "is_expanded": true,
//!       "group": { "name": "Node 1", "children": [ { "id": "node11" } ] } }
//!   ],
//!   "links": [ { "source": "node11", "target": "node21", "link_type": "test" } ]
//! }
//! ```

use crate::graph::NetworkGraph;
use crate::user_state::{GraphUserState, LinkUserStateMap, NodeUserStateMap};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use topoview_core::{
    GraphError, Link, LinkId, LinkUserState, Node, NodeData, NodeGroup, NodeId, NodeUserControl,
    NodeUserState,
};

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("invalid graph document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("inconsistent graph document: {0}")]
    Graph(#[from] GraphError),
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    #[serde(default)]
    pub columns: Vec<NodeSpec>,
    #[serde(default)]
    pub links: Vec<LinkSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub id: NodeId,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<NodeData>,
    #[serde(flatten)]
    pub state: NodeUserState,
    #[serde(flatten)]
    pub control: NodeUserControl,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<GroupSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSpec {
    pub name: String,
    #[serde(default)]
    pub children: Vec<NodeSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkSpec {
    pub source: NodeId,
    pub target: NodeId,
    pub link_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(default = "default_can_select")]
    pub can_select: bool,
    #[serde(default)]
    pub is_selected: bool,
}

fn default_can_select() -> bool {
    true
}

impl GraphDocument {
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let json = std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn to_json(&self, pretty: bool) -> Result<String, DocumentError> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }

    /// Builds the arena graph, rejecting duplicate ids and links to nodes
    /// the document does not define.
    pub fn into_graph(self) -> Result<NetworkGraph, DocumentError> {
        let mut graph = NetworkGraph::new();
        for column in self.columns {
            insert_spec(&mut graph, column, None)?;
        }
        for spec in self.links {
            let mut link = Link::new(spec.source, spec.target, &spec.link_type);
            for endpoint in [&link.source, &link.target] {
                if !graph.contains_node(endpoint) {
                    return Err(GraphError::UnknownLinkEndpoint {
                        link: link.id.clone(),
                        endpoint: endpoint.clone(),
                    }
                    .into());
                }
            }
            link.classes = spec.classes;
            link.data = spec.data;
            link.can_select = spec.can_select;
            link.state.is_selected = spec.is_selected;
            let id = link.id.clone();
            if !graph.add_link(link) {
                return Err(GraphError::DuplicateLink(id).into());
            }
        }
        Ok(graph)
    }

    pub fn from_graph(graph: &NetworkGraph) -> Self {
        Self {
            columns: graph.columns().map(|column| node_spec(graph, column)).collect(),
            links: graph
                .links()
                .map(|link| LinkSpec {
                    source: link.source.clone(),
                    target: link.target.clone(),
                    link_type: link.link_type.clone(),
                    classes: link.classes.clone(),
                    data: link.data.clone(),
                    can_select: link.can_select,
                    is_selected: link.state.is_selected,
                })
                .collect(),
        }
    }
}

fn insert_spec(graph: &mut NetworkGraph, spec: NodeSpec, parent: Option<&NodeId>) -> Result<(), DocumentError> {
    let NodeSpec {
        id,
        classes,
        data,
        state,
        control,
        group,
    } = spec;

    let mut node = Node::new(id.clone());
    node.classes = classes;
    node.data = data;
    node.state = state;
    node.control = control;
    let children = match group {
        Some(GroupSpec {
            name,
            children,
            metadata,
        }) => {
            let mut node_group = NodeGroup::new(name);
            node_group.metadata = metadata;
            node.group = Some(node_group);
            children
        }
        None => Vec::new(),
    };

    let inserted = match parent {
        None => graph.add_column(node),
        Some(parent) => graph.add_child_to_parent(node, parent)?,
    };
    if !inserted {
        return Err(GraphError::DuplicateNode(id).into());
    }
    for child in children {
        insert_spec(graph, child, Some(&id))?;
    }
    Ok(())
}

fn node_spec(graph: &NetworkGraph, node: &Node) -> NodeSpec {
    NodeSpec {
        id: node.id.clone(),
        classes: node.classes.clone(),
        data: node.data.clone(),
        state: node.state,
        control: node.control,
        group: node.group.as_ref().map(|group| GroupSpec {
            name: group.name.clone(),
            children: graph
                .children(&node.id)
                .map(|child| node_spec(graph, child))
                .collect(),
            metadata: group.metadata.clone(),
        }),
    }
}

/// Persisted overlays. Maps are ordered so saved files diff cleanly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserStateDocument {
    #[serde(default)]
    pub nodes: BTreeMap<NodeId, NodeUserState>,
    #[serde(default)]
    pub links: BTreeMap<LinkId, LinkUserState>,
}

impl UserStateDocument {
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let json = std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn from_user_state(user_state: &GraphUserState) -> Self {
        Self {
            nodes: user_state
                .node_states()
                .iter()
                .map(|(id, state)| (id.clone(), *state))
                .collect(),
            links: user_state
                .link_states()
                .iter()
                .map(|(id, state)| (id.clone(), *state))
                .collect(),
        }
    }

    pub fn into_user_state(self) -> GraphUserState {
        GraphUserState::from_maps(
            self.nodes.into_iter().collect::<NodeUserStateMap>(),
            self.links.into_iter().collect::<LinkUserStateMap>(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::sample_graph;

    const DOCUMENT: &str = r#"{
        "columns": [
            { "id": "a", "is_expanded": true, "can_pin": true,
              "group": { "name": "A", "children": [ { "id": "a1", "is_pinned": true } ] } },
            { "id": "b", "data": { "type": "Column", "index": 1, "name": "B" } }
        ],
        "links": [ { "source": "a1", "target": "b", "link_type": "flow" } ]
    }"#;

    #[test]
    fn test_parse_nested_document() {
        let graph = GraphDocument::from_json(DOCUMENT).unwrap().into_graph().unwrap();
        let a = graph.node(&NodeId::from("a")).unwrap();
        assert!(a.state.is_expanded);
        assert!(a.control.can_pin);
        assert!(!a.control.can_hide);
        let a1 = graph.node(&NodeId::from("a1")).unwrap();
        assert_eq!(a1.parent, Some(NodeId::from("a")));
        assert!(a1.state.is_pinned);
        assert!(graph.node(&NodeId::from("b")).unwrap().data.as_ref().unwrap().is_column());
        let link = graph.link(&LinkId::from("a1--b--flow")).unwrap();
        assert!(link.can_select);
    }

    #[test]
    fn test_duplicate_node_is_rejected() {
        let json = r#"{ "columns": [ { "id": "a" }, { "id": "a" } ] }"#;
        let err = GraphDocument::from_json(json).unwrap().into_graph().unwrap_err();
        assert!(matches!(err, DocumentError::Graph(GraphError::DuplicateNode(_))));
    }

    #[test]
    fn test_empty_group_is_a_leaf() {
        let json = r#"{ "columns": [ { "id": "a", "group": { "name": "A" } } ] }"#;
        let graph = GraphDocument::from_json(json).unwrap().into_graph().unwrap();
        assert!(graph.node(&NodeId::from("a")).unwrap().is_leaf());
    }

    #[test]
    fn test_dangling_link_is_rejected() {
        let json = r#"{ "columns": [ { "id": "a" } ],
                        "links": [ { "source": "a", "target": "zz", "link_type": "x" } ] }"#;
        let err = GraphDocument::from_json(json).unwrap().into_graph().unwrap_err();
        match err {
            DocumentError::Graph(GraphError::UnknownLinkEndpoint { endpoint, .. }) => {
                assert_eq!(endpoint, NodeId::from("zz"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            GraphDocument::from_json("{ \"columns\": 3 }"),
            Err(DocumentError::Json(_))
        ));
    }

    #[test]
    fn test_sample_graph_survives_document() {
        let graph = sample_graph();
        let json = GraphDocument::from_graph(&graph).to_json(false).unwrap();
        let rebuilt = GraphDocument::from_json(&json).unwrap().into_graph().unwrap();
        assert_eq!(GraphDocument::from_graph(&rebuilt), GraphDocument::from_graph(&graph));
        assert_eq!(rebuilt.node_count(), graph.node_count());
    }

    #[test]
    fn test_user_state_document() {
        let graph = sample_graph();
        let mut user_state = GraphUserState::new();
        user_state.set_node_is_hidden(graph.node(&NodeId::from("node2")).unwrap(), true);

        let document = UserStateDocument::from_user_state(&user_state);
        let json = serde_json::to_string(&document).unwrap();
        let restored = UserStateDocument::from_json(&json).unwrap().into_user_state();
        let node2 = graph.node(&NodeId::from("node2")).unwrap();
        assert!(restored.node_state(node2).is_hidden);
        // Seeded from the baseline on first touch.
        assert!(restored.node_state(node2).is_expanded);
    }
}
