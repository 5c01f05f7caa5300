use serde::{Deserialize, Serialize};

/// Payload carried by a node.
///
/// Different nodes in the same graph can carry different payloads; the
/// `type` tag tells consumers which one they are looking at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NodeData {
    /// Top-level column of the diagram.
    Column { index: usize, name: String },

    /// Payload of the nodes in the sample graph.
    Sample { name: String },

    /// Application-defined payload.
    Opaque {
        tag: String,
        #[serde(default)]
        payload: serde_json::Value,
    },
}

impl NodeData {
    /// The discriminator, `tag` for opaque payloads.
    pub fn type_tag(&self) -> &str {
        match self {
            Self::Column { .. } => "Column",
            Self::Sample { .. } => "Sample",
            Self::Opaque { tag, .. } => tag,
        }
    }

    pub fn is_column(&self) -> bool {
        matches!(self, Self::Column { .. })
    }

    /// Display name when the payload has one.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Column { name, .. } | Self::Sample { name } => Some(name),
            Self::Opaque { payload, .. } => payload.get("name").and_then(|v| v.as_str()),
        }
    }
}
