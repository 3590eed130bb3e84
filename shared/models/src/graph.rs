use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::Properties;

/// Store-assigned node identity. Opaque to consumers.
pub type NodeId = i64;

/// A node as returned to visualization consumers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    pub labels: Vec<String>,
    pub properties: Properties,
}

impl NodeRecord {
    pub fn new(id: NodeId, label: impl Into<String>, properties: Properties) -> Self {
        Self {
            id,
            labels: vec![label.into()],
            properties,
        }
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }
}

/// A directed relationship instance between two nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub source: NodeId,
    pub target: NodeId,
    #[serde(rename = "type")]
    pub rel_type: String,
    pub properties: Properties,
}

/// Deduplicated node/relationship collection ready for visualization.
///
/// Nodes are unique by id; relationships are every observed edge instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphView {
    pub nodes: Vec<NodeRecord>,
    pub relationships: Vec<EdgeRecord>,
}

impl GraphView {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.relationships.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeRecord> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

/// Property search request (`POST /api/graph/search`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub entity_type: String,
    pub property_key: Option<String>,
    pub property_value: Option<serde_json::Value>,
    pub limit: Option<usize>,
}

/// Node and relationship counts in the store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphStatistics {
    pub total_nodes: usize,
    pub total_relationships: usize,
    pub nodes_by_label: BTreeMap<String, usize>,
    pub relationships_by_type: BTreeMap<String, usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn edge_type_serializes_as_type() {
        let edge = EdgeRecord {
            source: 1,
            target: 2,
            rel_type: "GROWS_IN".to_string(),
            properties: Properties::new(),
        };

        let value = serde_json::to_value(&edge).unwrap();
        assert_eq!(
            value,
            json!({"source": 1, "target": 2, "type": "GROWS_IN", "properties": {}})
        );
    }
}
