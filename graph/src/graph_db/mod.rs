pub mod memory;
pub mod neo4j_client;

pub use memory::InMemoryGraphStore;
pub use neo4j_client::Neo4jClient;

use async_trait::async_trait;
use germplasm_models::{EdgeRecord, GraphStatistics, NodeId, NodeRecord, Properties};
use serde_json::Value;

use crate::errors::{GraphError, GraphResult};
use crate::schema::{EntityKind, RelationKind};

/// Structural template understood by every store
#[derive(Debug, Clone, PartialEq)]
pub enum PatternQuery {
    /// `(a)-[:TYPE]->(b)` paths of one relationship type
    Relationship { kind: RelationKind, limit: usize },
    /// Nodes of `entity` whose `attribute` equals `value`, expanded one hop in
    /// either direction. Matches without neighbors still yield a bare path.
    Neighborhood {
        entity: EntityKind,
        attribute: String,
        value: Value,
        limit: usize,
    },
    /// The first `limit` nodes and the relationships among them
    Sample { limit: usize },
}

/// One hop leaving the start node of a path
#[derive(Debug, Clone, PartialEq)]
pub struct Hop {
    /// Carries its own direction; `source` is not necessarily the path start
    pub relationship: EdgeRecord,
    pub end: NodeRecord,
}

/// A path of length zero or one
#[derive(Debug, Clone, PartialEq)]
pub struct PathRecord {
    pub start: NodeRecord,
    pub hop: Option<Hop>,
}

impl PathRecord {
    pub fn edge(start: NodeRecord, relationship: EdgeRecord, end: NodeRecord) -> Self {
        Self {
            start,
            hop: Some(Hop { relationship, end }),
        }
    }

    pub fn bare(start: NodeRecord) -> Self {
        Self { start, hop: None }
    }
}

/// Whether a value can be stored as a node or relationship property: a scalar,
/// or an array of non-null scalars of one kind. `null` removes the property.
pub fn is_property_value(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => true,
        Value::Object(_) => false,
        Value::Array(items) => {
            let kind = |v: &Value| match v {
                Value::Bool(_) => Some(0),
                Value::Number(n) if n.is_f64() => Some(1),
                Value::Number(_) => Some(2),
                Value::String(_) => Some(3),
                _ => None,
            };
            match items.first().map(kind) {
                None => true,
                Some(None) => false,
                Some(first) => items.iter().all(|v| kind(v) == first),
            }
        }
    }
}

/// Result of a merge-by-key upsert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeOutcome {
    pub id: NodeId,
    pub created: bool,
}

/// Graph store primitives. Merges must be atomic per key at the store.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Cheap round trip used by health checks
    async fn ping(&self) -> GraphResult<()>;

    /// Create key uniqueness constraints for every entity type
    async fn ensure_constraints(&self) -> GraphResult<()>;

    /// Run a raw query and return each row as a JSON object
    async fn execute(&self, cypher: &str, params: Properties) -> GraphResult<Vec<Properties>>;

    /// Create the node if no node with `label` has `properties[key]`, otherwise
    /// set every given property on the existing node
    async fn merge_node(
        &self,
        label: &str,
        key: &str,
        properties: &Properties,
    ) -> GraphResult<MergeOutcome>;

    /// Create the `(source)-[rel_type]->(target)` edge if absent and replace its
    /// properties with `properties`. Returns true when the edge was created.
    async fn merge_relationship(
        &self,
        source: NodeId,
        target: NodeId,
        rel_type: &str,
        properties: &Properties,
    ) -> GraphResult<bool>;

    async fn match_paths(&self, pattern: &PatternQuery) -> GraphResult<Vec<PathRecord>>;

    async fn node(&self, id: NodeId) -> GraphResult<Option<NodeRecord>>;

    async fn statistics(&self) -> GraphResult<GraphStatistics>;
}

/// Stand-in used when the store could not be reached at startup; every call
/// reports the original connection failure
pub struct UnavailableStore {
    reason: String,
}

impl UnavailableStore {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn fail<T>(&self) -> GraphResult<T> {
        Err(GraphError::StoreUnavailable(self.reason.clone()))
    }
}

#[async_trait]
impl GraphStore for UnavailableStore {
    async fn ping(&self) -> GraphResult<()> {
        self.fail()
    }

    async fn ensure_constraints(&self) -> GraphResult<()> {
        self.fail()
    }

    async fn execute(&self, _cypher: &str, _params: Properties) -> GraphResult<Vec<Properties>> {
        self.fail()
    }

    async fn merge_node(
        &self,
        _label: &str,
        _key: &str,
        _properties: &Properties,
    ) -> GraphResult<MergeOutcome> {
        self.fail()
    }

    async fn merge_relationship(
        &self,
        _source: NodeId,
        _target: NodeId,
        _rel_type: &str,
        _properties: &Properties,
    ) -> GraphResult<bool> {
        self.fail()
    }

    async fn match_paths(&self, _pattern: &PatternQuery) -> GraphResult<Vec<PathRecord>> {
        self.fail()
    }

    async fn node(&self, _id: NodeId) -> GraphResult<Option<NodeRecord>> {
        self.fail()
    }

    async fn statistics(&self) -> GraphResult<GraphStatistics> {
        self.fail()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_property_values() {
        for value in [json!(null), json!("3"), json!(1), json!(116.4), json!(["R", "S"]), json!([])] {
            assert!(is_property_value(&value), "{value}");
        }
        for value in [json!({"x": 1}), json!([{"x": 1}]), json!([[1]]), json!([1, "a"]), json!([null])] {
            assert!(!is_property_value(&value), "{value}");
        }
    }
}
