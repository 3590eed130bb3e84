use async_trait::async_trait;
use germplasm_models::{EdgeRecord, GraphStatistics, NodeId, NodeRecord, Properties};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use super::{is_property_value, GraphStore, MergeOutcome, PathRecord, PatternQuery};
use crate::errors::{GraphError, GraphResult};

#[derive(Default)]
struct State {
    nodes: BTreeMap<NodeId, NodeRecord>,
    edges: Vec<EdgeRecord>,
    next_id: NodeId,
    stubbed: HashMap<String, Result<Vec<Properties>, String>>,
    executed: Vec<String>,
}

/// Process-local graph store.
///
/// Implements the structural primitives faithfully but does not interpret
/// Cypher: `execute` answers from rows registered with [`stub_query`] and
/// returns no rows otherwise.
///
/// [`stub_query`]: InMemoryGraphStore::stub_query
pub struct InMemoryGraphStore {
    state: RwLock<State>,
    available: AtomicBool,
}

impl Default for InMemoryGraphStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryGraphStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State::default()),
            available: AtomicBool::new(true),
        }
    }

    /// Simulate losing (or regaining) the connection
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Rows returned by `execute` for exactly this query text
    pub async fn stub_query(&self, cypher: impl Into<String>, rows: Vec<Properties>) {
        self.state.write().await.stubbed.insert(cypher.into(), Ok(rows));
    }

    /// Make `execute` reject this query text
    pub async fn stub_rejection(&self, cypher: impl Into<String>, reason: impl Into<String>) {
        self.state
            .write()
            .await
            .stubbed
            .insert(cypher.into(), Err(reason.into()));
    }

    /// Query texts passed to `execute`, in call order
    pub async fn executed_queries(&self) -> Vec<String> {
        self.state.read().await.executed.clone()
    }

    pub async fn nodes_with_label(&self, label: &str) -> Vec<NodeRecord> {
        self.state
            .read()
            .await
            .nodes
            .values()
            .filter(|n| n.has_label(label))
            .cloned()
            .collect()
    }

    pub async fn find_node(&self, label: &str, key: &str, value: &Value) -> Option<NodeRecord> {
        self.state
            .read()
            .await
            .nodes
            .values()
            .find(|n| n.has_label(label) && n.properties.get(key) == Some(value))
            .cloned()
    }

    pub async fn relationships(&self, rel_type: &str) -> Vec<EdgeRecord> {
        self.state
            .read()
            .await
            .edges
            .iter()
            .filter(|e| e.rel_type == rel_type)
            .cloned()
            .collect()
    }

    /// Insert a node as-is; for seeding aggregation fixtures
    pub async fn insert_node(&self, label: &str, properties: Properties) -> NodeId {
        let mut state = self.state.write().await;
        let id = state.next_id;
        state.next_id += 1;
        state.nodes.insert(id, NodeRecord::new(id, label, properties));
        id
    }

    /// Insert an edge without merge semantics; for seeding aggregation fixtures
    pub async fn insert_edge(
        &self,
        source: NodeId,
        target: NodeId,
        rel_type: &str,
        properties: Properties,
    ) {
        self.state.write().await.edges.push(EdgeRecord {
            source,
            target,
            rel_type: rel_type.to_string(),
            properties,
        });
    }

    /// Rejects map and nested values the way Neo4j does
    fn check_properties(properties: &Properties) -> GraphResult<()> {
        match properties.iter().find(|(_, v)| !is_property_value(v)) {
            Some((key, _)) => Err(GraphError::Neo4j(format!(
                "Property values can only be of primitive types or arrays thereof: {key}"
            ))),
            None => Ok(()),
        }
    }

    fn check(&self) -> GraphResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(GraphError::StoreUnavailable(
                "in-memory store marked unavailable".to_string(),
            ))
        }
    }
}

fn hops_from(
    state: &State,
    start: &NodeRecord,
    undirected: bool,
    allowed: Option<&[NodeId]>,
) -> Vec<PathRecord> {
    let mut paths = Vec::new();
    for edge in &state.edges {
        let other = if edge.source == start.id {
            edge.target
        } else if undirected && edge.target == start.id {
            edge.source
        } else {
            continue;
        };
        if allowed.is_some_and(|ids| !ids.contains(&other)) {
            continue;
        }
        if let Some(end) = state.nodes.get(&other) {
            paths.push(PathRecord::edge(start.clone(), edge.clone(), end.clone()));
        }
    }
    paths
}

#[async_trait]
impl GraphStore for InMemoryGraphStore {
    async fn ping(&self) -> GraphResult<()> {
        self.check()
    }

    async fn ensure_constraints(&self) -> GraphResult<()> {
        self.check()
    }

    async fn execute(&self, cypher: &str, _params: Properties) -> GraphResult<Vec<Properties>> {
        self.check()?;
        let mut state = self.state.write().await;
        state.executed.push(cypher.to_string());

        match state.stubbed.get(cypher) {
            Some(Ok(rows)) => Ok(rows.clone()),
            Some(Err(reason)) => Err(GraphError::Neo4j(reason.clone())),
            None => Ok(Vec::new()),
        }
    }

    async fn merge_node(
        &self,
        label: &str,
        key: &str,
        properties: &Properties,
    ) -> GraphResult<MergeOutcome> {
        self.check()?;
        Self::check_properties(properties)?;
        let key_value = properties
            .get(key)
            .filter(|v| !v.is_null())
            .ok_or_else(|| GraphError::Internal(format!("{label} node without {key}")))?;

        let mut state = self.state.write().await;
        let existing = state
            .nodes
            .values()
            .find(|n| n.has_label(label) && n.properties.get(key) == Some(key_value))
            .map(|n| n.id);

        if let Some(id) = existing {
            if let Some(node) = state.nodes.get_mut(&id) {
                for (k, v) in properties {
                    node.properties.insert(k.clone(), v.clone());
                }
            }
            return Ok(MergeOutcome { id, created: false });
        }

        let id = state.next_id;
        state.next_id += 1;
        state
            .nodes
            .insert(id, NodeRecord::new(id, label, properties.clone()));
        Ok(MergeOutcome { id, created: true })
    }

    async fn merge_relationship(
        &self,
        source: NodeId,
        target: NodeId,
        rel_type: &str,
        properties: &Properties,
    ) -> GraphResult<bool> {
        self.check()?;
        Self::check_properties(properties)?;
        let mut state = self.state.write().await;
        if !state.nodes.contains_key(&source) || !state.nodes.contains_key(&target) {
            return Err(GraphError::EntityNotFound(format!(
                "{rel_type} endpoint {source} or {target}"
            )));
        }

        if let Some(edge) = state
            .edges
            .iter_mut()
            .find(|e| e.source == source && e.target == target && e.rel_type == rel_type)
        {
            edge.properties = properties.clone();
            return Ok(false);
        }

        state.edges.push(EdgeRecord {
            source,
            target,
            rel_type: rel_type.to_string(),
            properties: properties.clone(),
        });
        Ok(true)
    }

    async fn match_paths(&self, pattern: &PatternQuery) -> GraphResult<Vec<PathRecord>> {
        self.check()?;
        let state = self.state.read().await;

        let paths = match pattern {
            PatternQuery::Relationship { kind, limit } => state
                .edges
                .iter()
                .filter(|e| e.rel_type == kind.rel_type())
                .filter_map(|e| {
                    let start = state.nodes.get(&e.source)?;
                    let end = state.nodes.get(&e.target)?;
                    Some(PathRecord::edge(start.clone(), e.clone(), end.clone()))
                })
                .take(*limit)
                .collect(),
            PatternQuery::Neighborhood {
                entity,
                attribute,
                value,
                limit,
            } => {
                let mut paths = Vec::new();
                let matches = state
                    .nodes
                    .values()
                    .filter(|n| {
                        n.has_label(entity.label()) && n.properties.get(attribute) == Some(value)
                    })
                    .take(*limit);
                for node in matches {
                    let hops = hops_from(&state, node, true, None);
                    if hops.is_empty() {
                        paths.push(PathRecord::bare(node.clone()));
                    } else {
                        paths.extend(hops);
                    }
                }
                paths
            }
            PatternQuery::Sample { limit } => {
                let picked: Vec<NodeId> = state.nodes.keys().take(*limit).copied().collect();
                let mut paths = Vec::new();
                for id in &picked {
                    if let Some(node) = state.nodes.get(id) {
                        let hops = hops_from(&state, node, false, Some(picked.as_slice()));
                        if hops.is_empty() {
                            paths.push(PathRecord::bare(node.clone()));
                        } else {
                            paths.extend(hops);
                        }
                    }
                }
                paths
            }
        };

        Ok(paths)
    }

    async fn node(&self, id: NodeId) -> GraphResult<Option<NodeRecord>> {
        self.check()?;
        Ok(self.state.read().await.nodes.get(&id).cloned())
    }

    async fn statistics(&self) -> GraphResult<GraphStatistics> {
        self.check()?;
        let state = self.state.read().await;

        let mut stats = GraphStatistics {
            total_nodes: state.nodes.len(),
            total_relationships: state.edges.len(),
            ..Default::default()
        };
        for node in state.nodes.values() {
            for label in &node.labels {
                *stats.nodes_by_label.entry(label.clone()).or_default() += 1;
            }
        }
        for edge in &state.edges {
            *stats.relationships_by_type.entry(edge.rel_type.clone()).or_default() += 1;
        }

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(value: Value) -> Properties {
        value.as_object().cloned().unwrap_or_default()
    }

    #[tokio::test]
    async fn test_merge_node_is_additive() {
        let store = InMemoryGraphStore::new();

        let first = store
            .merge_node("Wheat", "库编号", &props(json!({"库编号": "ZM1", "芒": "长芒"})))
            .await
            .unwrap();
        let second = store
            .merge_node("Wheat", "库编号", &props(json!({"库编号": "ZM1", "株高": "90"})))
            .await
            .unwrap();

        assert!(first.created);
        assert_eq!(second, MergeOutcome { id: first.id, created: false });
        let node = store.node(first.id).await.unwrap().unwrap();
        assert_eq!(node.properties["芒"], "长芒");
        assert_eq!(node.properties["株高"], "90");
    }

    #[tokio::test]
    async fn test_merge_relationship_replaces_properties() {
        let store = InMemoryGraphStore::new();
        let a = store.insert_node("Wheat", props(json!({"库编号": "ZM1"}))).await;
        let b = store.insert_node("Disease", props(json!({"病害名称": "白粉病"}))).await;

        assert!(store
            .merge_relationship(a, b, "AFFECTED_BY", &props(json!({"白粉严重度": "2"})))
            .await
            .unwrap());
        assert!(!store
            .merge_relationship(a, b, "AFFECTED_BY", &props(json!({"白粉反应型": "R"})))
            .await
            .unwrap());

        let edges = store.relationships("AFFECTED_BY").await;
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].properties, props(json!({"白粉反应型": "R"})));
    }

    #[tokio::test]
    async fn test_map_values_are_rejected() {
        let store = InMemoryGraphStore::new();
        let a = store.insert_node("Wheat", props(json!({"库编号": "ZM1"}))).await;
        let b = store.insert_node("Region", props(json!({"原产地": "北京市"}))).await;

        let err = store
            .merge_node("Wheat", "库编号", &props(json!({"库编号": "ZM2", "芒": {"x": 1}})))
            .await
            .unwrap_err();
        assert!(matches!(err, GraphError::Neo4j(_)));
        assert!(store
            .merge_relationship(a, b, "GROWS_IN", &props(json!({"x": [{"y": 1}]})))
            .await
            .is_err());
        assert!(store.find_node("Wheat", "库编号", &json!("ZM2")).await.is_none());
    }

    #[tokio::test]
    async fn test_unavailable_rejects_everything() {
        let store = InMemoryGraphStore::new();
        store.set_available(false);

        assert!(store.ping().await.unwrap_err().is_store_unavailable());
        assert!(store.statistics().await.unwrap_err().is_store_unavailable());
        assert!(store
            .execute("RETURN 1", Properties::new())
            .await
            .unwrap_err()
            .is_store_unavailable());
    }

    #[tokio::test]
    async fn test_stubbed_execute() {
        let store = InMemoryGraphStore::new();
        store
            .stub_query("MATCH (n) RETURN n.x AS x", vec![props(json!({"x": 1}))])
            .await;

        let rows = store
            .execute("MATCH (n) RETURN n.x AS x", Properties::new())
            .await
            .unwrap();
        assert_eq!(rows, vec![props(json!({"x": 1}))]);
        assert!(store
            .execute("MATCH (m) RETURN m", Properties::new())
            .await
            .unwrap()
            .is_empty());
        assert_eq!(store.executed_queries().await.len(), 2);
    }
}
