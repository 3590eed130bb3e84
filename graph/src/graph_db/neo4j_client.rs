use async_trait::async_trait;
use germplasm_config::Neo4jConfig;
use germplasm_models::{EdgeRecord, GraphStatistics, NodeId, NodeRecord, Properties};
use neo4rs::{
    query, BoltList, BoltMap, BoltNull, BoltString, BoltType, ConfigBuilder, Graph, Node, Query,
    Relation, Row,
};
use serde_json::Value;
use std::sync::Arc;

use super::{GraphStore, MergeOutcome, PathRecord, PatternQuery};
use crate::errors::{GraphError, GraphResult};
use crate::schema::EntityKind;

/// Neo4j client compatible with both local Neo4j and Neo4j AuraDB
pub struct Neo4jClient {
    graph: Arc<Graph>,
    uri: String,
}

impl Neo4jClient {
    /// Connect and run a test query.
    ///
    /// Supported URIs:
    ///   - Local: `bolt://localhost:7687`
    ///   - AuraDB: `neo4j+s://xxxxx.databases.neo4j.io` or `neo4j+ssc://...`
    pub async fn connect(config: &Neo4jConfig) -> GraphResult<Self> {
        tracing::info!("🔷 Connecting to Neo4j at: {}", config.uri);

        let neo4j_config = ConfigBuilder::default()
            .uri(config.uri.as_str())
            .user(config.user.as_str())
            .password(config.password.as_str())
            .db(config.database.as_str())
            .fetch_size(config.fetch_size)
            .max_connections(config.max_connections)
            .build()
            .map_err(|e| GraphError::Neo4j(format!("Failed to build Neo4j config: {}", e)))?;

        let graph = Graph::connect(neo4j_config).await.map_err(store_error)?;

        let client = Self {
            graph: Arc::new(graph),
            uri: config.uri.clone(),
        };
        client.ping().await?;
        tracing::info!("✅ Neo4j connection established successfully");

        Ok(client)
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn is_aura(&self) -> bool {
        self.uri.contains("neo4j.io")
            || self.uri.starts_with("neo4j+s://")
            || self.uri.starts_with("neo4j+ssc://")
    }

    async fn rows(&self, q: Query) -> GraphResult<Vec<Row>> {
        let mut result = self.graph.execute(q).await.map_err(store_error)?;

        let mut rows = Vec::new();
        while let Some(row) = result.next().await.map_err(store_error)? {
            rows.push(row);
        }
        Ok(rows)
    }

    async fn count(&self, cypher: &str) -> GraphResult<usize> {
        let rows = self.rows(query(cypher)).await?;
        match rows.first() {
            Some(row) => Ok(row.get::<i64>("count").map_err(decode_error)?.max(0) as usize),
            None => Ok(0),
        }
    }

    fn pattern_query(pattern: &PatternQuery) -> Query {
        let q = query(&pattern_cypher(pattern));
        match pattern {
            PatternQuery::Relationship { limit, .. } | PatternQuery::Sample { limit } => {
                q.param("limit", bolt_limit(*limit))
            }
            PatternQuery::Neighborhood {
                attribute,
                value,
                limit,
                ..
            } => q
                .param("attribute", attribute.as_str())
                .param("value", to_bolt(value))
                .param("limit", bolt_limit(*limit)),
        }
    }
}

fn pattern_cypher(pattern: &PatternQuery) -> String {
    match pattern {
        PatternQuery::Relationship { kind, .. } => format!(
            "MATCH (n)-[r:{}]->(m) RETURN n, r, m LIMIT $limit",
            escape_identifier(kind.rel_type())
        ),
        PatternQuery::Neighborhood { entity, .. } => format!(
            "MATCH (n:{}) WHERE n[$attribute] = $value \
             WITH n LIMIT $limit \
             OPTIONAL MATCH (n)-[r]-(m) \
             RETURN n, r, m",
            escape_identifier(entity.label())
        ),
        PatternQuery::Sample { .. } => "MATCH (n) WITH n LIMIT $limit \
             WITH collect(n) AS picked \
             UNWIND picked AS n \
             OPTIONAL MATCH (n)-[r]->(m) WHERE m IN picked \
             RETURN n, r, m"
            .to_string(),
    }
}

/// The `__created` marker only survives the MERGE when it ran ON CREATE
fn merge_node_cypher(label: &str, key: &str) -> String {
    format!(
        "MERGE (n:{} {{{}: $key}}) \
         ON CREATE SET n.`__created` = true \
         WITH n, coalesce(n.`__created`, false) AS created \
         REMOVE n.`__created` \
         SET n += $props \
         RETURN id(n) AS node_id, created",
        escape_identifier(label),
        escape_identifier(key)
    )
}

fn merge_relationship_cypher(rel_type: &str) -> String {
    let rel = escape_identifier(rel_type);
    format!(
        "MATCH (a) WHERE id(a) = $source \
         MATCH (b) WHERE id(b) = $target \
         OPTIONAL MATCH (a)-[existing:{rel}]->(b) \
         WITH a, b, count(existing) AS existing \
         MERGE (a)-[r:{rel}]->(b) \
         SET r = $props \
         RETURN existing = 0 AS created"
    )
}

/// Bolt integers are signed
fn bolt_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

#[async_trait]
impl GraphStore for Neo4jClient {
    async fn ping(&self) -> GraphResult<()> {
        let rows = self.rows(query("RETURN 1 AS test")).await?;
        if rows.is_empty() {
            return Err(GraphError::StoreUnavailable(
                "connection test returned no rows".to_string(),
            ));
        }
        Ok(())
    }

    async fn ensure_constraints(&self) -> GraphResult<()> {
        for kind in EntityKind::ALL {
            let cypher = format!(
                "CREATE CONSTRAINT {}_key IF NOT EXISTS FOR (n:{}) REQUIRE n.{} IS UNIQUE",
                kind.label().to_lowercase(),
                escape_identifier(kind.label()),
                escape_identifier(kind.key_attribute())
            );
            self.graph.run(query(&cypher)).await.map_err(store_error)?;
        }
        tracing::debug!("Key constraints ensured");
        Ok(())
    }

    async fn execute(&self, cypher: &str, params: Properties) -> GraphResult<Vec<Properties>> {
        let mut q = query(cypher);
        for (key, value) in &params {
            q = q.param(key.as_str(), to_bolt(value));
        }

        self.rows(q)
            .await?
            .iter()
            .map(|row| row.to::<Properties>().map_err(decode_error))
            .collect()
    }

    async fn merge_node(
        &self,
        label: &str,
        key: &str,
        properties: &Properties,
    ) -> GraphResult<MergeOutcome> {
        let key_value = properties
            .get(key)
            .filter(|v| !v.is_null())
            .ok_or_else(|| GraphError::Internal(format!("{label} node without {key}")))?;

        let cypher = merge_node_cypher(label, key);

        let rows = self
            .rows(
                query(&cypher)
                    .param("key", to_bolt(key_value))
                    .param("props", BoltType::Map(to_bolt_map(properties))),
            )
            .await?;
        let row = rows
            .first()
            .ok_or_else(|| GraphError::Neo4j(format!("MERGE on {label} returned no row")))?;

        Ok(MergeOutcome {
            id: row.get::<i64>("node_id").map_err(decode_error)?,
            created: row.get::<bool>("created").map_err(decode_error)?,
        })
    }

    async fn merge_relationship(
        &self,
        source: NodeId,
        target: NodeId,
        rel_type: &str,
        properties: &Properties,
    ) -> GraphResult<bool> {
        let cypher = merge_relationship_cypher(rel_type);

        let rows = self
            .rows(
                query(&cypher)
                    .param("source", source)
                    .param("target", target)
                    .param("props", BoltType::Map(to_bolt_map(properties))),
            )
            .await?;

        match rows.first() {
            Some(row) => row.get::<bool>("created").map_err(decode_error),
            None => Err(GraphError::EntityNotFound(format!(
                "{rel_type} endpoint {source} or {target}"
            ))),
        }
    }

    async fn match_paths(&self, pattern: &PatternQuery) -> GraphResult<Vec<PathRecord>> {
        let rows = self.rows(Self::pattern_query(pattern)).await?;

        let mut paths = Vec::with_capacity(rows.len());
        for row in &rows {
            let start = node_record(&row.get::<Node>("n").map_err(decode_error)?)?;
            let relation = row.get::<Option<Relation>>("r").map_err(decode_error)?;
            let end = row.get::<Option<Node>>("m").map_err(decode_error)?;

            paths.push(match (relation, end) {
                (Some(relation), Some(end)) => {
                    PathRecord::edge(start, edge_record(&relation)?, node_record(&end)?)
                }
                _ => PathRecord::bare(start),
            });
        }

        tracing::debug!(?pattern, paths = paths.len(), "Pattern query matched");
        Ok(paths)
    }

    async fn node(&self, id: NodeId) -> GraphResult<Option<NodeRecord>> {
        let rows = self
            .rows(query("MATCH (n) WHERE id(n) = $id RETURN n").param("id", id))
            .await?;

        match rows.first() {
            Some(row) => Ok(Some(node_record(&row.get::<Node>("n").map_err(decode_error)?)?)),
            None => Ok(None),
        }
    }

    async fn statistics(&self) -> GraphResult<GraphStatistics> {
        let mut stats = GraphStatistics {
            total_nodes: self.count("MATCH (n) RETURN count(n) AS count").await?,
            total_relationships: self.count("MATCH ()-[r]->() RETURN count(r) AS count").await?,
            ..Default::default()
        };

        let rows = self
            .rows(query(
                "MATCH (n) UNWIND labels(n) AS label RETURN label, count(*) AS count",
            ))
            .await?;
        for row in &rows {
            let label: String = row.get("label").map_err(decode_error)?;
            let count: i64 = row.get("count").map_err(decode_error)?;
            stats.nodes_by_label.insert(label, count.max(0) as usize);
        }

        let rows = self
            .rows(query(
                "MATCH ()-[r]->() RETURN type(r) AS rel_type, count(r) AS count",
            ))
            .await?;
        for row in &rows {
            let rel_type: String = row.get("rel_type").map_err(decode_error)?;
            let count: i64 = row.get("count").map_err(decode_error)?;
            stats.relationships_by_type.insert(rel_type, count.max(0) as usize);
        }

        Ok(stats)
    }
}

/// Connection-level failures mean the store is unreachable; everything else is a
/// store-side rejection
fn store_error(e: neo4rs::Error) -> GraphError {
    match &e {
        neo4rs::Error::IOError { .. } | neo4rs::Error::ConnectionError => {
            GraphError::StoreUnavailable(e.to_string())
        }
        _ => GraphError::Neo4j(e.to_string()),
    }
}

fn decode_error(e: impl std::fmt::Display) -> GraphError {
    GraphError::Neo4j(format!("Failed to decode row: {}", e))
}

/// Backtick-quote a label, relationship type or property name
fn escape_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

fn node_record(node: &Node) -> GraphResult<NodeRecord> {
    let mut properties = Properties::new();
    for key in node.keys() {
        let value: Value = node.get(key).map_err(decode_error)?;
        properties.insert(key.to_string(), value);
    }

    Ok(NodeRecord {
        id: node.id(),
        labels: node.labels().iter().map(|l| l.to_string()).collect(),
        properties,
    })
}

fn edge_record(relation: &Relation) -> GraphResult<EdgeRecord> {
    let mut properties = Properties::new();
    for key in relation.keys() {
        let value: Value = relation.get(key).map_err(decode_error)?;
        properties.insert(key.to_string(), value);
    }

    Ok(EdgeRecord {
        source: relation.start_node_id(),
        target: relation.end_node_id(),
        rel_type: relation.typ().to_string(),
        properties,
    })
}

fn to_bolt(value: &Value) -> BoltType {
    match value {
        Value::Null => BoltType::Null(BoltNull),
        Value::Bool(b) => BoltType::from(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => BoltType::from(i),
            None => BoltType::from(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => BoltType::from(s.as_str()),
        Value::Array(items) => {
            BoltType::List(BoltList::from(items.iter().map(to_bolt).collect::<Vec<_>>()))
        }
        Value::Object(map) => BoltType::Map(to_bolt_map(map)),
    }
}

fn to_bolt_map(map: &Properties) -> BoltMap {
    let mut bolt = BoltMap::with_capacity(map.len());
    for (key, value) in map {
        bolt.put(BoltString::from(key.as_str()), to_bolt(value));
    }
    bolt
}
