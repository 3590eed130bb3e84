use germplasm_config::ViewLimits;
use germplasm_models::{GraphStatistics, GraphView, NodeId, NodeRecord};
use germplasm_observability::{DomainEvent, EventCategory};
use indexmap::IndexMap;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::errors::{GraphError, GraphResult};
use crate::graph_db::{GraphStore, PathRecord, PatternQuery};
use crate::schema::{EntityKind, RelationKind};
use crate::SERVICE_NAME;

pub const WHEAT_REGION_VIEW: &str = "wheat-region";
pub const WHEAT_DISEASE_VIEW: &str = "wheat-disease";

/// Merge several path-query results into one visualization set.
///
/// Nodes are unique by id in first-seen order, carrying the properties of their
/// last observation. Every observed relationship instance is kept.
pub fn aggregate<I>(results: I) -> GraphView
where
    I: IntoIterator<Item = Vec<PathRecord>>,
{
    let mut nodes: IndexMap<NodeId, NodeRecord> = IndexMap::new();
    let mut relationships = Vec::new();

    for paths in results {
        for path in paths {
            nodes.insert(path.start.id, path.start);
            if let Some(hop) = path.hop {
                nodes.insert(hop.end.id, hop.end);
                relationships.push(hop.relationship);
            }
        }
    }

    GraphView {
        nodes: nodes.into_values().collect(),
        relationships,
    }
}

/// Read-only graph views for visualization
pub struct AggregationService {
    store: Arc<dyn GraphStore>,
    limits: ViewLimits,
}

impl AggregationService {
    pub fn new(store: Arc<dyn GraphStore>, limits: ViewLimits) -> Self {
        Self { store, limits }
    }

    /// A small sample of both relationship types
    pub async fn overview(&self) -> GraphResult<GraphView> {
        let diseases = self
            .store
            .match_paths(&PatternQuery::Relationship {
                kind: RelationKind::AffectedBy,
                limit: self.limits.overview_per_type,
            })
            .await?;
        let regions = self
            .store
            .match_paths(&PatternQuery::Relationship {
                kind: RelationKind::GrowsIn,
                limit: self.limits.overview_per_type,
            })
            .await?;

        Ok(served(EventCategory::View, "overview", aggregate([diseases, regions])))
    }

    /// One relationship type at its configured bound; unknown names fall back
    /// to the overview
    pub async fn typed_view(&self, view_type: &str) -> GraphResult<GraphView> {
        let (kind, limit) = match view_type {
            WHEAT_REGION_VIEW => (RelationKind::GrowsIn, self.limits.grows_in),
            WHEAT_DISEASE_VIEW => (RelationKind::AffectedBy, self.limits.affected_by),
            other => {
                tracing::debug!(view_type = other, "Unknown view type, serving overview");
                return self.overview().await;
            }
        };

        let paths = self
            .store
            .match_paths(&PatternQuery::Relationship { kind, limit })
            .await?;
        Ok(served(EventCategory::View, view_type, aggregate([paths])))
    }

    /// Nodes of `entity_type` whose `attribute` equals `value`, plus their
    /// direct neighbors
    pub async fn neighborhood(
        &self,
        entity_type: &str,
        attribute: &str,
        value: Value,
        limit: Option<usize>,
    ) -> GraphResult<GraphView> {
        let entity = EntityKind::from_label(entity_type)
            .ok_or_else(|| GraphError::InvalidEntityType(entity_type.to_string()))?;
        if !entity.has_attribute(attribute) {
            return Err(GraphError::UnknownAttribute {
                entity: entity_type.to_string(),
                attribute: attribute.to_string(),
            });
        }

        tracing::info!("🔍 Searching {} where {} = {}", entity, attribute, value);
        let paths = self
            .store
            .match_paths(&PatternQuery::Neighborhood {
                entity,
                attribute: attribute.to_string(),
                value,
                limit: limit.unwrap_or(self.limits.search),
            })
            .await?;

        Ok(served(EventCategory::Search, "search", aggregate([paths])))
    }

    /// The first `limit` nodes and the relationships among them
    pub async fn sample(&self, limit: Option<usize>) -> GraphResult<GraphView> {
        let paths = self
            .store
            .match_paths(&PatternQuery::Sample {
                limit: limit.unwrap_or(self.limits.sample),
            })
            .await?;
        Ok(served(EventCategory::View, "sample", aggregate([paths])))
    }

    pub async fn node(&self, id: NodeId) -> GraphResult<NodeRecord> {
        self.store
            .node(id)
            .await?
            .ok_or_else(|| GraphError::EntityNotFound(format!("node {}", id)))
    }

    pub async fn statistics(&self) -> GraphResult<GraphStatistics> {
        self.store.statistics().await
    }
}

fn served(category: EventCategory, view: &str, graph: GraphView) -> GraphView {
    DomainEvent::new(SERVICE_NAME, category, "view.served")
        .metadata(json!({
            "view": view,
            "nodes": graph.nodes.len(),
            "relationships": graph.relationships.len(),
        }))
        .emit();
    graph
}
