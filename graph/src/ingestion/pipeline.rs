use germplasm_models::{IngestReport, NodeId, Properties, SkipReason, SkippedRow};
use germplasm_observability::{DomainEvent, EventCategory};
use indexmap::IndexMap;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use crate::errors::{GraphError, GraphResult};
use crate::graph_db::{is_property_value, GraphStore};
use crate::schema::{
    disease::column_prefix, disease_relationship_attributes, Disease, EntityKind, RelationKind,
    DISEASE_KEY, REGION_KEY, WHEAT_KEY,
};
use crate::SERVICE_NAME;

use super::source::SourceTable;

/// Writes batches of flat source rows into the graph store
pub struct IngestionPipeline {
    store: Arc<dyn GraphStore>,
}

impl IngestionPipeline {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self { store }
    }

    /// Ingest one batch. Row-level problems are reported in the result; store
    /// failures abort the batch.
    pub async fn ingest(&self, records: Vec<Properties>) -> GraphResult<IngestReport> {
        self.ingest_rows(records.into_iter().enumerate().collect(), Vec::new())
            .await
    }

    /// Ingest a parsed source table. Malformed lines are carried into the
    /// report and row numbers refer to the table.
    pub async fn ingest_table(&self, table: SourceTable) -> GraphResult<IngestReport> {
        self.ingest_rows(table.rows, table.malformed).await
    }

    async fn ingest_rows(
        &self,
        rows: Vec<(usize, Properties)>,
        malformed: Vec<SkippedRow>,
    ) -> GraphResult<IngestReport> {
        let started = Instant::now();
        let mut report = IngestReport {
            records_received: rows.len() + malformed.len(),
            skipped: malformed,
            ..Default::default()
        };

        tracing::info!("🌾 Ingesting batch of {} records", report.records_received);

        let result = self.run(rows, &mut report).await;
        let duration_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(()) => {
                tracing::info!(
                    "✅ Ingestion complete: {} records after dedup, {} nodes and {} relationships created, {} skipped",
                    report.records_deduplicated,
                    report.nodes_created(),
                    report.relationships_created(),
                    report.skipped.len()
                );
                let event = DomainEvent::new(SERVICE_NAME, EventCategory::Ingestion, "ingestion.completed")
                    .duration_ms(duration_ms)
                    .metadata(json!({
                        "records_received": report.records_received,
                        "records_deduplicated": report.records_deduplicated,
                        "nodes_created": report.nodes_created(),
                        "relationships_created": report.relationships_created(),
                        "skipped": report.skipped.len(),
                    }));
                if report.skipped.is_empty() {
                    event.emit();
                } else {
                    event.partial().emit();
                }
            }
            Err(e) => {
                tracing::error!("❌ Ingestion aborted: {}", e);
                DomainEvent::new(SERVICE_NAME, EventCategory::Ingestion, "ingestion.completed")
                    .duration_ms(duration_ms)
                    .failure(e.to_string())
                    .emit();
            }
        }

        result.map(|()| report)
    }

    async fn run(
        &self,
        rows: Vec<(usize, Properties)>,
        report: &mut IngestReport,
    ) -> GraphResult<()> {
        self.store.ensure_constraints().await?;
        let diseases = self.ensure_diseases(report).await?;

        let records = deduplicate(rows);
        report.records_deduplicated = records.len();

        for (row, record) in records {
            let unsupported = unsupported_columns(&record);
            if unsupported.contains(&WHEAT_KEY) {
                tracing::warn!(row, "⚠️ Skipping row with unsupported {} value", WHEAT_KEY);
                report.skipped.push(SkippedRow {
                    row,
                    wheat_key: None,
                    reason: SkipReason::UnsupportedValue {
                        column: WHEAT_KEY.to_string(),
                    },
                });
                continue;
            }

            let Some(wheat_key) = key_string(&record, WHEAT_KEY) else {
                tracing::warn!(row, "⚠️ Skipping row without {}", WHEAT_KEY);
                report.skipped.push(SkippedRow {
                    row,
                    wheat_key: None,
                    reason: SkipReason::MissingWheatKey,
                });
                continue;
            };

            for column in unsupported {
                tracing::warn!(row, wheat_key = %wheat_key, column, "⚠️ Dropping unsupported value");
                report.skipped.push(SkippedRow {
                    row,
                    wheat_key: Some(wheat_key.clone()),
                    reason: SkipReason::UnsupportedValue {
                        column: column.to_string(),
                    },
                });
            }

            let wheat = self
                .store
                .merge_node(
                    EntityKind::Wheat.label(),
                    WHEAT_KEY,
                    &project(&record, EntityKind::Wheat.attributes()),
                )
                .await?;
            report.wheat_nodes.record(wheat.created);

            let region = project(&record, EntityKind::Region.attributes());
            if region.contains_key(REGION_KEY) {
                let region = self
                    .store
                    .merge_node(EntityKind::Region.label(), REGION_KEY, &region)
                    .await?;
                report.region_nodes.record(region.created);

                let created = self
                    .store
                    .merge_relationship(
                        wheat.id,
                        region.id,
                        RelationKind::GrowsIn.rel_type(),
                        &Properties::new(),
                    )
                    .await?;
                report.grows_in.record(created);
            } else {
                tracing::debug!(row, wheat_key = %wheat_key, "No {}; Region skipped", REGION_KEY);
                report.skipped.push(SkippedRow {
                    row,
                    wheat_key: Some(wheat_key.clone()),
                    reason: SkipReason::MissingRegionKey,
                });
            }

            let grouping = group_by_disease(&record, disease_relationship_attributes());
            for prefix in grouping.unresolved {
                tracing::warn!(row, wheat_key = %wheat_key, prefix = %prefix, "⚠️ Unresolved disease column group");
                report.skipped.push(SkippedRow {
                    row,
                    wheat_key: Some(wheat_key.clone()),
                    reason: SkipReason::UnresolvedDiseaseGroup { prefix },
                });
            }
            for (disease, properties) in grouping.groups {
                let disease_id = diseases.get(&disease).copied().ok_or_else(|| {
                    GraphError::Internal(format!("{} node was not created", disease))
                })?;
                let created = self
                    .store
                    .merge_relationship(
                        wheat.id,
                        disease_id,
                        RelationKind::AffectedBy.rel_type(),
                        &properties,
                    )
                    .await?;
                report.affected_by.record(created);
            }
        }

        Ok(())
    }

    async fn ensure_diseases(
        &self,
        report: &mut IngestReport,
    ) -> GraphResult<HashMap<Disease, NodeId>> {
        let mut ids = HashMap::with_capacity(Disease::ALL.len());
        for disease in Disease::ALL {
            let mut properties = Properties::new();
            properties.insert(DISEASE_KEY.to_string(), Value::from(disease.name()));

            let outcome = self
                .store
                .merge_node(EntityKind::Disease.label(), DISEASE_KEY, &properties)
                .await?;
            report.disease_nodes.record(outcome.created);
            ids.insert(disease, outcome.id);
        }
        Ok(ids)
    }
}

/// Key value as text; numbers are rendered, null and missing are absent
fn key_string(record: &Properties, key: &str) -> Option<String> {
    match record.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Declared columns whose value cannot be stored as a property
fn unsupported_columns(record: &Properties) -> Vec<&'static str> {
    EntityKind::Wheat
        .attributes()
        .iter()
        .chain(EntityKind::Region.attributes())
        .copied()
        .chain(disease_relationship_attributes())
        .filter(|column| matches!(record.get(*column), Some(value) if !is_property_value(value)))
        .collect()
}

/// Collapse rows sharing a Wheat key.
///
/// Later non-null values overwrite earlier ones field by field; the merged row
/// takes the position of the last occurrence. Rows without a key pass through
/// untouched. Each surviving row keeps the index it was given.
pub fn deduplicate(rows: Vec<(usize, Properties)>) -> Vec<(usize, Properties)> {
    let mut slots: Vec<Option<(usize, Properties)>> = Vec::with_capacity(rows.len());
    let mut by_key: HashMap<String, usize> = HashMap::new();

    for (row, record) in rows {
        let Some(key) = key_string(&record, WHEAT_KEY) else {
            slots.push(Some((row, record)));
            continue;
        };

        let merged = match by_key.get(&key).and_then(|&slot| slots[slot].take()) {
            Some((_, mut earlier)) => {
                for (column, value) in record {
                    if !value.is_null() || !earlier.contains_key(&column) {
                        earlier.insert(column, value);
                    }
                }
                earlier
            }
            None => record,
        };

        by_key.insert(key, slots.len());
        slots.push(Some((row, merged)));
    }

    slots.into_iter().flatten().collect()
}

/// Non-null storable values of the given columns; everything else is dropped
pub fn project(record: &Properties, columns: &[&str]) -> Properties {
    columns
        .iter()
        .filter_map(|&column| match record.get(column) {
            Some(value) if storable(value) => Some((column.to_string(), value.clone())),
            _ => None,
        })
        .collect()
}

/// Disease columns of one row, bundled per canonical disease
#[derive(Debug, Default, PartialEq)]
pub struct DiseaseGrouping {
    /// Only groups with at least one non-null value, in column order
    pub groups: Vec<(Disease, Properties)>,
    /// Prefixes with values but no canonical disease
    pub unresolved: Vec<String>,
}

/// Partition the non-null storable values of `columns` by two-character
/// prefix and resolve each prefix through the disease table
pub fn group_by_disease<'a>(
    record: &Properties,
    columns: impl IntoIterator<Item = &'a str>,
) -> DiseaseGrouping {
    let mut by_prefix: IndexMap<String, Properties> = IndexMap::new();
    for column in columns {
        match record.get(column) {
            Some(value) if storable(value) => {
                by_prefix
                    .entry(column_prefix(column))
                    .or_default()
                    .insert(column.to_string(), value.clone());
            }
            _ => {}
        }
    }

    let mut grouping = DiseaseGrouping::default();
    for (prefix, properties) in by_prefix {
        match Disease::from_prefix(&prefix) {
            Some(disease) => grouping.groups.push((disease, properties)),
            None => grouping.unresolved.push(prefix),
        }
    }
    grouping
}

fn storable(value: &Value) -> bool {
    !value.is_null() && is_property_value(value)
}
