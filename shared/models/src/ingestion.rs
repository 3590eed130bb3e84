use serde::{Deserialize, Serialize};

use crate::Properties;

/// Batch of flat source rows (`POST /api/graph/ingest`).
///
/// A JSON `null` is the absent marker; an empty string is a present value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestRequest {
    pub records: Vec<Properties>,
}

/// Created vs. already-present counts for one kind of node or edge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeCounts {
    pub created: usize,
    pub updated: usize,
}

impl MergeCounts {
    pub fn record(&mut self, created: bool) {
        if created {
            self.created += 1;
        } else {
            self.updated += 1;
        }
    }

    pub fn total(&self) -> usize {
        self.created + self.updated
    }
}

/// Why a row, or part of a row, was not written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum SkipReason {
    /// The row has no Wheat key; nothing was written for it
    MissingWheatKey,
    /// The row has no origin; its Wheat node was written but no Region or GROWS_IN
    MissingRegionKey,
    /// A disease column prefix has no canonical disease
    UnresolvedDiseaseGroup { prefix: String },
    /// The source line could not be parsed; nothing was written for it
    MalformedRow { detail: String },
    /// The value is not storable as a property (objects, nested or mixed
    /// arrays). Only this column was dropped unless it is the Wheat key.
    UnsupportedValue { column: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRow {
    /// Zero-based position in the submitted batch, or data-row index of the
    /// source table
    pub row: usize,
    pub wheat_key: Option<String>,
    #[serde(flatten)]
    pub reason: SkipReason,
}

/// Summary of one ingestion batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngestReport {
    pub records_received: usize,
    pub records_deduplicated: usize,
    pub wheat_nodes: MergeCounts,
    pub region_nodes: MergeCounts,
    pub disease_nodes: MergeCounts,
    pub grows_in: MergeCounts,
    pub affected_by: MergeCounts,
    pub skipped: Vec<SkippedRow>,
}

impl IngestReport {
    pub fn skipped_count(&self, reason: &SkipReason) -> usize {
        self.skipped.iter().filter(|s| &s.reason == reason).count()
    }

    pub fn nodes_created(&self) -> usize {
        self.wheat_nodes.created + self.region_nodes.created + self.disease_nodes.created
    }

    pub fn relationships_created(&self) -> usize {
        self.grows_in.created + self.affected_by.created
    }
}
