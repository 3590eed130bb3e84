//! Tabular rows to graph: source reading, deduplication, projection and merge.

pub mod pipeline;
pub mod source;

pub use pipeline::{deduplicate, group_by_disease, project, DiseaseGrouping, IngestionPipeline};
pub use source::{read_csv, read_csv_path, SourceTable};
