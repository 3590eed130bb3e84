//! Wire and result types shared by the wheat germplasm graph service and its clients.

pub mod graph;
pub mod ingestion;
pub mod question;

pub use graph::*;
pub use ingestion::*;
pub use question::*;

/// Property bag carried by nodes, relationships and source records.
pub type Properties = serde_json::Map<String, serde_json::Value>;
