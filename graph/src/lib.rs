//! Wheat germplasm knowledge graph.
//!
//! Flat crawler rows are merged into a Neo4j property graph of Wheat, Region
//! and Disease nodes. The graph is served as deduplicated visualization views
//! and through a question pipeline that has a text generator write Cypher.

pub mod errors;
pub mod graph_db;
pub mod handlers;
pub mod ingestion;
pub mod llm;
pub mod schema;
pub mod services;
pub mod state;

pub use errors::{GraphError, GraphResult};
pub use state::AppState;

/// Service name used in logs, events and health responses
pub const SERVICE_NAME: &str = "wheat-graph";
