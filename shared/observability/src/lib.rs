//! Observability for the wheat germplasm graph service.
//!
//! - Tracing subscriber setup with pretty or JSON output
//! - Structured domain events for ingestion batches, views and questions

pub mod domain_events;
pub mod init;

pub use domain_events::*;
pub use init::*;

// Re-export tracing for convenience
pub use tracing::{debug, error, info, instrument, warn, Instrument, Level};
