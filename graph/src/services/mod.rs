pub mod aggregation_service;
pub mod translation_service;

pub use aggregation_service::{aggregate, AggregationService};
pub use translation_service::{TranslationPipeline, EMPTY_ANSWER};
