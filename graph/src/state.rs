use germplasm_config::ViewLimits;
use germplasm_models::{IngestReport, Properties};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::errors::GraphResult;
use crate::graph_db::GraphStore;
use crate::ingestion::IngestionPipeline;
use crate::llm::TextGenerator;
use crate::services::{AggregationService, TranslationPipeline};

/// Shared application state handed to every handler
pub struct AppState {
    pub store: Arc<dyn GraphStore>,
    pub aggregation: AggregationService,
    pub translation: TranslationPipeline,
    ingestion: IngestionPipeline,
    ingest_lock: Mutex<()>,
}

impl AppState {
    pub fn new(store: Arc<dyn GraphStore>, llm: Arc<dyn TextGenerator>, limits: ViewLimits) -> Self {
        Self {
            aggregation: AggregationService::new(store.clone(), limits),
            translation: TranslationPipeline::new(store.clone(), llm),
            ingestion: IngestionPipeline::new(store.clone()),
            ingest_lock: Mutex::new(()),
            store,
        }
    }

    /// Run one ingestion batch; concurrent batches wait their turn
    pub async fn ingest(&self, records: Vec<Properties>) -> GraphResult<IngestReport> {
        let _guard = self.ingest_lock.lock().await;
        self.ingestion.ingest(records).await
    }
}
