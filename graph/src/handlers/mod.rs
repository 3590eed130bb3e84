pub mod graph_handler;
pub mod ingest_handler;
pub mod question_handler;

pub use graph_handler::*;
pub use ingest_handler::*;
pub use question_handler::*;

use actix_web::web;

/// Ingest batches are whole crawler exports
const JSON_PAYLOAD_LIMIT: usize = 32 * 1024 * 1024;

/// Register every route of the service
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().limit(JSON_PAYLOAD_LIMIT))
        .route("/health", web::get().to(health))
        .service(
            web::scope("/api/graph")
                // Visualization views
                .route("/overview", web::get().to(get_overview))
                .route("/view/{view_type}", web::get().to(get_view))
                .route("/sample", web::get().to(get_sample))
                .route("/search", web::post().to(search))
                .route("/nodes/{id}", web::get().to(get_node))
                .route("/statistics", web::get().to(get_statistics))
                // Question answering
                .route("/question", web::post().to(ask_question))
                // Ingestion
                .route("/ingest", web::post().to(ingest_records)),
        );
}
