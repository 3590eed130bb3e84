use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use germplasm_models::PipelineStage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GraphError {
    /// The store cannot be reached. Never retried inside this crate.
    #[error("Graph store unavailable: {0}")]
    StoreUnavailable(String),

    /// The store was reached but rejected or failed the operation
    #[error("Neo4j error: {0}")]
    Neo4j(String),

    /// A generated formal query was rejected by the store
    #[error("Query execution failed: {reason}")]
    QueryExecution { query: String, reason: String },

    #[error("Translation service error during {stage}: {reason}")]
    TranslationService { stage: PipelineStage, reason: String },

    #[error("Invalid entity type: {0}")]
    InvalidEntityType(String),

    #[error("Unknown attribute {attribute} for entity {entity}")]
    UnknownAttribute { entity: String, attribute: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl GraphError {
    /// Stable category name reported to callers alongside the message
    pub fn kind(&self) -> &'static str {
        match self {
            GraphError::StoreUnavailable(_) => "store_unavailable",
            GraphError::Neo4j(_) => "store_error",
            GraphError::QueryExecution { .. } => "query_execution",
            GraphError::Csv(_) => "source_data",
            GraphError::TranslationService { .. } => "translation_service",
            GraphError::InvalidEntityType(_)
            | GraphError::UnknownAttribute { .. }
            | GraphError::InvalidRequest(_) => "invalid_request",
            GraphError::EntityNotFound(_) => "not_found",
            GraphError::Serialization(_) | GraphError::Io(_) | GraphError::Internal(_) => {
                "internal"
            }
        }
    }

    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, GraphError::StoreUnavailable(_))
    }
}

impl ResponseError for GraphError {
    fn status_code(&self) -> StatusCode {
        match self {
            GraphError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            GraphError::QueryExecution { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            GraphError::EntityNotFound(_) => StatusCode::NOT_FOUND,
            GraphError::InvalidEntityType(_)
            | GraphError::UnknownAttribute { .. }
            | GraphError::InvalidRequest(_)
            | GraphError::Csv(_) => StatusCode::BAD_REQUEST,
            GraphError::TranslationService { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.to_string(),
            "kind": self.kind(),
        }))
    }
}

pub type GraphResult<T> = Result<T, GraphError>;
