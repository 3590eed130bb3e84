use actix_web::{web, HttpResponse};
use germplasm_models::{NodeId, SearchRequest};
use serde::Deserialize;
use serde_json::json;

use crate::errors::{GraphError, GraphResult};
use crate::state::AppState;
use crate::SERVICE_NAME;

#[derive(Debug, Deserialize)]
pub struct SampleQuery {
    pub limit: Option<usize>,
}

pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    match state.store.ping().await {
        Ok(()) => HttpResponse::Ok().json(json!({
            "status": "healthy",
            "service": SERVICE_NAME,
            "store": "connected",
        })),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            HttpResponse::ServiceUnavailable().json(json!({
                "status": "unhealthy",
                "service": SERVICE_NAME,
                "error": e.to_string(),
            }))
        }
    }
}

pub async fn get_overview(state: web::Data<AppState>) -> GraphResult<HttpResponse> {
    let view = state.aggregation.overview().await?;
    Ok(HttpResponse::Ok().json(view))
}

pub async fn get_view(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> GraphResult<HttpResponse> {
    let view = state.aggregation.typed_view(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(view))
}

pub async fn get_sample(
    state: web::Data<AppState>,
    query: web::Query<SampleQuery>,
) -> GraphResult<HttpResponse> {
    let view = state.aggregation.sample(query.limit).await?;
    Ok(HttpResponse::Ok().json(view))
}

pub async fn search(
    state: web::Data<AppState>,
    req: web::Json<SearchRequest>,
) -> GraphResult<HttpResponse> {
    let req = req.into_inner();
    let (Some(key), Some(value)) = (req.property_key, req.property_value) else {
        return Err(GraphError::InvalidRequest(
            "property_key and property_value are required".to_string(),
        ));
    };

    let view = state
        .aggregation
        .neighborhood(&req.entity_type, &key, value, req.limit)
        .await?;
    Ok(HttpResponse::Ok().json(view))
}

pub async fn get_node(
    state: web::Data<AppState>,
    path: web::Path<NodeId>,
) -> GraphResult<HttpResponse> {
    let node = state.aggregation.node(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(node))
}

pub async fn get_statistics(state: web::Data<AppState>) -> GraphResult<HttpResponse> {
    let stats = state.aggregation.statistics().await?;
    Ok(HttpResponse::Ok().json(stats))
}
