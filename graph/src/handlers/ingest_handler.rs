use actix_web::{web, HttpResponse};
use germplasm_models::IngestRequest;

use crate::errors::GraphResult;
use crate::state::AppState;

pub async fn ingest_records(
    state: web::Data<AppState>,
    req: web::Json<IngestRequest>,
) -> GraphResult<HttpResponse> {
    let report = state.ingest(req.into_inner().records).await?;
    Ok(HttpResponse::Ok().json(report))
}
