use actix_web::{web, HttpResponse};
use germplasm_models::QuestionRequest;

use crate::errors::{GraphError, GraphResult};
use crate::state::AppState;

pub async fn ask_question(
    state: web::Data<AppState>,
    req: web::Json<QuestionRequest>,
) -> GraphResult<HttpResponse> {
    let question = req
        .into_inner()
        .question
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| GraphError::InvalidRequest("question must not be empty".to_string()))?;

    let answer = state.translation.answer(&question).await?;
    Ok(HttpResponse::Ok().json(answer))
}
