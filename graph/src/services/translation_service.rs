use germplasm_models::{PipelineStage, Properties, QuestionAnswer};
use germplasm_observability::{DomainEvent, EventCategory};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;

use crate::errors::{GraphError, GraphResult};
use crate::graph_db::GraphStore;
use crate::llm::TextGenerator;
use crate::schema;
use crate::SERVICE_NAME;

/// Fixed reply for questions whose query matched nothing
pub const EMPTY_ANSWER: &str = "抱歉，暂未查询到相关信息。";

const TRANSLATE_FAILED: &str = "查询语句生成失败";
const VERBALIZE_FAILED: &str = "结果转换失败";

fn translate_prompt(question: &str) -> String {
    format!(
        "任务：将用户问题转换为 Neo4j 的 Cypher 查询语句。\n\n\
         {schema}\n\
         用户问题：{question}\n\
         请输出严格符合 Neo4j 语法的 Cypher 语句，无需额外解释，无需额外符号，纯文本形式。",
        schema = schema::describe(),
    )
}

fn verbalize_prompt(question: &str, result: &str) -> String {
    format!(
        "用户问题：{question}\n\
         Neo4j 查询结果：{result}\n\
         请将查询结果对应转换成自然语言，要求一一对应，不额外解释。若出现查询结果完全一样的情况，只需陈述其一即可。\
         严格要求：对于名称等专业名词不允许进行修改，无需任何额外解释，不应出现“等”字样。\n\
         如果查询结果为空，回复“{EMPTY_ANSWER}”"
    )
}

/// Question to Cypher to answer, through a text generator and the graph store
pub struct TranslationPipeline {
    store: Arc<dyn GraphStore>,
    llm: Arc<dyn TextGenerator>,
}

impl TranslationPipeline {
    pub fn new(store: Arc<dyn GraphStore>, llm: Arc<dyn TextGenerator>) -> Self {
        Self { store, llm }
    }

    /// Answer one question.
    ///
    /// Text-generation failures are reported inside the answer with
    /// `failed_stage` set. Store failures are returned as errors.
    pub async fn answer(&self, question: &str) -> GraphResult<QuestionAnswer> {
        let started = Instant::now();
        tracing::info!("❓ Question: {}", question);

        let formal_query = match self.translate(question).await {
            Ok(query) => query,
            Err(e) => {
                return Ok(self.finish(
                    started,
                    QuestionAnswer {
                        question: question.to_string(),
                        formal_query: String::new(),
                        raw_result: Vec::new(),
                        answer: format!("{TRANSLATE_FAILED}：{}", stage_reason(&e)),
                        failed_stage: Some(PipelineStage::Translate),
                    },
                ))
            }
        };
        tracing::debug!(query = %formal_query, "Generated Cypher");

        let raw_result = match self.execute(&formal_query).await {
            Ok(rows) => rows,
            Err(e) => {
                DomainEvent::new(SERVICE_NAME, EventCategory::Question, "question.answered")
                    .duration_ms(started.elapsed().as_millis() as u64)
                    .failure(e.to_string())
                    .metadata(json!({ "failed_stage": PipelineStage::Execute }))
                    .emit();
                return Err(e);
            }
        };

        let (answer, failed_stage) = if raw_result.is_empty() {
            (EMPTY_ANSWER.to_string(), None)
        } else {
            match self.verbalize(question, &raw_result).await {
                Ok(answer) => (answer, None),
                Err(e) => (
                    format!("{VERBALIZE_FAILED}：{}", stage_reason(&e)),
                    Some(PipelineStage::Verbalize),
                ),
            }
        };

        Ok(self.finish(
            started,
            QuestionAnswer {
                question: question.to_string(),
                formal_query,
                raw_result,
                answer,
                failed_stage,
            },
        ))
    }

    /// Model output is taken verbatim as the query text
    pub async fn translate(&self, question: &str) -> GraphResult<String> {
        self.llm
            .complete(&translate_prompt(question))
            .await
            .map_err(|e| GraphError::TranslationService {
                stage: PipelineStage::Translate,
                reason: e.to_string(),
            })
    }

    pub async fn execute(&self, formal_query: &str) -> GraphResult<Vec<Properties>> {
        self.store
            .execute(formal_query, Properties::new())
            .await
            .map_err(|e| match e {
                GraphError::StoreUnavailable(_) => e,
                other => GraphError::QueryExecution {
                    query: formal_query.to_string(),
                    reason: other.to_string(),
                },
            })
    }

    pub async fn verbalize(&self, question: &str, raw_result: &[Properties]) -> GraphResult<String> {
        let result = serde_json::to_string(raw_result)?;
        self.llm
            .complete(&verbalize_prompt(question, &result))
            .await
            .map_err(|e| GraphError::TranslationService {
                stage: PipelineStage::Verbalize,
                reason: e.to_string(),
            })
    }

    fn finish(&self, started: Instant, answer: QuestionAnswer) -> QuestionAnswer {
        let event = DomainEvent::new(SERVICE_NAME, EventCategory::Question, "question.answered")
            .duration_ms(started.elapsed().as_millis() as u64)
            .metadata(json!({
                "rows": answer.raw_result.len(),
                "failed_stage": answer.failed_stage,
            }));

        match answer.failed_stage {
            Some(stage) => {
                tracing::warn!("⚠️ Question answered with {} failure", stage);
                event.partial().emit();
            }
            None => {
                tracing::info!("✅ Answered from {} rows", answer.raw_result.len());
                event.emit();
            }
        }
        answer
    }
}

fn stage_reason(e: &GraphError) -> String {
    match e {
        GraphError::TranslationService { reason, .. } => reason.clone(),
        other => other.to_string(),
    }
}
