mod common;

use common::{props, ScriptedGenerator};
use germplasm_models::PipelineStage;
use serde_json::json;
use std::sync::Arc;
use wheat_graph::graph_db::InMemoryGraphStore;
use wheat_graph::llm::LlmError;
use wheat_graph::services::{TranslationPipeline, EMPTY_ANSWER};
use wheat_graph::GraphError;

const ORIGIN_QUERY: &str =
    "MATCH (w:Wheat {品种名称: '京411'})-[:GROWS_IN]->(r:Region) RETURN r.原产地 AS 原产地";

#[tokio::test]
async fn test_answers_from_query_rows() {
    let store = Arc::new(InMemoryGraphStore::new());
    store
        .stub_query(ORIGIN_QUERY, vec![props(json!({"原产地": "北京市"}))])
        .await;
    let llm = Arc::new(ScriptedGenerator::replying(&[ORIGIN_QUERY, "京411的原产地是北京市。"]));

    let answer = TranslationPipeline::new(store.clone(), llm.clone())
        .answer("京411的原产地是哪里？")
        .await
        .unwrap();

    assert_eq!(answer.formal_query, ORIGIN_QUERY);
    assert_eq!(answer.raw_result, vec![props(json!({"原产地": "北京市"}))]);
    assert_eq!(answer.answer, "京411的原产地是北京市。");
    assert_eq!(answer.failed_stage, None);

    let prompts = llm.prompts();
    assert!(prompts[0].contains("京411的原产地是哪里？"));
    assert!(prompts[0].contains("AFFECTED_BY"));
    assert!(prompts[1].contains("北京市"));
    assert_eq!(store.executed_queries().await, vec![ORIGIN_QUERY.to_string()]);
}

#[tokio::test]
async fn test_generated_text_is_used_verbatim() {
    let store = Arc::new(InMemoryGraphStore::new());
    let padded = format!("  {ORIGIN_QUERY}\n");
    let llm = Arc::new(ScriptedGenerator::replying(&[padded.as_str()]));

    let answer = TranslationPipeline::new(store.clone(), llm)
        .answer("q")
        .await
        .unwrap();

    assert_eq!(answer.formal_query, padded);
    assert_eq!(store.executed_queries().await, vec![padded]);
}

#[tokio::test]
async fn test_empty_result_returns_fixed_reply() {
    let store = Arc::new(InMemoryGraphStore::new());
    let llm = Arc::new(ScriptedGenerator::replying(&["MATCH (n:Wheat {品种名称: '不存在'}) RETURN n"]));

    let answer = TranslationPipeline::new(store, llm.clone())
        .answer("不存在的品种有哪些病害？")
        .await
        .unwrap();

    assert!(answer.raw_result.is_empty());
    assert_eq!(answer.answer, EMPTY_ANSWER);
    assert_eq!(answer.answer, "抱歉，暂未查询到相关信息。");
    assert_eq!(llm.prompts().len(), 1);
}

#[tokio::test]
async fn test_translate_failure_becomes_message() {
    let store = Arc::new(InMemoryGraphStore::new());
    let llm = Arc::new(ScriptedGenerator::new(vec![Err(LlmError::Api {
        status: 429,
        body: "quota exceeded".to_string(),
    })]));

    let answer = TranslationPipeline::new(store.clone(), llm)
        .answer("京411的株高？")
        .await
        .unwrap();

    assert_eq!(answer.failed_stage, Some(PipelineStage::Translate));
    assert!(answer.answer.starts_with("查询语句生成失败："));
    assert!(answer.answer.contains("quota exceeded"));
    assert!(answer.formal_query.is_empty());
    assert!(store.executed_queries().await.is_empty());
}

#[tokio::test]
async fn test_verbalize_failure_keeps_raw_result() {
    let store = Arc::new(InMemoryGraphStore::new());
    store
        .stub_query(ORIGIN_QUERY, vec![props(json!({"原产地": "北京市"}))])
        .await;
    let llm = Arc::new(ScriptedGenerator::new(vec![
        Ok(ORIGIN_QUERY.to_string()),
        Err(LlmError::EmptyResponse),
    ]));

    let answer = TranslationPipeline::new(store, llm)
        .answer("京411的原产地是哪里？")
        .await
        .unwrap();

    assert_eq!(answer.failed_stage, Some(PipelineStage::Verbalize));
    assert!(answer.answer.starts_with("结果转换失败："));
    assert_eq!(answer.raw_result.len(), 1);
}

#[tokio::test]
async fn test_rejected_query_is_execution_error() {
    let store = Arc::new(InMemoryGraphStore::new());
    store.stub_rejection("MATCH (n RETURN n", "Invalid input ')'").await;
    let llm = Arc::new(ScriptedGenerator::replying(&["MATCH (n RETURN n"]));

    let err = TranslationPipeline::new(store, llm)
        .answer("q")
        .await
        .unwrap_err();

    match err {
        GraphError::QueryExecution { query, reason } => {
            assert_eq!(query, "MATCH (n RETURN n");
            assert!(reason.contains("Invalid input"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_unreachable_store_propagates() {
    let store = Arc::new(InMemoryGraphStore::new());
    store.set_available(false);
    let llm = Arc::new(ScriptedGenerator::replying(&["RETURN 1"]));

    let err = TranslationPipeline::new(store, llm)
        .answer("q")
        .await
        .unwrap_err();

    assert!(err.is_store_unavailable());
}
