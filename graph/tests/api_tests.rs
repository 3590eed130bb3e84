mod common;

use actix_web::{http::StatusCode, test, web, App};
use common::{props, ScriptedGenerator};
use germplasm_config::ViewLimits;
use serde_json::{json, Value};
use std::sync::Arc;
use wheat_graph::graph_db::InMemoryGraphStore;
use wheat_graph::{handlers, AppState};

fn app_state(store: Arc<InMemoryGraphStore>, replies: &[&str]) -> web::Data<AppState> {
    web::Data::new(AppState::new(
        store,
        Arc::new(ScriptedGenerator::replying(replies)),
        ViewLimits::default(),
    ))
}

fn batch() -> Value {
    json!({
        "records": [
            {"库编号": "ZM1", "品种名称": "京411", "原产地": "北京市", "条锈严重度": "3"},
            {"库编号": "ZM2", "品种名称": "石4185", "原产地": null},
        ]
    })
}

#[actix_web::test]
async fn test_health() {
    let store = Arc::new(InMemoryGraphStore::new());
    let app = test::init_service(
        App::new()
            .app_data(app_state(store.clone(), &[]))
            .configure(handlers::configure),
    )
    .await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    store.set_available(false);
    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "unhealthy");
}

#[actix_web::test]
async fn test_ingest_then_view() {
    let store = Arc::new(InMemoryGraphStore::new());
    let app = test::init_service(
        App::new()
            .app_data(app_state(store, &[]))
            .configure(handlers::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/graph/ingest")
        .set_json(batch())
        .to_request();
    let report: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(report["wheat_nodes"]["created"], 2);
    assert_eq!(report["affected_by"]["created"], 1);
    assert_eq!(report["skipped"][0]["reason"], "missing_region_key");

    let req = test::TestRequest::get()
        .uri("/api/graph/view/wheat-disease")
        .to_request();
    let view: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(view["relationships"][0]["type"], "AFFECTED_BY");
    assert_eq!(view["relationships"][0]["properties"]["条锈严重度"], "3");
    assert_eq!(view["nodes"].as_array().unwrap().len(), 2);

    let req = test::TestRequest::get().uri("/api/graph/overview").to_request();
    let view: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(view["relationships"].as_array().unwrap().len(), 2);

    let req = test::TestRequest::get().uri("/api/graph/statistics").to_request();
    let stats: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(stats["nodes_by_label"]["Disease"], 7);
}

#[actix_web::test]
async fn test_ingest_with_nested_value_still_succeeds() {
    let store = Arc::new(InMemoryGraphStore::new());
    let app = test::init_service(
        App::new()
            .app_data(app_state(store.clone(), &[]))
            .configure(handlers::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/graph/ingest")
        .set_json(json!({
            "records": [
                {"库编号": "ZM1", "芒": {"x": 1}, "原产地": "北京市"},
                {"库编号": "ZM2", "芒": "长芒", "原产地": "河北"},
            ]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let report: Value = test::read_body_json(resp).await;
    assert_eq!(report["wheat_nodes"]["created"], 2);
    assert_eq!(report["skipped"][0]["reason"], "unsupported_value");
    assert_eq!(report["skipped"][0]["column"], "芒");
}

#[actix_web::test]
async fn test_search_validation() {
    let app = test::init_service(
        App::new()
            .app_data(app_state(Arc::new(InMemoryGraphStore::new()), &[]))
            .configure(handlers::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/graph/search")
        .set_json(json!({"entity_type": "Wheat", "property_key": "品种名称"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/graph/search")
        .set_json(json!({"entity_type": "Rice", "property_key": "品种名称", "property_value": "x"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["kind"], "invalid_request");
}

#[actix_web::test]
async fn test_search_and_node_detail() {
    let store = Arc::new(InMemoryGraphStore::new());
    let id = store
        .insert_node("Wheat", props(json!({"库编号": "ZM1", "品种名称": "京411"})))
        .await;
    let app = test::init_service(
        App::new()
            .app_data(app_state(store, &[]))
            .configure(handlers::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/graph/search")
        .set_json(json!({"entity_type": "Wheat", "property_key": "品种名称", "property_value": "京411"}))
        .to_request();
    let view: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(view["nodes"][0]["id"], id);

    let req = test::TestRequest::get()
        .uri(&format!("/api/graph/nodes/{id}"))
        .to_request();
    let node: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(node["labels"], json!(["Wheat"]));

    let req = test::TestRequest::get().uri("/api/graph/nodes/404").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_question_endpoint() {
    let app = test::init_service(
        App::new()
            .app_data(app_state(Arc::new(InMemoryGraphStore::new()), &["MATCH (n) RETURN n"]))
            .configure(handlers::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/graph/question")
        .set_json(json!({"question": "  "}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/graph/question")
        .set_json(json!({"question": "有哪些小麦？"}))
        .to_request();
    let answer: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(answer["formal_query"], "MATCH (n) RETURN n");
    assert_eq!(answer["raw_result"], json!([]));
    assert_eq!(answer["answer"], "抱歉，暂未查询到相关信息。");
    assert!(answer.get("failed_stage").is_none());
}

#[actix_web::test]
async fn test_unavailable_store_maps_to_503() {
    let store = Arc::new(InMemoryGraphStore::new());
    store.set_available(false);
    let app = test::init_service(
        App::new()
            .app_data(app_state(store, &[]))
            .configure(handlers::configure),
    )
    .await;

    for uri in ["/api/graph/overview", "/api/graph/sample?limit=5", "/api/graph/statistics"] {
        let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE, "{uri}");
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["kind"], "store_unavailable");
    }
}
