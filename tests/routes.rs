mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{state_with, ScriptedExecutor};
use entity_crud::{app_router, common_routes, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

async fn get(state: AppState, uri: &str) -> (StatusCode, Value) {
    let app = app_router(state, 1024 * 1024);
    let res = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn nosql_state() -> AppState {
    state_with(Arc::new(ScriptedExecutor::default()))
}

#[tokio::test]
async fn nosql_supplier_filter() {
    let (status, body) = get(nosql_state(), "/api/v1/people?dataSource=nosql&useAs=supplier").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["meta"]["totalPages"], 1);
    assert_eq!(body["data"][0]["useAs"], "supplier");
}

#[tokio::test]
async fn page_size_is_clamped() {
    let (status, body) = get(nosql_state(), "/api/v1/people?dataSource=fake&pageSize=1000&page=-3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["pageSize"], 100);
    assert_eq!(body["meta"]["page"], 1);
}

#[tokio::test]
async fn unknown_filter_is_bad_request() {
    let (status, body) = get(nosql_state(), "/api/v1/people?dataSource=nosql&password=x").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");
    assert!(body["error"]["message"].as_str().unwrap().contains("password"));
}

#[tokio::test]
async fn disallowed_sort_is_bad_request() {
    let (status, _) = get(nosql_state(), "/api/v1/users?dataSource=fake&sortBy=passwordHash").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn data_source_is_required_and_checked() {
    let (status, _) = get(nosql_state(), "/api/v1/people").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, body) = get(nosql_state(), "/api/v1/people?dataSource=mongo").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"].as_str().unwrap().contains("mongo"));
}

#[tokio::test]
async fn unknown_entity_is_not_found() {
    let (status, _) = get(nosql_state(), "/api/v1/invoices?dataSource=nosql").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn no_matches_is_no_content() {
    let (status, body) = get(nosql_state(), "/api/v1/people?dataSource=nosql&nameOne=Zzzz").await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn hidden_records_on_request() {
    let (status, body) = get(nosql_state(), "/api/v1/people?dataSource=nosql&recordStatus=false").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].as_array().unwrap().iter().all(|p| p["recordStatus"] == false));
}

#[tokio::test]
async fn sql_list_runs_count_then_select() {
    let exec = Arc::new(ScriptedExecutor::page(
        2,
        vec![json!({"id": "a", "nameOne": "María"}), json!({"id": "b", "nameOne": "Marco"})],
    ));
    let (status, body) = get(
        state_with(exec.clone()),
        "/api/v1/people?dataSource=sql&nameOne=*Mar*&sortBy=nameOne&sortDir=asc&pageSize=5",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["meta"], json!({"total": 2, "page": 1, "pageSize": 5, "totalPages": 1}));

    let seen = exec.seen();
    assert_eq!(seen.len(), 2);
    assert_eq!(
        seen[0].0,
        "SELECT COUNT(*) AS total FROM \"people\" WHERE \"recordStatus\" = $1 AND \"nameOne\"::text ILIKE $2"
    );
    assert_eq!(seen[0].1, vec![json!(true), json!("%Mar%")]);
    assert!(seen[1].0.ends_with("ORDER BY \"nameOne\" ASC LIMIT $3 OFFSET $4"));
    assert_eq!(seen[1].1[2..], [json!(5), json!(0)]);
}

#[tokio::test]
async fn sql_failure_is_retried_then_reported() {
    let fail = || Err(entity_crud::AppError::Db(sqlx::Error::Protocol("connection reset".into())));
    let exec = Arc::new(ScriptedExecutor::new(vec![fail(), fail()]));
    let (status, body) = get(state_with(exec.clone()), "/api/v1/people?dataSource=sql").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "database_error");
    assert_eq!(exec.seen().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn slow_database_times_out() {
    let exec = ScriptedExecutor::page(1, vec![json!({"id": "a"})]).with_latency(Duration::from_secs(30));
    let mut state = state_with(Arc::new(exec));
    state.request_timeout = Duration::from_millis(100);
    let (status, body) = get(state, "/api/v1/people?dataSource=sql").await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body["error"]["code"], "timeout");
}

#[tokio::test]
async fn both_sources_side_by_side() {
    let exec = Arc::new(ScriptedExecutor::page(0, Vec::new()));
    let (status, body) = get(state_with(exec), "/api/v1/products?dataSource=both&brand=Andes").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sql"]["meta"]["total"], 0);
    assert_eq!(body["nosql"]["meta"]["total"], 2);
}

#[tokio::test]
async fn sensitive_columns_never_leave() {
    let (status, body) = get(nosql_state(), "/api/v1/users?dataSource=nosql").await;
    assert_eq!(status, StatusCode::OK);
    for user in body["data"].as_array().unwrap() {
        assert!(user.get("email").is_some());
        assert!(user.get("passwordHash").is_none());
        assert!(user.get("passwordResetToken").is_none());
    }

    let exec = Arc::new(ScriptedExecutor::page(1, vec![json!({"id": "u", "passwordHash": "x"})]));
    let (_, body) = get(state_with(exec), "/api/v1/users?dataSource=sql").await;
    assert_eq!(body["data"][0], json!({"id": "u"}));
}

#[tokio::test]
async fn read_by_id() {
    let id = "0b6f8d3e-2c1a-4f7e-9a51-1d2e3f4a5b02";
    let (status, body) = get(nosql_state(), &format!("/api/v1/people/{id}?dataSource=nosql")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], id);
    assert_eq!(body["data"]["nameOne"], "Marco");
    assert_eq!(body.as_object().unwrap().len(), 1);

    let missing = "00000000-0000-4000-8000-000000000000";
    let (status, _) = get(nosql_state(), &format!("/api/v1/people/{missing}?dataSource=fake")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(nosql_state(), "/api/v1/people/not-a-uuid?dataSource=nosql").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn read_by_id_from_sql() {
    let id = "4fad2b7c-6a5e-4dbc-9e95-5b6c7d8e9f01";
    let exec = Arc::new(ScriptedExecutor::new(vec![Ok(vec![json!({"id": id, "passwordHash": "x"})])]));
    let (status, body) = get(state_with(exec.clone()), &format!("/api/v1/users/{id}?dataSource=both")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["sql"], json!({"id": id}));
    assert_eq!(body["data"]["nosql"]["userName"], "admin");
    assert!(body["data"]["nosql"].get("passwordHash").is_none());

    let seen = exec.seen();
    assert_eq!(seen[0].0, "SELECT * FROM \"users\" WHERE \"id\"::text = $1");
    assert_eq!(seen[0].1, vec![json!(id)]);
}

#[tokio::test]
async fn health_and_readiness() {
    let (status, body) = get(nosql_state(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = get(nosql_state(), "/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entities"], 7);

    let (status, body) = get(state_with(Arc::new(ScriptedExecutor::unreachable())), "/ready").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["database"], "unavailable");
}

#[tokio::test]
async fn version_without_state() {
    let res = common_routes()
        .oneshot(Request::builder().uri("/version").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}
