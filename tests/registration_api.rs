//! Registration client and probe against an in-process GraphQL server

use std::sync::{Arc, Mutex};

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};

use newsdesk_ops::config::ProbeConfig;
use newsdesk_ops::graphql::{
    GraphqlClient, GraphqlError, GraphqlRegistrationApi, RegistrationApi,
};
use newsdesk_ops::models::{RegistrationFilter, RegistrationStatus};
use newsdesk_ops::probe::{self, ProbeOutcome};

const TOKEN: &str = "admin-secret";

#[derive(Debug, Clone)]
struct Recorded {
    authorization: Option<String>,
    operation: String,
    variables: Value,
}

#[derive(Default)]
struct FakeServer {
    requests: Mutex<Vec<Recorded>>,
}

fn request_item(email: &str, status: &str) -> Value {
    json!({
        "id": email,
        "email": email,
        "name": "Test User",
        "requestedRole": "AUTHOR",
        "status": status,
        "createdAt": 1_767_225_600_000i64
    })
}

async fn graphql(
    State(server): State<Arc<FakeServer>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let operation = body["operationName"].as_str().unwrap_or_default().to_string();
    let variables = body["variables"].clone();

    server.requests.lock().unwrap().push(Recorded {
        authorization: authorization.clone(),
        operation: operation.clone(),
        variables: variables.clone(),
    });

    if authorization.as_deref() != Some(&format!("Bearer {}", TOKEN)) {
        return (
            StatusCode::OK,
            Json(json!({
                "data": null,
                "errors": [{
                    "message": "Not authenticated",
                    "extensions": {"code": "UNAUTHENTICATED"}
                }]
            })),
        );
    }

    match operation.as_str() {
        "RegistrationRequestStats" => (
            StatusCode::OK,
            Json(json!({
                "data": {
                    "registrationRequestStats": {
                        "total": 14,
                        "pendingVerification": 2,
                        "pendingApproval": 5,
                        "approved": 4,
                        "rejected": 1,
                        "expired": 2
                    }
                }
            })),
        ),
        "RegistrationRequests" => match variables["status"].as_str() {
            Some("REJECTED") => (
                StatusCode::OK,
                Json(json!({
                    "data": null,
                    "errors": [{
                        "message": "Rejected requests are archived",
                        "path": ["registrationRequests"],
                        "locations": [{"line": 3, "column": 3}],
                        "extensions": {"code": "INTERNAL_SERVER_ERROR"}
                    }]
                })),
            ),
            Some(status) => (
                StatusCode::OK,
                Json(json!({
                    "data": {
                        "registrationRequests": {
                            "items": [request_item("filtered@example.com", status)],
                            "total": 1,
                            "hasMore": false
                        }
                    }
                })),
            ),
            None => {
                let items: Vec<Value> = (0..10)
                    .map(|i| request_item(&format!("user{}@example.com", i), "PENDING_APPROVAL"))
                    .collect();
                (
                    StatusCode::OK,
                    Json(json!({
                        "data": {
                            "registrationRequests": {
                                "items": items,
                                "total": 14,
                                "hasMore": true
                            }
                        }
                    })),
                )
            }
        },
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({"errors": [{"message": "Unknown operation"}]})),
        ),
    }
}

async fn broken() -> (StatusCode, &'static str) {
    (StatusCode::BAD_GATEWAY, "upstream unavailable")
}

async fn spawn_server() -> (String, Arc<FakeServer>) {
    let server = Arc::new(FakeServer::default());
    let app = Router::new()
        .route("/graphql", post(graphql))
        .route("/broken", post(broken))
        .with_state(server.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), server)
}

fn api(endpoint: &str, token: &str) -> GraphqlRegistrationApi {
    GraphqlRegistrationApi::new(GraphqlClient::new(endpoint, token).unwrap())
}

#[tokio::test]
async fn test_stats_sends_bearer_token() {
    let (base, server) = spawn_server().await;

    let stats = api(&format!("{}/graphql", base), TOKEN).stats().await.unwrap();

    assert_eq!(stats.total, 14);
    assert_eq!(stats.count_for(RegistrationStatus::PendingApproval), 5);

    let requests = server.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].authorization.as_deref(), Some("Bearer admin-secret"));
    assert_eq!(requests[0].operation, "RegistrationRequestStats");
}

#[tokio::test]
async fn test_unfiltered_list_omits_status_variable() {
    let (base, server) = spawn_server().await;

    let page = api(&format!("{}/graphql", base), TOKEN)
        .list(RegistrationFilter::first_page(10))
        .await
        .unwrap();

    assert_eq!(page.items.len(), 10);
    assert_eq!(page.total, 14);
    assert!(page.has_more);
    assert!(page.items[0].created_at.is_some());

    let requests = server.requests.lock().unwrap();
    assert_eq!(requests[0].variables, json!({"limit": 10, "offset": 0}));
}

#[tokio::test]
async fn test_wrong_token_surfaces_error_code() {
    let (base, _server) = spawn_server().await;

    let err = api(&format!("{}/graphql", base), "wrong").stats().await.unwrap_err();

    assert!(matches!(err, GraphqlError::Response { .. }));
    assert_eq!(err.sub_errors()[0].code(), Some("UNAUTHENTICATED"));
}

#[tokio::test]
async fn test_non_json_error_status() {
    let (base, _server) = spawn_server().await;

    let err = api(&format!("{}/broken", base), TOKEN).stats().await.unwrap_err();

    match err {
        GraphqlError::Status { status, body } => {
            assert_eq!(status, 502);
            assert_eq!(body, "upstream unavailable");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

async fn closed_endpoint() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/graphql", addr)
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_error() {
    let err = api(&closed_endpoint().await, TOKEN)
        .stats()
        .await
        .unwrap_err();

    assert!(matches!(err, GraphqlError::Transport(_)));
    let detail = err.detail();
    assert!(detail.starts_with("Request failed: "));
    assert!(
        detail.to_lowercase().contains("refused"),
        "cause missing from {detail:?}"
    );
}

#[tokio::test]
async fn test_battery_failure_names_the_refused_connection() {
    let config = ProbeConfig {
        endpoint: closed_endpoint().await,
        admin_token: Some(TOKEN.to_string()),
        run: true,
    };
    let mut out = Vec::new();

    let outcome = probe::execute(&config, &mut out, |endpoint, token| {
        GraphqlClient::new(endpoint, token).map(GraphqlRegistrationApi::new)
    })
    .await
    .unwrap();
    let output = String::from_utf8(out).unwrap();

    assert_eq!(outcome, ProbeOutcome::Failed);
    let failure = output
        .lines()
        .find(|line| line.starts_with("❌ Probe failed: "))
        .expect("failure line");
    assert!(failure.to_lowercase().contains("refused"), "{failure}");
}

#[tokio::test]
async fn test_probe_battery_end_to_end() {
    let (base, server) = spawn_server().await;
    let config = ProbeConfig {
        endpoint: format!("{}/graphql", base),
        admin_token: Some(TOKEN.to_string()),
        run: true,
    };
    let mut out = Vec::new();

    let outcome = probe::execute(&config, &mut out, |endpoint, token| {
        GraphqlClient::new(endpoint, token).map(GraphqlRegistrationApi::new)
    })
    .await
    .unwrap();
    let output = String::from_utf8(out).unwrap();

    assert_eq!(
        outcome,
        ProbeOutcome::Completed {
            failed_statuses: vec![RegistrationStatus::Rejected]
        }
    );
    assert!(output.contains("\"pendingApproval\": 5"));
    assert!(output.contains("   Returned: 10"));
    assert!(output.contains("   Total:    14"));
    assert!(output.contains("   Has more: true"));
    assert!(output.contains(
        "   - user2@example.com | Test User | PENDING_APPROVAL | AUTHOR | 2026-01-01 00:00:00 UTC"
    ));
    assert!(!output.contains("user3@example.com"));
    assert!(output.contains("   APPROVED: 1"));
    assert!(output.contains(
        "   REJECTED: ❌ RegistrationRequests returned error: Rejected requests are archived"
    ));
    assert!(output.contains("   EXPIRED: 1"));

    let requests = server.requests.lock().unwrap();
    let statuses: Vec<Value> = requests.iter().map(|r| r.variables["status"].clone()).collect();
    assert_eq!(
        statuses,
        vec![
            Value::Null,
            Value::Null,
            json!("PENDING_APPROVAL"),
            json!("PENDING_VERIFICATION"),
            json!("APPROVED"),
            json!("REJECTED"),
            json!("EXPIRED"),
        ]
    );
}

#[tokio::test]
async fn test_probe_without_run_sends_nothing() {
    let (base, server) = spawn_server().await;
    let config = ProbeConfig {
        endpoint: format!("{}/graphql", base),
        admin_token: Some(TOKEN.to_string()),
        run: false,
    };
    let mut out = Vec::new();

    let outcome = probe::execute(&config, &mut out, |endpoint, token| {
        GraphqlClient::new(endpoint, token).map(GraphqlRegistrationApi::new)
    })
    .await
    .unwrap();

    assert_eq!(outcome, ProbeOutcome::InstructionsOnly);
    assert!(server.requests.lock().unwrap().is_empty());
}
