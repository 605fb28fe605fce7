//! HTTP boundary tests
//!
//! Drives the router in-process with `tower::ServiceExt::oneshot`.

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use chrono::Duration;
use healthgrid_authz::{
    http::{create_router, AppState, AuthorizeResponse, ErrorResponse, HealthResponse, ScopeResponse},
    identity::{InMemoryPrincipalStore, PrincipalRecord},
    region::{InMemoryRegionDirectory, RegionTagResolver},
    AccessGuard, DecisionEngine, IdentityResolver, JwtVerifier, MetricsCollector,
    RegionDescriptor, Role, ScopeFilter,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

async fn app() -> (Router, JwtVerifier) {
    let jwt = JwtVerifier::new("http-secret", "healthgrid");

    let principals = Arc::new(InMemoryPrincipalStore::new());
    principals
        .put(PrincipalRecord::new(
            "district-a",
            Role::DistrictAdmin,
            RegionDescriptor::new().with_state("X").with_district("A"),
        ))
        .await;
    principals
        .put(PrincipalRecord::new(
            "hospital-h1",
            Role::HospitalAdmin,
            RegionDescriptor::new()
                .with_state("X")
                .with_district("A")
                .with_hospital("h1"),
        ))
        .await;
    principals
        .put(PrincipalRecord::new("broken", Role::StateAdmin, RegionDescriptor::new()))
        .await;

    let directory = Arc::new(InMemoryRegionDirectory::new());
    directory
        .put_hospital("h1", RegionDescriptor::new().with_state("X").with_district("A"))
        .await;
    directory
        .put_hospital("h9", RegionDescriptor::new().with_state("X").with_district("B"))
        .await;
    directory.put_department("d9", "h9").await;

    let identity = IdentityResolver::new(Arc::new(jwt.clone()), principals);
    let guard = AccessGuard::new(
        identity,
        DecisionEngine::standard(),
        Arc::new(MetricsCollector::new()),
    );
    let state = AppState::new(guard, RegionTagResolver::new(directory));

    (create_router(state), jwt)
}

fn authorize_request(token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/v1/authorize")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn read_json<T: DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// ============================================================================
// POST /v1/authorize
// ============================================================================

#[tokio::test]
async fn test_authorize_allowed() {
    let (app, jwt) = app().await;
    let token = jwt.issue_token("district-a", Duration::hours(1)).unwrap();

    let response = app
        .oneshot(authorize_request(
            Some(&token),
            json!({
                "action": "create",
                "target": {"kind": "report", "region": {"state": "X", "district": "A", "hospitalId": "h1"}}
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: AuthorizeResponse = read_json(response).await;
    assert!(body.allowed);
    assert_eq!(body.actor, "district-a");
    assert_eq!(body.role, Role::DistrictAdmin);
}

#[tokio::test]
async fn test_out_of_region_is_forbidden() {
    let (app, jwt) = app().await;
    let token = jwt.issue_token("district-a", Duration::hours(1)).unwrap();

    let response = app
        .oneshot(authorize_request(
            Some(&token),
            json!({
                "action": "create",
                "target": {"kind": "report", "region": {"state": "X", "district": "B"}}
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body: ErrorResponse = read_json(response).await;
    assert_eq!(body.error, "out_of_region");
}

#[tokio::test]
async fn test_role_escalation_is_forbidden() {
    let (app, jwt) = app().await;
    let token = jwt.issue_token("hospital-h1", Duration::hours(1)).unwrap();

    let response = app
        .oneshot(authorize_request(
            Some(&token),
            json!({
                "action": "create",
                "target": {
                    "kind": "user",
                    "region": {"state": "X", "district": "A", "hospitalId": "h1"},
                    "role": "district-admin"
                }
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body: ErrorResponse = read_json(response).await;
    assert_eq!(body.error, "role_escalation");
}

#[tokio::test]
async fn test_stored_tag_overrides_payload_region() {
    let (app, jwt) = app().await;
    let token = jwt.issue_token("district-a", Duration::hours(1)).unwrap();

    // The payload claims district A but the department lives under h9 in B
    let response = app
        .oneshot(authorize_request(
            Some(&token),
            json!({
                "action": "update",
                "target": {"kind": "department", "region": {"state": "X", "district": "A"}},
                "stored": {"department": "d9"}
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_missing_credential_is_unauthorized() {
    let (app, _) = app().await;

    let response = app
        .oneshot(authorize_request(
            None,
            json!({"action": "read", "target": {"kind": "report"}}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: ErrorResponse = read_json(response).await;
    assert_eq!(body.error, "unauthenticated");
}

#[tokio::test]
async fn test_unknown_stored_resource_is_bad_request() {
    let (app, jwt) = app().await;
    let token = jwt.issue_token("district-a", Duration::hours(1)).unwrap();

    let response = app
        .oneshot(authorize_request(
            Some(&token),
            json!({
                "action": "read",
                "target": {"kind": "hospital"},
                "stored": {"hospital": "nope"}
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_credential_with_malformed_body_is_unauthorized() {
    let (app, _) = app().await;

    let request = Request::builder()
        .method("POST")
        .uri("/v1/authorize")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: ErrorResponse = read_json(response).await;
    assert_eq!(body.error, "unauthenticated");
}

#[tokio::test]
async fn test_underscore_role_is_invalid_input() {
    let (app, jwt) = app().await;
    let token = jwt.issue_token("district-a", Duration::hours(1)).unwrap();

    let response = app
        .oneshot(authorize_request(
            Some(&token),
            json!({"action": "read", "target": {"kind": "user", "role": "super_admin"}}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = read_json(response).await;
    assert_eq!(body.error, "invalid_input");
}

#[tokio::test]
async fn test_stored_reference_must_match_target_kind() {
    let (app, jwt) = app().await;
    let token = jwt.issue_token("district-a", Duration::hours(1)).unwrap();

    // h1 is inside district A, so only the kind mismatch can reject this
    let response = app
        .oneshot(authorize_request(
            Some(&token),
            json!({
                "action": "read",
                "target": {"kind": "report", "region": {"state": "X", "district": "A"}},
                "stored": {"hospital": "h1"}
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = read_json(response).await;
    assert_eq!(body.error, "invalid_input");
}

// ============================================================================
// GET /v1/scope
// ============================================================================

#[tokio::test]
async fn test_scope_for_district_admin() {
    let (app, jwt) = app().await;
    let token = jwt.issue_token("district-a", Duration::hours(1)).unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/scope?prefix=meta.region")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: ScopeResponse = read_json(response).await;
    assert!(matches!(body.filter, ScopeFilter::Levels { ref constraints } if constraints.len() == 2));
    assert_eq!(
        body.query["$and"][1],
        json!({"meta.region.district": {"$in": ["A", null, ""]}})
    );
}

#[tokio::test]
async fn test_scope_for_misconfigured_actor_is_empty() {
    let (app, jwt) = app().await;
    let token = jwt.issue_token("broken", Duration::hours(1)).unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/scope")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let body: ScopeResponse = read_json(response).await;
    assert_eq!(body.filter, ScopeFilter::Nothing);
    assert_eq!(body.query, json!({"_id": {"$in": []}}));
}

// ============================================================================
// Health and metrics
// ============================================================================

#[tokio::test]
async fn test_health() {
    let (app, _) = app().await;

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: HealthResponse = read_json(response).await;
    assert_eq!(body.status, "healthy");
    assert_eq!(body.version, healthgrid_authz::VERSION);
}

#[tokio::test]
async fn test_metrics_reflect_decisions() {
    let (app, jwt) = app().await;
    let token = jwt.issue_token("district-a", Duration::hours(1)).unwrap();

    let response = app
        .clone()
        .oneshot(authorize_request(
            Some(&token),
            json!({
                "action": "read",
                "target": {"kind": "report", "region": {"state": "Y"}}
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("authz_decisions_total 1"));
    assert!(text.contains("authz_denied_total{reason=\"out_of_region\"} 1"));
    assert!(text.contains("authz_uptime_seconds"));
}
