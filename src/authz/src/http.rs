//! HTTP boundary
//!
//! ## Endpoints
//!
//! - `POST /v1/authorize` - Authorization check for one action on one target
//! - `GET /v1/scope` - Scope filter for the caller's list queries
//! - `GET /health` - Health check
//! - `GET /metrics` - Prometheus metrics
//!
//! Every failure is answered with the status from
//! [`AuthzError::status_code`] and an [`ErrorResponse`] body.

use crate::error::AuthzError;
use crate::guard::AccessGuard;
use crate::region::RegionTagResolver;
use crate::scope::ScopeFilter;
use crate::types::{Action, ResourceKind, Role, Target};
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    guard: AccessGuard,
    tags: RegionTagResolver,
    start_time: Instant,
}

impl AppState {
    pub fn new(guard: AccessGuard, tags: RegionTagResolver) -> Self {
        Self {
            guard,
            tags,
            start_time: Instant::now(),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Application error type
#[derive(Debug)]
pub struct AppError(AuthzError);

impl From<AuthzError> for AppError {
    fn from(err: AuthzError) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = Json(ErrorResponse {
            error: self.0.code().to_string(),
            message: self.0.to_string(),
        });

        (status, body).into_response()
    }
}

/// Stored resource whose region tag should be read from the directory
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StoredResource {
    Hospital(String),
    Department(String),
}

impl StoredResource {
    pub fn kind(&self) -> ResourceKind {
        match self {
            StoredResource::Hospital(_) => ResourceKind::Hospital,
            StoredResource::Department(_) => ResourceKind::Department,
        }
    }
}

/// Authorization check request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizeRequest {
    pub action: Action,
    pub target: Target,

    /// When set, the target's region is the stored tag of this resource
    #[serde(default)]
    pub stored: Option<StoredResource>,
}

/// Authorization check response
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthorizeResponse {
    pub allowed: bool,
    pub actor: String,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct ScopeParams {
    /// Dotted path of the region sub-document
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

fn default_prefix() -> String {
    "region".to_string()
}

/// Scope response
#[derive(Debug, Serialize, Deserialize)]
pub struct ScopeResponse {
    pub filter: ScopeFilter,
    pub query: Value,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_seconds: u64,
    pub version: String,
}

/// Metrics response (Prometheus format)
struct MetricsResponse {
    metrics: String,
}

impl IntoResponse for MetricsResponse {
    fn into_response(self) -> Response {
        (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4")],
            self.metrics,
        )
            .into_response()
    }
}

fn authorization_header(headers: &HeaderMap) -> Option<&str> {
    headers.get(AUTHORIZATION).and_then(|value| value.to_str().ok())
}

/// POST /v1/authorize - Check authorization
///
/// The caller is authenticated before the body is parsed, so a request
/// without a credential is always 401.
async fn authorize(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<AuthorizeResponse>, AppError> {
    let actor = state.guard.authenticate(authorization_header(&headers)).await?;

    let req: AuthorizeRequest = serde_json::from_slice(&body)
        .map_err(|e| AuthzError::InvalidInput(format!("Invalid request body: {}", e)))?;

    let mut target = req.target;
    if let Some(stored) = &req.stored {
        if stored.kind() != target.kind {
            return Err(AuthzError::InvalidInput(format!(
                "Stored {} reference does not match a {} target",
                stored.kind(),
                target.kind
            ))
            .into());
        }

        target.region = match stored {
            StoredResource::Hospital(id) => state.tags.hospital_tag(id).await?,
            StoredResource::Department(id) => state.tags.department_tag(id).await?,
        };
    }

    state.guard.authorize(&actor, req.action, &target).await?;

    Ok(Json(AuthorizeResponse {
        allowed: true,
        actor: actor.id,
        role: actor.role,
    }))
}

/// GET /v1/scope - Scope filter for the caller
async fn scope(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<ScopeParams>,
) -> Result<Json<ScopeResponse>, AppError> {
    let actor = state.guard.authenticate(authorization_header(&headers)).await?;
    let filter = state.guard.scope(&actor);
    let query = filter.to_document_query(&params.prefix);

    Ok(Json(ScopeResponse { filter, query }))
}

/// GET /health - Health check endpoint
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        version: crate::VERSION.to_string(),
    })
}

/// GET /metrics - Prometheus metrics endpoint
async fn metrics(State(state): State<AppState>) -> MetricsResponse {
    let uptime = state.start_time.elapsed().as_secs();
    let mut metrics = state.guard.metrics().export_prometheus().await;

    metrics.push_str(&format!(
        "\n# HELP authz_uptime_seconds Server uptime in seconds\n\
         # TYPE authz_uptime_seconds gauge\n\
         authz_uptime_seconds {}\n",
        uptime
    ));

    MetricsResponse { metrics }
}

/// Create the HTTP router with all endpoints
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace = TraceLayer::new_for_http().on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/v1/authorize", post(authorize))
        .route("/v1/scope", get(scope))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .layer(ServiceBuilder::new().layer(trace).layer(cors))
        .with_state(state)
}
