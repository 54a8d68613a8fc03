use crate::dao::LinkStore;
use crate::error::ShortenerError;
use crate::model::{AnalyticsReport, CreatedLink, HealthStatus, LinkSpecification, Statistics};
use crate::utils::{client_address, get_header};
use axum::extract::rejection::JsonRejection;
use axum::extract::{ConnectInfo, Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

const REDIRECT_CACHE_CONTROL: &str = "no-store";

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<LinkStore>,
    pub default_validity_minutes: i64,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(store: LinkStore, default_validity_minutes: i64) -> Self {
        Self {
            store: Arc::new(store),
            default_validity_minutes,
            started_at: Utc::now(),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let router = Router::new()
        .route("/shorturls", post(create_link))
        .route("/shorturls/:shortcode", get(get_link_analytics))
        .route("/api/statistics", get(get_statistics))
        .route("/health", get(health))
        .route("/:shortcode", get(redirect))
        .with_state(state);
    apply_middleware(router)
}

pub fn apply_middleware(router: Router) -> Router {
    router
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else {
        "handler panicked".to_string()
    };
    ShortenerError::Internal(message).into_response()
}

pub async fn create_link(
    State(state): State<AppState>,
    payload: Result<Json<LinkSpecification>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedLink>), ShortenerError> {
    let Json(specification) =
        payload.map_err(|rejection| ShortenerError::MalformedBody(rejection.body_text()))?;

    let url = specification
        .url
        .filter(|url| !url.trim().is_empty())
        .ok_or(ShortenerError::MissingField("url"))?;
    let validity = parse_validity(specification.validity, state.default_validity_minutes)?;
    let custom_code = specification
        .shortcode
        .as_deref()
        .filter(|code| !code.is_empty());

    let created = state.store.create(&url, validity, custom_code)?;
    Ok((StatusCode::CREATED, Json(created)))
}

fn parse_validity(value: Option<Value>, default_minutes: i64) -> Result<i64, ShortenerError> {
    match value {
        None | Some(Value::Null) => Ok(default_minutes),
        Some(Value::Number(number)) => number
            .as_i64()
            .filter(|minutes| *minutes > 0)
            .ok_or(ShortenerError::InvalidValidity),
        Some(_) => Err(ShortenerError::InvalidValidity),
    }
}

pub async fn redirect(
    State(state): State<AppState>,
    Path(shortcode): Path<String>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
) -> Result<Response, ShortenerError> {
    let link = state
        .store
        .resolve(&shortcode)
        .ok_or(ShortenerError::NotFound)?;

    let referrer = get_header("Referer", &headers);
    let user_agent = get_header("User-Agent", &headers);
    let address = client_address(&headers, peer.map(|ConnectInfo(addr)| addr));
    state.store.record_click(
        &shortcode,
        referrer.as_deref(),
        user_agent.as_deref(),
        address,
    );
    tracing::debug!(short_code = %shortcode, target = %link.original_url, "Redirecting");

    Ok((
        StatusCode::FOUND,
        [
            (header::LOCATION, link.original_url),
            (header::CACHE_CONTROL, REDIRECT_CACHE_CONTROL.to_string()),
        ],
    )
        .into_response())
}

pub async fn get_link_analytics(
    State(state): State<AppState>,
    Path(shortcode): Path<String>,
) -> Result<Json<AnalyticsReport>, ShortenerError> {
    state
        .store
        .get_analytics(&shortcode)
        .map(Json)
        .ok_or(ShortenerError::NotFound)
}

pub async fn get_statistics(State(state): State<AppState>) -> Json<Statistics> {
    Json(state.store.statistics())
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = Utc::now();
    Json(HealthStatus {
        status: "healthy",
        timestamp: now,
        uptime: (now - state.started_at).num_seconds().max(0),
    })
}
