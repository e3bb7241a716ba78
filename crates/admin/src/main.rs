//! Vendora admin server.
//!
//! Serves the store-owner dashboard on port 3001: revenue and order stats,
//! category and product management, store settings. Plain form posts and
//! server-rendered pages; the platform API holds all durable state.
//!
//! # Security
//!
//! This is the one binary that holds the store API key. The key lives in
//! config only: sessions carry no key material, and the login form checks
//! candidate keys against the platform without persisting them.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, Response, StatusCode};
use axum::{Router, routing::get};
use sentry::integrations::tracing as sentry_tracing;
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vendora_admin::config::AdminConfig;
use vendora_admin::middleware::{
    create_session_layer, request_id_middleware, security_headers_middleware,
};
use vendora_admin::routes;
use vendora_admin::state::AppState;

/// Start error reporting if a DSN is configured.
///
/// The returned guard flushes queued events on drop, so it has to live for
/// the whole run of `main`.
fn init_sentry(config: &AdminConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let options = sentry::ClientOptions {
        release: sentry::release_name!(),
        environment: Some(config.sentry_environment.clone().into()),
        sample_rate: config.sentry_sample_rate,
        traces_sample_rate: config.sentry_traces_sample_rate,
        attach_stacktrace: true,
        ..Default::default()
    };

    Some(sentry::init((dsn.as_str(), options)))
}

/// Route tracing events into Sentry: problems become events, the rest
/// becomes breadcrumbs attached to them.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    use tracing::Level;

    match *metadata.level() {
        Level::ERROR | Level::WARN => sentry_tracing::EventFilter::Event,
        Level::INFO | Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Wire the tracing subscriber: env-filtered, JSON on Fly, text elsewhere,
/// with warnings and errors forwarded to Sentry.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "vendora_admin=info,tower_http=debug".into());

    // Fly's log shipper wants one JSON object per line; plain text is for
    // local runs.
    let on_fly = std::env::var("FLY_APP_NAME").is_ok();
    let json = on_fly.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text = (!on_fly).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(text)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

/// Root span for one HTTP request. The request id, status, and latency
/// fields are filled in later, by the middleware and [`record_response`].
fn request_span(request: &Request<Body>) -> Span {
    tracing::info_span!(
        "http_request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = tracing::field::Empty,
        status = tracing::field::Empty,
        latency_ms = tracing::field::Empty,
    )
}

/// Fill the response half of the request span.
fn record_response(response: &Response<Body>, latency: Duration, span: &Span) {
    span.record("status", response.status().as_u16());
    span.record(
        "latency_ms",
        u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
    );
    DefaultOnResponse::default().on_response(response, latency, span);
}

#[tokio::main]
async fn main() {
    let config = AdminConfig::from_env().expect("configuration error");

    // Sentry before tracing so the subscriber's Sentry layer has a client.
    let _sentry_guard = init_sentry(&config);
    init_tracing();

    let state = AppState::new(config.clone());
    let session_layer = create_session_layer(&config);

    let app = Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .nest_service("/static", ServeDir::new("crates/admin/static"))
        .layer(axum::middleware::from_fn(security_headers_middleware))
        .layer(session_layer)
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(request_span)
                .on_response(record_response),
        )
        .with_state(state)
        // Sentry wraps everything so aborted requests still get reported.
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("could not bind admin address");
    tracing::info!("admin dashboard listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");
}

/// Liveness probe. Answers as long as the process is up.
async fn health() -> &'static str {
    "ok"
}

/// Readiness probe. Fetches the store record, which exercises both platform
/// reachability and the configured API key.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.platform().store_details().await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Resolve on Ctrl+C or SIGTERM so `axum::serve` can drain connections.
async fn shutdown_signal() {
    let interrupt = async {
        tokio::signal::ctrl_c()
            .await
            .expect("ctrl-c handler failed to install");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler failed to install")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => {},
        () = terminate => {},
    }

    tracing::info!("shutdown signal received, draining connections");
}
