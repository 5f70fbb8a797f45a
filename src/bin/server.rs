use axum::{
    Json, Router,
    http::StatusCode,
    routing::{get, post},
};
use span_optimizer::request::{self, CatalogResponse, OptimizeRequest, OptimizeResponse};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

async fn optimize(
    Json(req): Json<OptimizeRequest>,
) -> Result<Json<OptimizeResponse>, (StatusCode, String)> {
    tracing::info!(
        body = serde_json::to_string(&req).unwrap_or_default(),
        "POST /optimize"
    );

    // DP tables grow with the span length; keep them off the async workers.
    let response = tokio::task::spawn_blocking(move || request::optimize(&req))
        .await
        .map_err(|e| {
            tracing::error!("optimize task failed: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, "optimization failed".to_string())
        })?
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    Ok(Json(response))
}

async fn catalog() -> Json<CatalogResponse> {
    Json(request::catalog_info())
}

#[tokio::main]
async fn main() {
    let _sentry = std::env::var("SENTRY_DSN").ok().map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("development.log")
        .expect("failed to open development.log");

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_target(false)
        .with_ansi(false)
        .with_max_level(Level::INFO)
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3001".to_string());
    let addr = format!("0.0.0.0:{port}");

    let app = Router::new()
        .route("/up", get(|| async { "ok" }))
        .route("/catalog", get(catalog))
        .route("/optimize", post(optimize))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    eprintln!("Listening on {addr}");
    axum::serve(listener, app).await.unwrap();
}
