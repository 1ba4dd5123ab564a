use std::path::Path;
use std::time::Duration;

use axum::{
    Router,
    extract::Request,
    http::{HeaderValue, header},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;

use crate::config;
use crate::routes;
use crate::state::AppState;

pub(crate) fn build_app(state: AppState, static_dir: &Path) -> Router {
    let static_assets = Router::new()
        .fallback_service(
            ServeDir::new(static_dir)
                .precompressed_br()
                .precompressed_gzip(),
        )
        .layer(middleware::from_fn(set_static_cache_control));

    let app = Router::new()
        .route("/", get(routes::index::index))
        .route("/visits", get(routes::visits::get_visits))
        .route("/visits/{country}", post(routes::visits::record_visit))
        .route("/uniquevisits", get(routes::visits::get_unique_visits))
        .route("/api/health", get(routes::api::health))
        .route("/api/metrics", get(routes::api::metrics));

    let app = app
        .layer(CompressionLayer::new())
        .nest_service("/static", static_assets)
        .with_state(state);
    with_request_timeout(app, config::request_timeout())
}

/// Requests still running after `timeout` are answered with 408.
fn with_request_timeout(router: Router, timeout: Duration) -> Router {
    router.layer(TimeoutLayer::new(timeout))
}

async fn set_static_cache_control(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    let mut response = next.run(request).await;

    if response.status().is_success()
        && let Some(cache_control) = cache_control_for_path(&path)
    {
        response.headers_mut().insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static(cache_control),
        );
    }

    response
}

fn cache_control_for_path(path: &str) -> Option<&'static str> {
    let ext = Path::new(path).extension().and_then(|ext| ext.to_str())?;
    match ext {
        "js" | "wasm" => Some("no-cache"),
        "css" | "png" | "svg" | "ico" | "woff2" => Some("public, max-age=86400"),
        _ => None,
    }
}
