use std::fmt::Write as _;

use axum::Json;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;

use crate::state::{AppState, ObservabilitySnapshot};

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let store_available = match state.store.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "visit store ping failed");
            false
        }
    };
    let observability = state.observability.snapshot();
    Json(serde_json::json!({
        "status": "ok",
        "store_backend": state.store.backend(),
        "store_available": store_available,
        "observability": {
            "visits_recorded_total": observability.visits_recorded_total,
            "rejected_country_names_total": observability.rejected_country_names_total,
            "store_errors_total": observability.store_errors_total,
        }
    }))
}

pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let persistent_store = state.store.backend() == "postgres";
    let observability = state.observability.snapshot();

    let body = render_prometheus_metrics(persistent_store, observability);

    (
        [
            (header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE),
            (header::CACHE_CONTROL, "no-store"),
        ],
        body,
    )
}

fn render_prometheus_metrics(persistent_store: bool, observability: ObservabilitySnapshot) -> String {
    let mut body = String::new();
    let _ = writeln!(
        body,
        "# HELP worldmap_persistent_store Whether visits are stored in Postgres (1 or 0)."
    );
    let _ = writeln!(body, "# TYPE worldmap_persistent_store gauge");
    let _ = writeln!(
        body,
        "worldmap_persistent_store {}",
        u8::from(persistent_store)
    );

    let _ = writeln!(
        body,
        "# HELP worldmap_visits_recorded_total Total visits recorded since startup."
    );
    let _ = writeln!(body, "# TYPE worldmap_visits_recorded_total counter");
    let _ = writeln!(
        body,
        "worldmap_visits_recorded_total {}",
        observability.visits_recorded_total
    );

    let _ = writeln!(
        body,
        "# HELP worldmap_rejected_country_names_total Total visit requests rejected for an invalid country name."
    );
    let _ = writeln!(body, "# TYPE worldmap_rejected_country_names_total counter");
    let _ = writeln!(
        body,
        "worldmap_rejected_country_names_total {}",
        observability.rejected_country_names_total
    );

    let _ = writeln!(
        body,
        "# HELP worldmap_store_errors_total Total visit store operations that failed."
    );
    let _ = writeln!(body, "# TYPE worldmap_store_errors_total counter");
    let _ = writeln!(
        body,
        "worldmap_store_errors_total {}",
        observability.store_errors_total
    );

    body
}
