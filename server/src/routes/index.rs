use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;

use crate::state::AppState;

const TOTAL_COUNTRIES_PLACEHOLDER: &str = "{{TotalCountries}}";

pub async fn index(State(state): State<AppState>) -> Result<Html<String>, StatusCode> {
    match state.store.unique_total().await {
        Ok(count) => Ok(Html(render_index(&state.index_template, count))),
        Err(e) => {
            state.observability.record_store_error();
            tracing::error!(error = %e, "failed to count unique visits for index page");
            Err(StatusCode::BAD_REQUEST)
        }
    }
}

fn render_index(template: &str, total_countries: u64) -> String {
    template.replace(TOTAL_COUNTRIES_PLACEHOLDER, &total_countries.to_string())
}
