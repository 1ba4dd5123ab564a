use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use worldmap_shared::{UniqueVisits, VisitRecord};

use crate::config::MAX_COUNTRY_NAME_LEN;
use crate::state::AppState;

pub async fn get_visits(
    State(state): State<AppState>,
) -> Result<Json<Vec<VisitRecord>>, StatusCode> {
    match state.store.results().await {
        Ok(records) => Ok(Json(records)),
        Err(e) => {
            state.observability.record_store_error();
            tracing::error!(error = %e, "failed to load visit results");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

pub async fn record_visit(
    State(state): State<AppState>,
    Path(country): Path<String>,
) -> Result<Json<VisitRecord>, StatusCode> {
    let country = match normalize_country_name(&country) {
        Ok(name) => name,
        Err(status) => {
            state.observability.record_rejected_country_name();
            return Err(status);
        }
    };

    match state.store.save(country).await {
        Ok(visit) => {
            state.observability.record_visit();
            tracing::info!(country, visit, "new visit recorded");
            Ok(Json(VisitRecord {
                country: country.to_owned(),
                visit,
            }))
        }
        Err(e) => {
            state.observability.record_store_error();
            tracing::error!(error = %e, country, "failed to save visit");
            Err(StatusCode::BAD_REQUEST)
        }
    }
}

pub async fn get_unique_visits(
    State(state): State<AppState>,
) -> Result<Json<UniqueVisits>, StatusCode> {
    match state.store.unique_total().await {
        Ok(count) => Ok(Json(UniqueVisits { count })),
        Err(e) => {
            state.observability.record_store_error();
            tracing::error!(error = %e, "failed to count unique visits");
            Err(StatusCode::BAD_REQUEST)
        }
    }
}

fn normalize_country_name(name: &str) -> Result<&str, StatusCode> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.chars().count() > MAX_COUNTRY_NAME_LEN {
        return Err(StatusCode::BAD_REQUEST);
    }

    if trimmed
        .chars()
        .any(|ch| ch.is_control() || matches!(ch, '/' | '\\' | '?' | '#'))
    {
        return Err(StatusCode::BAD_REQUEST);
    }

    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::{StatusCode, normalize_country_name};
    use crate::routes::test_support::{TEST_TEMPLATE, spawn_test_server};
    use crate::state::AppState;
    use worldmap_shared::{UniqueVisits, VisitRecord};

    #[test]
    fn normalize_country_name_rejects_invalid_inputs() {
        assert_eq!(normalize_country_name(""), Err(StatusCode::BAD_REQUEST));
        assert_eq!(normalize_country_name("   "), Err(StatusCode::BAD_REQUEST));
        assert_eq!(
            normalize_country_name("Peru/Chile"),
            Err(StatusCode::BAD_REQUEST)
        );
        assert_eq!(normalize_country_name("Peru?"), Err(StatusCode::BAD_REQUEST));
        assert_eq!(normalize_country_name("Peru#1"), Err(StatusCode::BAD_REQUEST));
        assert_eq!(
            normalize_country_name("Peru\\Chile"),
            Err(StatusCode::BAD_REQUEST)
        );
        assert_eq!(
            normalize_country_name("Peru\nChile"),
            Err(StatusCode::BAD_REQUEST)
        );
        assert_eq!(
            normalize_country_name(&"x".repeat(65)),
            Err(StatusCode::BAD_REQUEST)
        );
    }

    #[test]
    fn normalize_country_name_trims_and_keeps_spaces() {
        assert_eq!(
            normalize_country_name("  Trinidad and Tobago "),
            Ok("Trinidad and Tobago")
        );
        assert_eq!(normalize_country_name("Côte d'Ivoire"), Ok("Côte d'Ivoire"));
    }

    #[tokio::test]
    async fn visits_start_empty_and_unique_count_is_zero() {
        let (addr, server_handle) = spawn_test_server(AppState::in_memory(TEST_TEMPLATE)).await;
        let base_url = format!("http://{addr}");
        let client = reqwest::Client::new();

        let body = client
            .get(format!("{base_url}/visits"))
            .send()
            .await
            .expect("visits request")
            .error_for_status()
            .expect("visits status")
            .text()
            .await
            .expect("visits body");
        assert_eq!(body, "[]");

        let unique = client
            .get(format!("{base_url}/uniquevisits"))
            .send()
            .await
            .expect("unique request")
            .error_for_status()
            .expect("unique status")
            .json::<serde_json::Value>()
            .await
            .expect("parse unique");
        assert_eq!(unique, serde_json::json!({ "Count": 0 }));

        server_handle.abort();
        let _ = server_handle.await;
    }

    #[tokio::test]
    async fn posting_visits_increments_and_updates_results() {
        let state = AppState::in_memory(TEST_TEMPLATE);
        let (addr, server_handle) = spawn_test_server(state.clone()).await;
        let base_url = format!("http://{addr}");
        let client = reqwest::Client::new();

        for expected in 1..=2 {
            let record = client
                .post(format!("{base_url}/visits/Peru"))
                .send()
                .await
                .expect("post request")
                .error_for_status()
                .expect("post status")
                .json::<VisitRecord>()
                .await
                .expect("parse record");
            assert_eq!(record.country, "Peru");
            assert_eq!(record.visit, expected);
        }

        let encoded = client
            .post(format!("{base_url}/visits/Bosnia%20and%20Herzegovina"))
            .send()
            .await
            .expect("encoded post")
            .error_for_status()
            .expect("encoded status")
            .json::<serde_json::Value>()
            .await
            .expect("parse encoded record");
        assert_eq!(
            encoded,
            serde_json::json!({ "Country": "Bosnia and Herzegovina", "Visit": 1 })
        );

        let records = client
            .get(format!("{base_url}/visits"))
            .send()
            .await
            .expect("visits request")
            .json::<Vec<VisitRecord>>()
            .await
            .expect("parse visits");
        assert_eq!(records.len(), 2);
        assert!(records.iter().any(|r| r.country == "Peru" && r.visit == 2));

        let unique = client
            .get(format!("{base_url}/uniquevisits"))
            .send()
            .await
            .expect("unique request")
            .json::<UniqueVisits>()
            .await
            .expect("parse unique");
        assert_eq!(unique.count, 2);
        assert_eq!(state.observability.snapshot().visits_recorded_total, 3);

        server_handle.abort();
        let _ = server_handle.await;
    }

    #[tokio::test]
    async fn invalid_country_names_are_rejected_without_saving() {
        let state = AppState::in_memory(TEST_TEMPLATE);
        let (addr, server_handle) = spawn_test_server(state.clone()).await;
        let base_url = format!("http://{addr}");
        let client = reqwest::Client::new();

        let response = client
            .post(format!("{base_url}/visits/%20%20"))
            .send()
            .await
            .expect("blank post");
        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);

        let response = client
            .post(format!("{base_url}/visits/Peru%3F"))
            .send()
            .await
            .expect("query char post");
        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);

        let response = client
            .get(format!("{base_url}/visits/Peru"))
            .send()
            .await
            .expect("get on post route");
        assert_eq!(response.status(), reqwest::StatusCode::METHOD_NOT_ALLOWED);

        assert!(state.store.results().await.expect("results").is_empty());
        assert_eq!(
            state.observability.snapshot().rejected_country_names_total,
            2
        );

        server_handle.abort();
        let _ = server_handle.await;
    }
}
