use serde::de::DeserializeOwned;
use worldmap_shared::{DataRecord, TileGrid, UniqueVisits, VisitRecord, World};

use crate::config::{TILE_GRID_URL, UNIQUE_VISITS_PATH, VISITS_PATH, WORLD_GEOJSON_URL};

async fn get_json<T: DeserializeOwned>(url: &str) -> Result<T, String> {
    let resp = gloo_net::http::Request::get(url)
        .send()
        .await
        .map_err(|e| format!("fetch error: {e}"))?;
    if !resp.ok() {
        return Err(format!("HTTP {}", resp.status()));
    }
    resp.json::<T>()
        .await
        .map_err(|e| format!("parse error: {e}"))
}

pub async fn fetch_world() -> Result<World, String> {
    let resp = gloo_net::http::Request::get(WORLD_GEOJSON_URL)
        .send()
        .await
        .map_err(|e| format!("fetch error: {e}"))?;
    if !resp.ok() {
        return Err(format!("HTTP {}", resp.status()));
    }
    let body = resp
        .text()
        .await
        .map_err(|e| format!("read error: {e}"))?;
    World::from_geojson_str(&body).map_err(|e| format!("parse error: {e}"))
}

pub async fn fetch_tile_grid() -> Result<TileGrid, String> {
    get_json::<Vec<worldmap_shared::TileCell>>(TILE_GRID_URL)
        .await
        .map(TileGrid::new)
}

pub async fn fetch_visits() -> Result<Vec<VisitRecord>, String> {
    get_json(VISITS_PATH).await
}

pub async fn fetch_unique_visits() -> Result<UniqueVisits, String> {
    get_json(UNIQUE_VISITS_PATH).await
}

/// `POST /visits/{country}` with the name as one encoded path segment.
pub async fn record_visit(country: &str) -> Result<VisitRecord, String> {
    let encoded = String::from(js_sys::encode_uri_component(country));
    let url = format!("{VISITS_PATH}/{encoded}");
    let resp = gloo_net::http::Request::post(&url)
        .send()
        .await
        .map_err(|e| format!("fetch error: {e}"))?;
    if !resp.ok() {
        return Err(format!("HTTP {}", resp.status()));
    }
    resp.json::<VisitRecord>()
        .await
        .map_err(|e| format!("parse error: {e}"))
}

/// Visit records as chart rows keyed by their wire field names.
pub fn visit_rows(records: &[VisitRecord]) -> Vec<DataRecord> {
    records
        .iter()
        .filter_map(|record| match serde_json::to_value(record) {
            Ok(serde_json::Value::Object(row)) => Some(row),
            _ => None,
        })
        .collect()
}
