use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_SERVER_PORT: u16 = 8080;
pub const DEFAULT_STATIC_DIR: &str = "static";
pub const DEFAULT_INDEX_TEMPLATE: &str = "server/templates/index.html";
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
/// Longest country name accepted by `POST /visits/{country}`.
pub const MAX_COUNTRY_NAME_LEN: usize = 64;

pub fn server_port() -> u16 {
    std::env::var("PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_SERVER_PORT)
}

pub fn static_dir() -> PathBuf {
    non_empty_env("STATIC_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR))
}

pub fn index_template_path() -> PathBuf {
    non_empty_env("INDEX_TEMPLATE")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_INDEX_TEMPLATE))
}

/// Postgres connection string; visits are kept in memory when unset.
pub fn database_url() -> Option<String> {
    non_empty_env("DATABASE_URL")
}

pub fn db_max_connections() -> u32 {
    std::env::var("DB_MAX_CONNECTIONS")
        .ok()
        .and_then(|value| value.parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
}

/// Upper bound on handling one request, static files included.
pub fn request_timeout() -> Duration {
    let secs = std::env::var("REQUEST_TIMEOUT_SECS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
    Duration::from_secs(secs)
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
