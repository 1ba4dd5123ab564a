use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::store::VisitStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<VisitStore>,
    /// Raw index page with a `{{TotalCountries}}` placeholder.
    pub index_template: Arc<str>,
    pub observability: Arc<ObservabilityCounters>,
}

#[derive(Debug, Default)]
pub struct ObservabilityCounters {
    visits_recorded_total: AtomicU64,
    rejected_country_names_total: AtomicU64,
    store_errors_total: AtomicU64,
}

#[derive(Debug, Clone, Copy)]
pub struct ObservabilitySnapshot {
    pub visits_recorded_total: u64,
    pub rejected_country_names_total: u64,
    pub store_errors_total: u64,
}

impl ObservabilityCounters {
    pub fn snapshot(&self) -> ObservabilitySnapshot {
        ObservabilitySnapshot {
            visits_recorded_total: self.visits_recorded_total.load(Ordering::Relaxed),
            rejected_country_names_total: self
                .rejected_country_names_total
                .load(Ordering::Relaxed),
            store_errors_total: self.store_errors_total.load(Ordering::Relaxed),
        }
    }

    pub fn record_visit(&self) {
        self.visits_recorded_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected_country_name(&self) {
        self.rejected_country_names_total
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_store_error(&self) {
        self.store_errors_total.fetch_add(1, Ordering::Relaxed);
    }
}

impl AppState {
    pub fn new(store: VisitStore, index_template: impl Into<Arc<str>>) -> Self {
        Self {
            store: Arc::new(store),
            index_template: index_template.into(),
            observability: Arc::new(ObservabilityCounters::default()),
        }
    }

    #[cfg(test)]
    pub fn in_memory(index_template: impl Into<Arc<str>>) -> Self {
        Self::new(
            VisitStore::Memory(crate::store::MemoryStore::new()),
            index_template,
        )
    }
}
