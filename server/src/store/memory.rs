use dashmap::DashMap;
use worldmap_shared::{VisitRecord, unique_count};

#[derive(Debug, Default)]
pub struct MemoryStore {
    visits: DashMap<String, i64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save(&self, country: &str) -> i64 {
        let mut count = self.visits.entry(country.to_owned()).or_insert(0);
        *count += 1;
        *count
    }

    pub fn results(&self) -> Vec<VisitRecord> {
        let mut records: Vec<VisitRecord> = self
            .visits
            .iter()
            .map(|entry| VisitRecord {
                country: entry.key().clone(),
                visit: *entry.value(),
            })
            .collect();
        records.sort_by(|a, b| a.country.cmp(&b.country));
        records
    }

    pub fn unique_total(&self) -> u64 {
        unique_count(&self.results())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::MemoryStore;

    #[test]
    fn save_increments_per_country() {
        let store = MemoryStore::new();
        assert_eq!(store.save("Peru"), 1);
        assert_eq!(store.save("Peru"), 2);
        assert_eq!(store.save("Japan"), 1);

        let results = store.results();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].country, "Japan");
        assert_eq!(results[1].visit, 2);
        assert_eq!(store.unique_total(), 2);
    }

    #[test]
    fn empty_store_has_no_results() {
        let store = MemoryStore::new();
        assert!(store.results().is_empty());
        assert_eq!(store.unique_total(), 0);
    }

    #[tokio::test]
    async fn concurrent_saves_are_not_lost() {
        let store = Arc::new(MemoryStore::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                for _ in 0..50 {
                    store.save("Chile");
                }
            }));
        }
        for handle in handles {
            handle.await.expect("save task");
        }
        assert_eq!(store.results()[0].visit, 400);
    }
}
