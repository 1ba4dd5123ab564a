use worldmap_shared::VisitRecord;

use super::StoreError;

pub struct PostgresStore {
    pool: sqlx::PgPool,
}

impl PostgresStore {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }

    pub async fn save(&self, country: &str) -> Result<i64, StoreError> {
        let visit = sqlx::query_scalar::<_, i64>(
            "INSERT INTO country_visits (country, visit) VALUES ($1, 1) \
             ON CONFLICT (country) DO UPDATE SET visit = country_visits.visit + 1 \
             RETURNING visit",
        )
        .bind(country)
        .fetch_one(&self.pool)
        .await?;
        Ok(visit)
    }

    pub async fn results(&self) -> Result<Vec<VisitRecord>, StoreError> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT country, visit FROM country_visits ORDER BY country")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows
            .into_iter()
            .map(|(country, visit)| VisitRecord { country, visit })
            .collect())
    }

    pub async fn unique_total(&self) -> Result<u64, StoreError> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM country_visits WHERE visit > 0")
                .fetch_one(&self.pool)
                .await?;
        Ok(count.max(0) as u64)
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
