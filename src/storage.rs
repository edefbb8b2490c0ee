//! PostgreSQL storage for activities and the project euler counter.
//!
//! All statements are parameterized. The counter moves with a single
//! `UPDATE ... SET number = number + $1` so concurrent next/prev requests
//! cannot overwrite each other. Counter values are cast to BIGINT in SQL so
//! a pre-existing INT column reads the same as the one created here.

use async_trait::async_trait;
use deadpool_postgres::{Config, ManagerConfig, Pool, RecyclingMethod, Runtime};
use tokio_postgres::{NoTls, Row};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    activity::{Activity, ActivityStore},
    error::StorageError,
    euler::ProblemStore,
};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS activities (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name TEXT NOT NULL
);

-- Singleton row, seeded out of band
CREATE TABLE IF NOT EXISTS project_euler (
    id UUID PRIMARY KEY,
    number BIGINT NOT NULL
);
"#;

#[derive(Clone)]
pub struct PgStorage {
    pool: Pool,
    problem_id: Uuid,
}

impl PgStorage {
    /// Connect to `database_url`, check the connection and make sure the tables exist.
    pub async fn new(
        database_url: &str,
        pool_size: usize,
        problem_id: Uuid,
    ) -> anyhow::Result<Self> {
        let mut config = Config::new();
        config.url = Some(database_url.to_string());
        config.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });
        config.pool = Some(deadpool_postgres::PoolConfig::new(pool_size));
        let pool = config.create_pool(Some(Runtime::Tokio1), NoTls)?;

        let client = pool.get().await?;
        let row = client.query_one("SELECT NOW()::TEXT", &[]).await?;
        let now: String = row.try_get(0)?;
        info!(%now, "Connected to PostgreSQL database");

        client.batch_execute(SCHEMA).await?;
        info!("Database schema initialized");

        Ok(Self { pool, problem_id })
    }

    fn missing_problem(&self) -> StorageError {
        StorageError::NotFound(format!("project_euler row {}", self.problem_id))
    }
}

#[async_trait]
impl ProblemStore for PgStorage {
    fn problem_id(&self) -> Uuid {
        self.problem_id
    }

    async fn current_number(&self) -> Result<i64, StorageError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "SELECT number::BIGINT FROM project_euler WHERE id = $1",
                &[&self.problem_id],
            )
            .await?
            .ok_or_else(|| self.missing_problem())?;

        let number: i64 = row.try_get(0)?;
        Ok(number)
    }

    async fn set_current_number(&self, number: i64) -> Result<(), StorageError> {
        let client = self.pool.get().await?;
        let updated = client
            .execute(
                "UPDATE project_euler SET number = $1::BIGINT WHERE id = $2",
                &[&number, &self.problem_id],
            )
            .await?;

        if updated == 0 {
            return Err(self.missing_problem());
        }
        Ok(())
    }

    async fn shift_current_number(&self, delta: i64) -> Result<i64, StorageError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "UPDATE project_euler SET number = number + $1::BIGINT WHERE id = $2 \
                 RETURNING number::BIGINT",
                &[&delta, &self.problem_id],
            )
            .await?
            .ok_or_else(|| self.missing_problem())?;

        let number: i64 = row.try_get(0)?;
        debug!(delta, number, "shifted project euler number");
        Ok(number)
    }
}

#[async_trait]
impl ActivityStore for PgStorage {
    async fn list(&self) -> Result<Vec<Activity>, StorageError> {
        let client = self.pool.get().await?;
        let rows = client
            .query("SELECT id, name FROM activities ORDER BY name", &[])
            .await?;

        rows.iter().map(to_activity).collect()
    }

    async fn insert(&self, name: &str) -> Result<Activity, StorageError> {
        let client = self.pool.get().await?;
        let row = client
            .query_one(
                "INSERT INTO activities (name) VALUES ($1) RETURNING id, name",
                &[&name.to_lowercase()],
            )
            .await?;

        to_activity(&row)
    }

    async fn delete(&self, id: Uuid) -> Result<u64, StorageError> {
        let client = self.pool.get().await?;
        let deleted = client
            .execute("DELETE FROM activities WHERE id = $1", &[&id])
            .await?;
        Ok(deleted)
    }
}

fn to_activity(row: &Row) -> Result<Activity, StorageError> {
    Ok(Activity {
        id: row.try_get::<_, Uuid>(0)?.to_string(),
        name: row.try_get(1)?,
    })
}
