//! Throwaway Postgres databases for integration tests.

use std::env;

use anyhow::{Context, Result};
use db::pg::run_migrations;
use sqlx::{Executor, PgPool};
use tracing::warn;
use url::Url;
use uuid::Uuid;

pub struct DbFixture {
    admin_url: Url,
}

impl DbFixture {
    pub fn from_env() -> Result<Self> {
        let raw = env::var("TEST_ADMIN_URL")
            .or_else(|_| env::var("DATABASE_URL"))
            .context("TEST_ADMIN_URL or DATABASE_URL must be set for tests")?;
        let admin_url = Url::parse(&raw).context("invalid admin database url")?;
        Ok(Self { admin_url })
    }

    /// `None` when no admin database is configured, so suites can skip.
    pub fn try_from_env() -> Option<Self> {
        match Self::from_env() {
            Ok(fixture) => Some(fixture),
            Err(err) => {
                warn!(error = %err, "skipping database tests");
                None
            }
        }
    }

    pub async fn create(&self, prefix: &str) -> Result<DatabaseHandle> {
        let name = format!("{}_{}", prefix, Uuid::new_v4().simple());
        let admin_pool = PgPool::connect(self.admin_url.as_str()).await?;
        admin_pool
            .execute(format!("CREATE DATABASE \"{name}\"").as_str())
            .await
            .with_context(|| format!("creating database {name}"))?;

        let mut db_url = self.admin_url.clone();
        db_url.set_path(&name);
        let pool = PgPool::connect(db_url.as_str()).await?;
        run_migrations(&pool).await?;
        Ok(DatabaseHandle {
            pool,
            name,
            db_url,
            admin_url: self.admin_url.clone(),
        })
    }
}

pub struct DatabaseHandle {
    pool: PgPool,
    name: String,
    db_url: Url,
    admin_url: Url,
}

impl DatabaseHandle {
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn database_url(&self) -> &str {
        self.db_url.as_str()
    }

    pub async fn cleanup(self) -> Result<()> {
        self.pool.close().await;
        let admin_pool = PgPool::connect(self.admin_url.as_str()).await?;
        sqlx::query(
            "SELECT pg_terminate_backend(pid) FROM pg_stat_activity WHERE datname = $1",
        )
        .bind(&self.name)
        .execute(&admin_pool)
        .await?;
        admin_pool
            .execute(format!("DROP DATABASE IF EXISTS \"{}\"", self.name).as_str())
            .await?;
        Ok(())
    }
}
