use std::sync::Arc;

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::configuration::{DatabaseConfig, PostgresConfig, StorageBackend};
use crate::pg_repository::PgCommerceRepository;
use crate::repository::CommerceRepository;
use crate::supabase_client::SupabaseClient;

pub fn get_connection_pool(configuration: &PostgresConfig) -> PgPool {
    PgPoolOptions::new()
        .acquire_timeout(std::time::Duration::from_secs(
            configuration.acquire_timeout,
        ))
        .max_connections(configuration.max_connections)
        .min_connections(configuration.min_connections)
        .connect_lazy_with(configuration.with_db())
}

#[tracing::instrument(name = "Run migrations", skip(pool))]
pub async fn run_migrations(pool: &PgPool) -> Result<(), anyhow::Error> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Failed to migrate the database")?;
    Ok(())
}

/// Builds the repository for the configured storage backend.
#[tracing::instrument(name = "Build repository", skip(configuration))]
pub async fn build_repository(
    configuration: &DatabaseConfig,
) -> Result<Arc<dyn CommerceRepository>, anyhow::Error> {
    match configuration.backend {
        StorageBackend::Rest => {
            if !configuration.rest.is_configured() {
                tracing::warn!("database REST url or service role key is empty");
            }
            let client = SupabaseClient::new(
                configuration.rest.base_url().to_string(),
                configuration.rest.service_role_key.clone(),
                configuration.rest.timeout(),
            )?;
            Ok(Arc::new(client))
        }
        StorageBackend::Postgres => {
            let pool = get_connection_pool(&configuration.postgres);
            if configuration.postgres.run_migrations {
                run_migrations(&pool).await?;
            }
            Ok(Arc::new(PgCommerceRepository::new(pool)))
        }
    }
}
