use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

/// Reader and writer connections. SELECTs go to `read`, mutations to `write`.
#[derive(Debug, Clone)]
pub(crate) struct DbPools {
    pub(crate) read: PgPool,
    pub(crate) write: PgPool,
}

pub(crate) async fn create_pools(
    write_url: &str,
    read_url: &str,
    max_connections: u32,
) -> Result<DbPools> {
    let write = connect(write_url, max_connections)
        .await
        .context("can't connect to writer database")?;
    info!("connected to writer database");

    let read = if read_url == write_url {
        write.clone()
    } else {
        let read = connect(read_url, max_connections)
            .await
            .context("can't connect to reader database")?;
        info!("connected to reader database");
        read
    };

    Ok(DbPools { read, write })
}

async fn connect(url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(url)
        .await
}

pub(crate) async fn run_migrations(pools: &DbPools) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(&pools.write)
        .await
        .context("failed to run database migrations")?;
    info!("database migrations applied");
    Ok(())
}
