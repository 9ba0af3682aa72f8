//! Worker binary: opens the durable store, seeds the configuration catalog,
//! and runs the bounded capture worker pool until terminated.

use std::sync::Arc;

use anyhow::{Context, Result};
use national_treasure::{AppConfig, Learner, Store};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn config_from_env() -> Result<AppConfig> {
    let mut builder = AppConfig::builder()
        .database_path(
            std::env::var("NATIONAL_TREASURE_DATABASE_PATH")
                .unwrap_or_else(|_| "./national-treasure.db".to_string()),
        )
        .archive_dir(
            std::env::var("NATIONAL_TREASURE_ARCHIVE_DIR")
                .unwrap_or_else(|_| "./archive".to_string()),
        );

    if let Ok(n) = std::env::var("NATIONAL_TREASURE_WORKER_POOL_SIZE") {
        builder = builder.worker_pool_size(n.parse().context("invalid worker pool size")?);
    }
    if let Ok(headed) = std::env::var("NATIONAL_TREASURE_HEADED") {
        builder = builder.headless(headed != "1" && headed.to_lowercase() != "true");
    }

    builder.build()
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("info".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let app_config = config_from_env()?;

    let store = Store::open(app_config.database_path()).await?;
    let learner = Learner::new(
        store.clone(),
        f64::from(app_config.exploration_threshold()),
        app_config.exploration_bonus(),
        app_config.decay_half_life_days(),
    );
    learner.seed_default_catalog().await?;

    tracing::info!(
        worker_pool_size = app_config.worker_pool_size(),
        database_path = %app_config.database_path().display(),
        archive_dir = %app_config.archive_dir().display(),
        "national treasure worker pool starting"
    );

    let handles = national_treasure::worker::spawn_pool(
        Arc::new(app_config),
        Arc::new(store),
        Arc::new(learner),
    );

    for handle in handles {
        handle.await.context("worker task panicked")?;
    }

    Ok(())
}
