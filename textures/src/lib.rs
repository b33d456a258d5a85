pub mod api;
pub mod config;
pub mod descriptor;
pub mod legacy;
pub mod metrics_defs;
pub mod nickname;
pub mod store;
pub mod types;

use config::{Config, StoreConfig, ValidationError};
use legacy::LegacyHost;
use shared::admin_service::AdminService;
use shared::http::run_http_service;
use std::sync::Arc;
use store::{FilesystemStore, MemoryStore, StoreError, TexturesStore};

#[derive(thiserror::Error, Debug)]
pub enum TexturesError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid configuration: {0}")]
    Validation(#[from] ValidationError),
    #[error("could not open texture store: {0}")]
    Store(#[from] StoreError),
}

pub async fn get_store(config: &StoreConfig) -> Result<Arc<dyn TexturesStore>, StoreError> {
    match config {
        StoreConfig::Memory => {
            tracing::warn!("using the in-memory texture store, records are lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreConfig::Filesystem {
            base_dir,
            collection,
        } => Ok(Arc::new(FilesystemStore::open(base_dir, collection).await?)),
    }
}

/// Serves the texture API and the admin probes until either listener fails.
pub async fn run(config: Config) -> Result<(), TexturesError> {
    config.validate()?;
    shared::metrics_defs::describe_all(metrics_defs::ALL_METRICS);

    let store = get_store(&config.store).await?;
    let skinsystem = api::SkinSystem::new(
        store.clone(),
        LegacyHost::new(config.legacy_host.clone()),
        config.api_key.clone(),
    );

    let api_task = async {
        api::serve(&config.listener, skinsystem)
            .await
            .map_err(TexturesError::from)
    };
    let admin_task = run_http_service(
        &config.admin_listener.host,
        config.admin_listener.port,
        AdminService::<_, TexturesError>::new(move || store.is_ready()),
    );

    tokio::try_join!(api_task, admin_task)?;
    Ok(())
}
