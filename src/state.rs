// state.rs
// Shared application state: configuration, the record store behind its
// trait facade, and the photo/PDF side services.

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::storage::{
    BillRenderer, HttpBillRenderer, LocalPhotoStorage, PhotoStorage, RemotePhotoStorage,
};
use crate::store::{Store, seed};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Store,
    pub photos: Arc<dyn PhotoStorage>,
    pub renderer: Option<Arc<dyn BillRenderer>>,
}

pub async fn init_state() -> Result<AppState> {
    let config = Config::from_env()?;
    init_state_with(config).await
}

/// Build the shared state from an explicit configuration. Tests use this to
/// point the store at throwaway databases.
pub async fn init_state_with(config: Config) -> Result<AppState> {
    let store = Store::connect(&config.store)
        .await
        .context("failed to connect the record store")?;
    seed::ensure_admin(&store, &config).await?;

    let photos: Arc<dyn PhotoStorage> = match &config.storage_url {
        Some(endpoint) => Arc::new(RemotePhotoStorage::new(endpoint.clone())),
        None => Arc::new(LocalPhotoStorage::new(config.upload_dir.clone())),
    };
    let renderer = config
        .renderer_url
        .clone()
        .map(|endpoint| Arc::new(HttpBillRenderer::new(endpoint)) as Arc<dyn BillRenderer>);

    Ok(AppState {
        config: Arc::new(config),
        store,
        photos,
        renderer,
    })
}
