use std::sync::Arc;

use crate::{
    config::Config, database::Database, services::pipeline::GenerationPipeline,
    storage::LocalAssetStore,
};

pub mod assets;
pub mod auth;
pub mod brand_kits;
pub mod generations;
pub mod health;
pub mod subscriptions;
pub mod templates;

#[derive(Clone)]
pub struct AppState {
    pub database: Database,
    pub config: Config,
    pub pipeline: Arc<GenerationPipeline>,
    pub assets: Arc<LocalAssetStore>,
}
