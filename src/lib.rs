use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod storage;

use config::Config;
use database::Database;
use handlers::AppState;
use services::image_client::{ImageGenerator, OpenAiImageClient, UnconfiguredImageClient};
use services::pipeline::GenerationPipeline;
use storage::LocalAssetStore;

pub fn create_app(database: Database, config: Config) -> error::Result<Router> {
    let assets = Arc::new(LocalAssetStore::new(
        &config.asset_dir,
        &config.asset_base_url,
        &config.asset_url_secret,
        config.signed_url_ttl_secs,
    )?);

    let generator: Arc<dyn ImageGenerator> = match OpenAiImageClient::from_config(&config) {
        Ok(client) => Arc::new(client),
        Err(_) => {
            tracing::warn!("image provider not configured, generation requests will fail");
            Arc::new(UnconfiguredImageClient)
        }
    };

    // Slack over the asset cap covers multipart framing around the payload.
    let max_body = config.max_asset_size + 64 * 1024;

    let pipeline = Arc::new(GenerationPipeline::new(
        Arc::new(database.clone()),
        generator,
        assets.clone(),
    ));

    let state = AppState {
        database,
        config,
        pipeline,
        assets,
    };

    let api = Router::new()
        .route("/auth/sync", post(handlers::auth::sync_user))
        .route("/auth/user", get(handlers::auth::get_current_user))
        .route("/subscription", get(handlers::subscriptions::get_subscription))
        .route("/billing/update", post(handlers::subscriptions::apply_billing_update))
        .route("/billing/reset-usage", post(handlers::subscriptions::reset_monthly_usage))
        .route("/generate", post(handlers::generations::generate))
        .route("/generations", get(handlers::generations::list_generations))
        .route(
            "/generations/:id",
            get(handlers::generations::get_generation)
                .delete(handlers::generations::delete_generation),
        )
        .route(
            "/generations/:id/favorite",
            post(handlers::generations::toggle_favorite),
        )
        .route(
            "/brand-kits",
            get(handlers::brand_kits::list_brand_kits).post(handlers::brand_kits::create_brand_kit),
        )
        .route(
            "/brand-kits/:id",
            get(handlers::brand_kits::get_brand_kit)
                .patch(handlers::brand_kits::update_brand_kit)
                .delete(handlers::brand_kits::delete_brand_kit),
        )
        .route(
            "/brand-kits/:id/assets",
            post(handlers::brand_kits::upload_asset),
        )
        .route(
            "/brand-kit-assets/:id",
            delete(handlers::brand_kits::delete_asset),
        )
        .route(
            "/templates",
            get(handlers::templates::list_templates).post(handlers::templates::create_template),
        )
        .route(
            "/templates/:id",
            get(handlers::templates::get_template)
                .patch(handlers::templates::update_template)
                .delete(handlers::templates::delete_template),
        )
        .route(
            "/templates/:id/variants",
            get(handlers::templates::list_variants).post(handlers::templates::create_variant),
        )
        .route(
            "/templates/:id/variants/:variant_id",
            delete(handlers::templates::delete_variant),
        )
        .route(
            "/templates/:id/controls",
            get(handlers::templates::list_controls).post(handlers::templates::create_control),
        )
        .route(
            "/templates/:id/controls/:control_id",
            delete(handlers::templates::delete_control),
        )
        .route(
            "/templates/:id/customizations",
            get(handlers::templates::list_template_customizations),
        )
        .route(
            "/templates/:id/purchase",
            post(handlers::templates::purchase_template),
        )
        .route(
            "/customizations",
            get(handlers::templates::list_customizations)
                .post(handlers::templates::create_customization),
        )
        .route(
            "/customizations/:id",
            patch(handlers::templates::update_customization)
                .delete(handlers::templates::delete_customization),
        )
        .route("/my-purchases", get(handlers::templates::list_purchases));

    let app = Router::new()
        .route("/health", get(handlers::health::health_check))
        .nest("/api", api)
        .route("/assets/*key", get(handlers::assets::serve_asset))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(max_body)),
        )
        .with_state(state);

    Ok(app)
}
