use anyhow::Result;
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    pub asset_dir: String,
    pub asset_base_url: String,
    pub asset_url_secret: String,
    pub signed_url_ttl_secs: i64,
    pub image_api_base_url: Option<String>,
    pub image_api_key: Option<String>,
    pub image_model: String,
    pub billing_webhook_secret: String,
    pub free_tier_generations: i32,
    pub free_tier_brand_kits: i64,
    pub max_asset_size: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Config {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgresql://localhost/brandkit".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
            jwt_secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| "your-secret-key".to_string()),
            asset_dir: env::var("ASSET_DIR").unwrap_or_else(|_| "./assets".to_string()),
            asset_base_url: env::var("ASSET_BASE_URL")
                .unwrap_or_else(|_| "/assets".to_string()),
            asset_url_secret: env::var("ASSET_URL_SECRET")
                .unwrap_or_else(|_| "asset-signing-secret".to_string()),
            signed_url_ttl_secs: env::var("SIGNED_URL_TTL_SECS")
                .unwrap_or_else(|_| "604800".to_string()) // 7 days
                .parse()?,
            image_api_base_url: env::var("IMAGE_API_BASE_URL").ok(),
            image_api_key: env::var("IMAGE_API_KEY").ok(),
            image_model: env::var("IMAGE_MODEL").unwrap_or_else(|_| "gpt-image-1".to_string()),
            billing_webhook_secret: env::var("BILLING_WEBHOOK_SECRET")
                .unwrap_or_else(|_| "billing-webhook-secret".to_string()),
            free_tier_generations: env::var("FREE_TIER_GENERATIONS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()?,
            free_tier_brand_kits: env::var("FREE_TIER_BRAND_KITS")
                .unwrap_or_else(|_| "1".to_string())
                .parse()?,
            max_asset_size: env::var("MAX_ASSET_SIZE")
                .unwrap_or_else(|_| "10485760".to_string()) // 10MB
                .parse()?,
        })
    }
}
