use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use brandkit_server::{config::Config, create_app, database::Database};

fn test_config(asset_dir: &std::path::Path, max_asset_size: usize) -> Config {
    Config {
        database_url: "postgresql://localhost/unused".to_string(),
        port: 0,
        jwt_secret: "test-jwt-secret".to_string(),
        asset_dir: asset_dir.to_string_lossy().into_owned(),
        asset_base_url: "/assets".to_string(),
        asset_url_secret: "test-url-secret".to_string(),
        signed_url_ttl_secs: 3600,
        image_api_base_url: None,
        image_api_key: None,
        image_model: "gpt-image-1".to_string(),
        billing_webhook_secret: "billing-secret".to_string(),
        free_tier_generations: 5,
        free_tier_brand_kits: 1,
        max_asset_size,
    }
}

fn app(dir: &tempfile::TempDir, max_asset_size: usize) -> Router {
    // Lazy pool: no connection is made until a handler touches the database.
    let pool = PgPoolOptions::new()
        .connect_lazy("postgresql://localhost/unused")
        .unwrap();
    create_app(Database::from_pool(pool), test_config(dir.path(), max_asset_size)).unwrap()
}

fn padded_billing_body(bytes: usize) -> String {
    let mut body = format!(
        "{{\"userId\":\"{}\",\"tier\":\"pro\",\"status\":\"active\"}}",
        uuid::Uuid::new_v4()
    );
    body.push_str(&" ".repeat(bytes.saturating_sub(body.len())));
    body
}

#[tokio::test]
async fn bodies_within_the_configured_cap_reach_the_handler() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir, 4 * 1024 * 1024);

    // 3MB body, over axum's built-in default but under our configured cap.
    // The 401 shows the handler ran; without the raised limit this request
    // dies with 413 before the secret check.
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/billing/update")
                .header("content-type", "application/json")
                .header("x-billing-secret", "wrong")
                .body(Body::from(padded_billing_body(3 * 1024 * 1024)))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn bodies_over_the_configured_cap_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir, 4 * 1024 * 1024);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/billing/update")
                .header("content-type", "application/json")
                .header("x-billing-secret", "wrong")
                .body(Body::from(padded_billing_body(6 * 1024 * 1024)))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
