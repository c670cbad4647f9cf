use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    handlers::AppState,
    middleware::auth::AuthenticatedUser,
    models::{AssetFileType, BrandKit, BrandKitAsset, BrandKitUpdate, NewBrandKit},
    storage::{brand_kit_asset_key, AssetStore},
};

async fn owned_brand_kit(state: &AppState, user: &AuthenticatedUser, id: Uuid) -> Result<BrandKit> {
    let kit = state
        .database
        .get_brand_kit(id)
        .await?
        .ok_or(AppError::NotFound)?;

    if kit.user_id != user.id {
        return Err(AppError::Forbidden);
    }
    Ok(kit)
}

pub async fn list_brand_kits(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<BrandKit>>> {
    let kits = state.database.get_user_brand_kits(user.id).await?;
    Ok(Json(kits))
}

pub async fn get_brand_kit(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    let kit = owned_brand_kit(&state, &user, id).await?;
    let assets = state.database.get_brand_kit_assets(kit.id).await?;

    Ok(Json(json!({ "brandKit": kit, "assets": assets })))
}

pub async fn create_brand_kit(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(new): Json<NewBrandKit>,
) -> Result<Json<BrandKit>> {
    let subscription = state
        .database
        .get_subscription(user.id)
        .await?
        .ok_or(AppError::SubscriptionNotFound)?;

    if !subscription.tier().is_paying() {
        let existing = state.database.count_user_brand_kits(user.id).await?;
        if existing >= state.config.free_tier_brand_kits {
            return Err(AppError::Forbidden);
        }
    }

    let kit = state.database.create_brand_kit(user.id, &new).await?;
    Ok(Json(kit))
}

pub async fn update_brand_kit(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(update): Json<BrandKitUpdate>,
) -> Result<Json<BrandKit>> {
    owned_brand_kit(&state, &user, id).await?;
    let kit = state.database.update_brand_kit(id, &update).await?;
    Ok(Json(kit))
}

pub async fn delete_brand_kit(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    owned_brand_kit(&state, &user, id).await?;

    // Stored objects go first, best effort; the row delete cascades the
    // asset records.
    let assets = state.database.get_brand_kit_assets(id).await?;
    for asset in &assets {
        if let Err(e) = state.assets.delete(&asset.storage_key).await {
            tracing::warn!(asset_id = %asset.id, "failed to delete stored object: {}", e);
        }
    }

    state.database.delete_brand_kit(id).await?;
    Ok(Json(json!({ "success": true })))
}

pub async fn upload_asset(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<BrandKitAsset>> {
    let kit = owned_brand_kit(&state, &user, id).await?;

    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;
    let mut mime_type: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidRequest(format!("failed to parse multipart data: {}", e)))?
    {
        if field.name() == Some("file") {
            file_name = field.file_name().map(|s| s.to_string());
            mime_type = field.content_type().map(|s| s.to_string());
            file_data = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| AppError::InvalidRequest(format!("failed to read file: {}", e)))?
                    .to_vec(),
            );
        }
    }

    let file_data = file_data
        .ok_or_else(|| AppError::InvalidRequest("file field is required".to_string()))?;
    let file_name =
        file_name.ok_or_else(|| AppError::InvalidRequest("file name is required".to_string()))?;

    if file_data.len() > state.config.max_asset_size {
        return Err(AppError::InvalidRequest("file too large".to_string()));
    }

    let mime_type = mime_type.unwrap_or_else(|| {
        mime_guess::from_path(&file_name)
            .first_or_octet_stream()
            .to_string()
    });

    let key = brand_kit_asset_key(kit.id, &file_name);
    let file_url = state.assets.save(&key, &file_data).await?;

    let asset = state
        .database
        .create_brand_kit_asset(
            kit.id,
            &file_url,
            &file_name,
            AssetFileType::from_mime(&mime_type).as_str(),
            file_data.len() as i64,
            &key,
        )
        .await?;

    Ok(Json(asset))
}

pub async fn delete_asset(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    let asset = state
        .database
        .get_brand_kit_asset(id)
        .await?
        .ok_or(AppError::NotFound)?;

    owned_brand_kit(&state, &user, asset.brand_kit_id).await?;

    state.assets.delete(&asset.storage_key).await?;
    state.database.delete_brand_kit_asset(id).await?;

    Ok(Json(json!({ "success": true })))
}
