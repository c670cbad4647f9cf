use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    handlers::AppState,
    middleware::auth::AuthenticatedUser,
    models::{GenerateRequest, Generation},
};

pub async fn generate(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<Generation>> {
    let generation = state.pipeline.run(user.id, request).await?;
    Ok(Json(generation))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
}

pub async fn list_generations(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Generation>>> {
    let generations = state
        .database
        .get_user_generations(user.id, query.limit)
        .await?;

    Ok(Json(generations))
}

async fn owned_generation(
    state: &AppState,
    user: &AuthenticatedUser,
    id: Uuid,
) -> Result<Generation> {
    let generation = state
        .database
        .get_generation(id)
        .await?
        .ok_or(AppError::NotFound)?;

    if generation.user_id != user.id {
        return Err(AppError::Forbidden);
    }
    Ok(generation)
}

pub async fn get_generation(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Generation>> {
    let generation = owned_generation(&state, &user, id).await?;
    Ok(Json(generation))
}

pub async fn toggle_favorite(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    owned_generation(&state, &user, id).await?;
    state.database.toggle_generation_favorite(id).await?;

    Ok(Json(json!({ "success": true })))
}

pub async fn delete_generation(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    owned_generation(&state, &user, id).await?;
    state.database.delete_generation(id).await?;

    Ok(Json(json!({ "success": true })))
}
