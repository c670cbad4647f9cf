use axum::{extract::State, Json};

use crate::{
    error::{AppError, Result},
    handlers::AppState,
    middleware::auth::AuthenticatedUser,
    models::{UpsertUser, User},
};

/// Mirrors the auth provider's identity into our user table and seeds the
/// default free subscription on first sight.
pub async fn sync_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<User>> {
    let upserted = state
        .database
        .upsert_user(
            user.id,
            &UpsertUser {
                email: user.email,
                first_name: user.first_name,
                last_name: user.last_name,
                profile_image_url: None,
            },
            state.config.free_tier_generations,
        )
        .await?;

    Ok(Json(upserted))
}

pub async fn get_current_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<User>> {
    let user = state
        .database
        .get_user(user.id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(user))
}
