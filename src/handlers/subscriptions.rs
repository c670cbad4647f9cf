use axum::{extract::State, http::HeaderMap, Json};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    handlers::AppState,
    middleware::auth::AuthenticatedUser,
    models::{BillingUpdate, Subscription},
};

pub async fn get_subscription(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Subscription>> {
    let subscription = state
        .database
        .get_subscription(user.id)
        .await?
        .ok_or(AppError::SubscriptionNotFound)?;

    Ok(Json(subscription))
}

fn require_billing_secret(state: &AppState, headers: &HeaderMap) -> Result<()> {
    let provided = headers
        .get("x-billing-secret")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if provided != state.config.billing_webhook_secret {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

/// Billing collaborator hook: applies a plan/tier change to the ledger.
pub async fn apply_billing_update(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(update): Json<BillingUpdate>,
) -> Result<Json<Subscription>> {
    require_billing_secret(&state, &headers)?;

    let subscription = state
        .database
        .apply_billing_update(&update, state.config.free_tier_generations)
        .await?;
    tracing::info!(
        user_id = %update.user_id,
        tier = update.tier.as_str(),
        "billing update applied"
    );

    Ok(Json(subscription))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetUsageRequest {
    pub user_id: Uuid,
}

/// Monthly usage reset, driven by the billing collaborator's period rollover.
pub async fn reset_monthly_usage(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ResetUsageRequest>,
) -> Result<Json<serde_json::Value>> {
    require_billing_secret(&state, &headers)?;

    state
        .database
        .reset_monthly_generations(request.user_id)
        .await?;

    Ok(Json(json!({ "success": true })))
}
