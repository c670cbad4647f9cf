use axum::{extract::State, Json};
use serde_json::json;

use crate::{error::Result, handlers::AppState};

pub async fn health_check(State(state): State<AppState>) -> Result<Json<serde_json::Value>> {
    sqlx::query("SELECT 1").execute(state.database.pool()).await?;

    Ok(Json(json!({ "status": "ok" })))
}
