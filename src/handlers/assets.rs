use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
};
use serde::Deserialize;

use crate::{
    error::{AppError, Result},
    handlers::AppState,
    storage::{is_public_key, AssetStore},
};

#[derive(Debug, Deserialize)]
pub struct SignatureQuery {
    pub expires: Option<i64>,
    pub sig: Option<String>,
}

/// Serves stored objects. Public keys are served as-is; private keys require
/// a valid, unexpired signature in the query string.
pub async fn serve_asset(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<SignatureQuery>,
) -> Result<impl IntoResponse> {
    if !is_public_key(&key) {
        let (expires, sig) = match (query.expires, query.sig.as_deref()) {
            (Some(expires), Some(sig)) => (expires, sig),
            _ => return Err(AppError::Unauthorized),
        };
        if !state.assets.verify_signature(&key, expires, sig) {
            return Err(AppError::Unauthorized);
        }
    }

    let bytes = state.assets.read(&key).await?;
    let content_type = mime_guess::from_path(&key)
        .first_or_octet_stream()
        .to_string();

    Ok(([(header::CONTENT_TYPE, content_type)], bytes))
}
