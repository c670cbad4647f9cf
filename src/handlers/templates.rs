use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
    database::templates::TemplateFilter,
    error::{AppError, Result},
    handlers::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        NewTemplate, NewTemplateControl, NewTemplateCustomization, NewTemplateVariant, Template,
        TemplateCategory, TemplateControl, TemplateCustomization, TemplatePurchase,
        TemplateUpdate, TemplateVariant,
    },
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateQuery {
    pub category: Option<TemplateCategory>,
    pub creator_id: Option<Uuid>,
}

pub async fn list_templates(
    State(state): State<AppState>,
    Query(query): Query<TemplateQuery>,
) -> Result<Json<Vec<Template>>> {
    let templates = state
        .database
        .get_templates(&TemplateFilter {
            category: query.category,
            creator_id: query.creator_id,
            active_only: true,
        })
        .await?;

    Ok(Json(templates))
}

pub async fn get_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Template>> {
    let template = state
        .database
        .get_template(id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(template))
}

/// Listing templates for sale requires a paying tier.
pub async fn create_template(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(new): Json<NewTemplate>,
) -> Result<Json<Template>> {
    let subscription = state
        .database
        .get_subscription(user.id)
        .await?
        .ok_or(AppError::SubscriptionNotFound)?;

    if !subscription.tier().is_paying() {
        return Err(AppError::Forbidden);
    }

    let template = state.database.create_template(user.id, &new).await?;
    Ok(Json(template))
}

async fn owned_template(state: &AppState, user: &AuthenticatedUser, id: Uuid) -> Result<Template> {
    let template = state
        .database
        .get_template(id)
        .await?
        .ok_or(AppError::NotFound)?;

    if template.creator_id != user.id {
        return Err(AppError::Forbidden);
    }
    Ok(template)
}

pub async fn update_template(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(update): Json<TemplateUpdate>,
) -> Result<Json<Template>> {
    owned_template(&state, &user, id).await?;
    let template = state.database.update_template(id, &update).await?;
    Ok(Json(template))
}

pub async fn delete_template(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    owned_template(&state, &user, id).await?;
    state.database.delete_template(id).await?;
    Ok(Json(json!({ "success": true })))
}

// Variants

pub async fn list_variants(
    State(state): State<AppState>,
    Path(template_id): Path<Uuid>,
) -> Result<Json<Vec<TemplateVariant>>> {
    let variants = state.database.get_template_variants(template_id).await?;
    Ok(Json(variants))
}

pub async fn create_variant(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(template_id): Path<Uuid>,
    Json(new): Json<NewTemplateVariant>,
) -> Result<Json<TemplateVariant>> {
    owned_template(&state, &user, template_id).await?;
    let variant = state
        .database
        .create_template_variant(template_id, &new)
        .await?;
    Ok(Json(variant))
}

pub async fn delete_variant(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((template_id, variant_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<serde_json::Value>> {
    owned_template(&state, &user, template_id).await?;

    let variant = state
        .database
        .get_template_variant(variant_id)
        .await?
        .filter(|v| v.template_id == template_id)
        .ok_or(AppError::NotFound)?;

    state.database.delete_template_variant(variant.id).await?;
    Ok(Json(json!({ "success": true })))
}

// Controls

pub async fn list_controls(
    State(state): State<AppState>,
    Path(template_id): Path<Uuid>,
) -> Result<Json<Vec<TemplateControl>>> {
    let controls = state.database.get_template_controls(template_id).await?;
    Ok(Json(controls))
}

pub async fn create_control(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(template_id): Path<Uuid>,
    Json(new): Json<NewTemplateControl>,
) -> Result<Json<TemplateControl>> {
    owned_template(&state, &user, template_id).await?;
    let control = state
        .database
        .create_template_control(template_id, &new)
        .await?;
    Ok(Json(control))
}

pub async fn delete_control(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((template_id, control_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<serde_json::Value>> {
    owned_template(&state, &user, template_id).await?;

    let controls = state.database.get_template_controls(template_id).await?;
    if !controls.iter().any(|c| c.id == control_id) {
        return Err(AppError::NotFound);
    }

    state.database.delete_template_control(control_id).await?;
    Ok(Json(json!({ "success": true })))
}

// Customizations

pub async fn list_customizations(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<TemplateCustomization>>> {
    let customizations = state.database.get_user_customizations(user.id).await?;
    Ok(Json(customizations))
}

pub async fn list_template_customizations(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(template_id): Path<Uuid>,
) -> Result<Json<Vec<TemplateCustomization>>> {
    let customizations = state
        .database
        .get_template_customizations(user.id, template_id)
        .await?;
    Ok(Json(customizations))
}

pub async fn create_customization(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(new): Json<NewTemplateCustomization>,
) -> Result<Json<TemplateCustomization>> {
    let template = state
        .database
        .get_template(new.template_id)
        .await?
        .ok_or(AppError::NotFound)?;

    // Saved values must fit the template's control definitions.
    let controls = state.database.get_template_controls(template.id).await?;
    crate::services::pipeline::validate_customizations(&controls, &new.values)?;

    let customization = state.database.create_customization(user.id, &new).await?;
    Ok(Json(customization))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomizationUpdate {
    pub name: Option<String>,
    pub values: Option<serde_json::Map<String, serde_json::Value>>,
}

pub async fn update_customization(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(update): Json<CustomizationUpdate>,
) -> Result<Json<TemplateCustomization>> {
    let existing = state
        .database
        .get_customization(id)
        .await?
        .filter(|c| c.user_id == user.id)
        .ok_or(AppError::NotFound)?;

    if let Some(values) = &update.values {
        let controls = state
            .database
            .get_template_controls(existing.template_id)
            .await?;
        crate::services::pipeline::validate_customizations(&controls, values)?;
    }

    let customization = state
        .database
        .update_customization(id, update.name.as_deref(), update.values.as_ref())
        .await?;
    Ok(Json(customization))
}

pub async fn delete_customization(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    state
        .database
        .get_customization(id)
        .await?
        .filter(|c| c.user_id == user.id)
        .ok_or(AppError::NotFound)?;

    state.database.delete_customization(id).await?;
    Ok(Json(json!({ "success": true })))
}

// Purchases

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    /// Reference handed back by the external payment provider.
    pub payment_reference: Option<String>,
}

pub async fn purchase_template(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<PurchaseRequest>,
) -> Result<Json<TemplatePurchase>> {
    let template = state
        .database
        .get_template(id)
        .await?
        .ok_or(AppError::NotFound)?;

    if state
        .database
        .has_user_purchased_template(user.id, template.id)
        .await?
    {
        return Err(AppError::InvalidRequest(
            "template already purchased".to_string(),
        ));
    }

    let purchase = state
        .database
        .create_template_purchase(user.id, &template, request.payment_reference.as_deref())
        .await?;

    Ok(Json(purchase))
}

pub async fn list_purchases(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<TemplatePurchase>>> {
    let purchases = state.database.get_user_purchases(user.id).await?;
    Ok(Json(purchases))
}
