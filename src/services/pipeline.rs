use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    database::Database,
    error::{AppError, Result},
    models::{
        AspectRatio, ControlKind, GenerateRequest, Generation, NewGeneration, Subscription,
        Template, TemplateControl, TemplateVariant,
    },
    services::{
        image_client::ImageGenerator,
        prompt::{build_prompt, TemplateContext},
        watermark,
    },
    storage::{generation_key, AssetStore},
};

/// Narrow persistence seam for the generation pipeline, so it can run against
/// the real database or an in-memory fake in tests.
#[async_trait]
pub trait PipelineStore: Send + Sync {
    async fn get_subscription(&self, user_id: Uuid) -> Result<Option<Subscription>>;
    async fn increment_generations_used(&self, user_id: Uuid) -> Result<()>;
    async fn create_generation(&self, new: &NewGeneration) -> Result<Generation>;
    async fn get_template(&self, id: Uuid) -> Result<Option<Template>>;
    async fn get_template_variant(&self, id: Uuid) -> Result<Option<TemplateVariant>>;
    async fn get_template_controls(&self, template_id: Uuid) -> Result<Vec<TemplateControl>>;
}

#[async_trait]
impl PipelineStore for Database {
    async fn get_subscription(&self, user_id: Uuid) -> Result<Option<Subscription>> {
        Database::get_subscription(self, user_id).await
    }

    async fn increment_generations_used(&self, user_id: Uuid) -> Result<()> {
        Database::increment_generations_used(self, user_id).await
    }

    async fn create_generation(&self, new: &NewGeneration) -> Result<Generation> {
        Database::create_generation(self, new).await
    }

    async fn get_template(&self, id: Uuid) -> Result<Option<Template>> {
        Database::get_template(self, id).await
    }

    async fn get_template_variant(&self, id: Uuid) -> Result<Option<TemplateVariant>> {
        Database::get_template_variant(self, id).await
    }

    async fn get_template_controls(&self, template_id: Uuid) -> Result<Vec<TemplateControl>> {
        Database::get_template_controls(self, template_id).await
    }
}

/// Quota-gated generation pipeline. One strictly sequential pass per request:
/// validate, authorize, compose, generate, watermark for free tier, persist
/// the asset, charge usage, record the row. Every failure aborts the
/// remaining steps; usage is charged only after the asset is stored.
pub struct GenerationPipeline {
    store: Arc<dyn PipelineStore>,
    generator: Arc<dyn ImageGenerator>,
    assets: Arc<dyn AssetStore>,
}

#[derive(Debug)]
struct ValidatedRequest {
    prompt: String,
    aspect_ratio: AspectRatio,
    style: String,
    quality: i32,
}

impl GenerationPipeline {
    pub fn new(
        store: Arc<dyn PipelineStore>,
        generator: Arc<dyn ImageGenerator>,
        assets: Arc<dyn AssetStore>,
    ) -> Self {
        Self {
            store,
            generator,
            assets,
        }
    }

    pub async fn run(&self, user_id: Uuid, request: GenerateRequest) -> Result<Generation> {
        let validated = validate_request(&request)?;

        let subscription = self
            .store
            .get_subscription(user_id)
            .await?
            .ok_or(AppError::SubscriptionNotFound)?;

        if !subscription.has_quota() {
            tracing::info!(%user_id, "generation blocked: quota exhausted");
            return Err(AppError::QuotaExceeded);
        }

        let template_ctx = self.resolve_template(&request).await?;

        let final_prompt = build_prompt(
            &validated.prompt,
            &validated.style,
            template_ctx.as_ref(),
            request.customizations.as_ref(),
        );

        // Provider failure is terminal here; quota and storage stay untouched.
        let image_bytes = self
            .generator
            .generate(&final_prompt, validated.aspect_ratio)
            .await?;

        let is_free_tier = !subscription.tier().is_paying();
        let (output_bytes, extension) = if is_free_tier {
            (watermark::stamp(&image_bytes)?, watermark::STAMPED_EXTENSION)
        } else {
            (image_bytes, "png")
        };

        let key = generation_key(true, extension);
        let image_url = self.assets.save(&key, &output_bytes).await?;

        // Charged only after the asset is durably stored. If either of the two
        // writes below fails the stored object is orphaned; there is no
        // compensating delete.
        self.store.increment_generations_used(user_id).await?;

        let generation = self
            .store
            .create_generation(&NewGeneration {
                user_id,
                brand_kit_id: request.brand_kit_id,
                template_id: request.template_id,
                variant_id: request.variant_id,
                customizations: request
                    .customizations
                    .map(Value::Object),
                prompt: final_prompt,
                image_url,
                aspect_ratio: validated.aspect_ratio,
                style: validated.style,
                quality: validated.quality,
                has_watermark: is_free_tier,
            })
            .await?;

        tracing::info!(%user_id, generation_id = %generation.id, "generation complete");
        Ok(generation)
    }

    /// Resolves template and variant metadata and validates the customization
    /// payload against the template's control list.
    async fn resolve_template(&self, request: &GenerateRequest) -> Result<Option<TemplateContext>> {
        let template_id = match request.template_id {
            Some(id) => id,
            None => {
                if request.variant_id.is_some() {
                    return Err(AppError::InvalidRequest(
                        "variantId requires templateId".to_string(),
                    ));
                }
                return Ok(None);
            }
        };

        let template = self
            .store
            .get_template(template_id)
            .await?
            .ok_or_else(|| AppError::InvalidRequest("unknown template".to_string()))?;

        if let Some(variant_id) = request.variant_id {
            let variant = self
                .store
                .get_template_variant(variant_id)
                .await?
                .ok_or_else(|| AppError::InvalidRequest("unknown template variant".to_string()))?;
            if variant.template_id != template.id {
                return Err(AppError::InvalidRequest(
                    "variant does not belong to template".to_string(),
                ));
            }
        }

        if let Some(values) = &request.customizations {
            let controls = self.store.get_template_controls(template.id).await?;
            validate_customizations(&controls, values)?;
        }

        Ok(Some(TemplateContext::from_template(&template)))
    }
}

fn validate_request(request: &GenerateRequest) -> Result<ValidatedRequest> {
    let prompt = request
        .prompt
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::InvalidRequest("prompt is required".to_string()))?;
    let style = request
        .style
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::InvalidRequest("style is required".to_string()))?;
    let aspect_ratio = request
        .aspect_ratio
        .ok_or_else(|| AppError::InvalidRequest("aspectRatio is required".to_string()))?;
    let quality = request
        .quality
        .ok_or_else(|| AppError::InvalidRequest("quality is required".to_string()))?;
    if !(1..=100).contains(&quality) {
        return Err(AppError::InvalidRequest(
            "quality must be between 1 and 100".to_string(),
        ));
    }

    Ok(ValidatedRequest {
        prompt: prompt.to_string(),
        aspect_ratio,
        style: style.to_string(),
        quality,
    })
}

/// Checks a customization payload against the template's control definitions:
/// no unknown keys, required controls present, and each value matching its
/// control kind and constraints.
pub fn validate_customizations(
    controls: &[TemplateControl],
    values: &Map<String, Value>,
) -> Result<()> {
    for key in values.keys() {
        if !controls.iter().any(|c| &c.key == key) {
            return Err(AppError::InvalidRequest(format!(
                "unknown customization key: {}",
                key
            )));
        }
    }

    for control in controls {
        let value = values.get(&control.key).filter(|v| !v.is_null());

        let value = match (value, control.required) {
            (Some(v), _) => v,
            (None, true) => {
                return Err(AppError::InvalidRequest(format!(
                    "missing required customization: {}",
                    control.key
                )))
            }
            (None, false) => continue,
        };

        let kind = match control.kind() {
            Some(kind) => kind,
            // A control row with an unrecognized kind can't constrain anything.
            None => continue,
        };

        match kind {
            ControlKind::Color => {
                let ok = value
                    .as_str()
                    .map(is_hex_color)
                    .unwrap_or(false);
                if !ok {
                    return Err(invalid_value(&control.key, "a hex color like #112233"));
                }
            }
            ControlKind::Font | ControlKind::Text => {
                if !value.is_string() {
                    return Err(invalid_value(&control.key, "a string"));
                }
            }
            ControlKind::Number => {
                let number = value
                    .as_f64()
                    .ok_or_else(|| invalid_value(&control.key, "a number"))?;
                if let Some(min) = control.min_value {
                    if number < min {
                        return Err(invalid_value(&control.key, "within the allowed range"));
                    }
                }
                if let Some(max) = control.max_value {
                    if number > max {
                        return Err(invalid_value(&control.key, "within the allowed range"));
                    }
                }
            }
            ControlKind::Select => {
                let options = control.option_list().unwrap_or_default();
                let ok = value
                    .as_str()
                    .map(|s| options.iter().any(|o| o == s))
                    .unwrap_or(false);
                if !ok {
                    return Err(invalid_value(&control.key, "one of the listed options"));
                }
            }
            ControlKind::Toggle => {
                if !value.is_boolean() {
                    return Err(invalid_value(&control.key, "a boolean"));
                }
            }
        }
    }

    Ok(())
}

fn is_hex_color(s: &str) -> bool {
    let Some(digits) = s.strip_prefix('#') else {
        return false;
    };
    matches!(digits.len(), 3 | 4 | 6 | 8) && digits.chars().all(|c| c.is_ascii_hexdigit())
}

fn invalid_value(key: &str, expected: &str) -> AppError {
    AppError::InvalidRequest(format!("customization {} must be {}", key, expected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn control(kind: &str, key: &str, required: bool) -> TemplateControl {
        TemplateControl {
            id: Uuid::new_v4(),
            template_id: Uuid::new_v4(),
            kind: kind.to_string(),
            key: key.to_string(),
            label: key.to_string(),
            default_value: None,
            options: None,
            min_value: None,
            max_value: None,
            required,
            display_order: 0,
            created_at: Utc::now(),
        }
    }

    fn values(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let controls = vec![control("text", "headline", false)];
        let err =
            validate_customizations(&controls, &values(&[("surprise", json!("x"))])).unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
    }

    #[test]
    fn required_controls_must_be_present() {
        let controls = vec![control("text", "headline", true)];
        let err = validate_customizations(&controls, &values(&[])).unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
    }

    #[test]
    fn color_values_must_be_hex() {
        let controls = vec![control("color", "primaryColor", false)];
        validate_customizations(&controls, &values(&[("primaryColor", json!("#112233"))]))
            .unwrap();
        let err =
            validate_customizations(&controls, &values(&[("primaryColor", json!("red"))]))
                .unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
    }

    #[test]
    fn number_ranges_are_enforced() {
        let mut c = control("number", "columns", false);
        c.min_value = Some(1.0);
        c.max_value = Some(4.0);
        let controls = vec![c];
        validate_customizations(&controls, &values(&[("columns", json!(3))])).unwrap();
        let err = validate_customizations(&controls, &values(&[("columns", json!(9))]))
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
    }

    #[test]
    fn select_values_must_match_an_option() {
        let mut c = control("select", "layout", false);
        c.options = Some(json!(["grid", "list"]));
        let controls = vec![c];
        validate_customizations(&controls, &values(&[("layout", json!("grid"))])).unwrap();
        let err = validate_customizations(&controls, &values(&[("layout", json!("mosaic"))]))
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
    }

    #[test]
    fn toggle_values_must_be_boolean() {
        let controls = vec![control("toggle", "showLogo", false)];
        validate_customizations(&controls, &values(&[("showLogo", json!(true))])).unwrap();
        let err = validate_customizations(&controls, &values(&[("showLogo", json!("yes"))]))
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
    }

    #[test]
    fn missing_fields_fail_validation() {
        let request = GenerateRequest {
            prompt: Some("a logo".to_string()),
            aspect_ratio: None,
            style: Some("flat".to_string()),
            quality: Some(80),
            brand_kit_id: None,
            template_id: None,
            variant_id: None,
            customizations: None,
        };
        let err = validate_request(&request).unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
    }
}
