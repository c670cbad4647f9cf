use serde_json::{Map, Value};

use crate::models::Template;

/// Fixed directive appended to every generation prompt.
const QUALITY_DIRECTIVE: &str = "High quality, professional, detailed.";

/// Template metadata folded into the prompt. All fields optional; anything
/// malformed upstream arrives here already dropped.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    pub seed_prompt: Option<String>,
    pub use_case: Option<String>,
    pub style_tags: Option<Vec<String>>,
}

impl TemplateContext {
    pub fn from_template(template: &Template) -> Self {
        TemplateContext {
            seed_prompt: template.ai_prompt.clone(),
            use_case: template.use_case.clone(),
            style_tags: template.style_tag_list(),
        }
    }
}

/// Composes the final generation prompt. Pure; identical inputs always yield
/// an identical string (customization keys render in sorted order).
pub fn build_prompt(
    base_prompt: &str,
    style: &str,
    template: Option<&TemplateContext>,
    customizations: Option<&Map<String, Value>>,
) -> String {
    let mut prompt = format!("{}. Style: {}. {}", base_prompt, style, QUALITY_DIRECTIVE);

    if let Some(ctx) = template {
        if let Some(seed) = ctx.seed_prompt.as_deref().filter(|s| !s.is_empty()) {
            prompt.push(' ');
            prompt.push_str(seed);
        }
        if let Some(use_case) = ctx.use_case.as_deref().filter(|s| !s.is_empty()) {
            prompt.push_str(&format!(" Use case: {}.", use_case));
        }
        if let Some(tags) = ctx.style_tags.as_ref().filter(|t| !t.is_empty()) {
            prompt.push_str(&format!(" Design style: {}.", tags.join(", ")));
        }
    }

    if let Some(values) = customizations {
        let fragments: Vec<String> = values
            .iter()
            .filter_map(|(key, value)| render_fragment(key, value))
            .collect();
        if !fragments.is_empty() {
            prompt.push_str(&format!(" Customizations: {}.", fragments.join(", ")));
        }
    }

    prompt
}

/// One human-readable clause per customization value, picked by key and value
/// kind. Null values are skipped.
fn render_fragment(key: &str, value: &Value) -> Option<String> {
    if value.is_null() {
        return None;
    }

    let lowered = key.to_lowercase();
    if lowered.contains("color") {
        return Some(format!("{}: {}", key, render_plain(value)));
    }
    if lowered.contains("font") {
        return Some(format!("using {} font", render_plain(value)));
    }

    match value {
        Value::String(s) => Some(format!("{}: \"{}\"", key, s)),
        Value::Number(n) => Some(format!("{}: {}", key, n)),
        Value::Bool(true) => Some(format!("{}: enabled", key)),
        Value::Bool(false) => Some(format!("{}: disabled", key)),
        // Arrays and objects have no sensible prose form; skip them.
        _ => None,
    }
}

fn render_plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn values(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn base_prompt_carries_style_and_quality_directive() {
        let prompt = build_prompt("A bold coffee shop logo", "minimalist", None, None);
        assert_eq!(
            prompt,
            "A bold coffee shop logo. Style: minimalist. High quality, professional, detailed."
        );
    }

    #[test]
    fn template_context_is_appended() {
        let ctx = TemplateContext {
            seed_prompt: Some("Clean geometric mark.".to_string()),
            use_case: Some("storefront signage".to_string()),
            style_tags: Some(vec!["minimal".to_string(), "modern".to_string()]),
        };
        let prompt = build_prompt("A logo", "flat", Some(&ctx), None);
        assert!(prompt.contains("Clean geometric mark."));
        assert!(prompt.contains("Use case: storefront signage."));
        assert!(prompt.contains("Design style: minimal, modern."));
    }

    #[test]
    fn empty_template_context_changes_nothing() {
        let with_ctx = build_prompt("A logo", "flat", Some(&TemplateContext::default()), None);
        let without = build_prompt("A logo", "flat", None, None);
        assert_eq!(with_ctx, without);
    }

    #[test]
    fn customization_fragments_render_by_value_kind() {
        let map = values(&[
            ("primaryColor", json!("#112233")),
            ("headline", json!("Hello")),
            ("showLogo", json!(true)),
        ]);
        let prompt = build_prompt("A banner", "bold", None, Some(&map));
        assert!(prompt.contains("primaryColor: #112233"));
        assert!(prompt.contains("headline: \"Hello\""));
        assert!(prompt.contains("showLogo: enabled"));
    }

    #[test]
    fn font_number_and_disabled_fragments() {
        let map = values(&[
            ("bodyFont", json!("Inter")),
            ("columns", json!(3)),
            ("showBorder", json!(false)),
        ]);
        let prompt = build_prompt("A flyer", "retro", None, Some(&map));
        assert!(prompt.contains("using Inter font"));
        assert!(prompt.contains("columns: 3"));
        assert!(prompt.contains("showBorder: disabled"));
    }

    #[test]
    fn null_values_are_skipped() {
        let map = values(&[("headline", json!(null))]);
        let prompt = build_prompt("A card", "plain", None, Some(&map));
        assert!(!prompt.contains("Customizations"));
    }

    #[test]
    fn composition_is_deterministic() {
        let ctx = TemplateContext {
            seed_prompt: Some("seed".to_string()),
            use_case: None,
            style_tags: Some(vec!["a".to_string(), "b".to_string()]),
        };
        let map = values(&[("accentColor", json!("#fff")), ("headline", json!("Hi"))]);
        let first = build_prompt("base", "style", Some(&ctx), Some(&map));
        let second = build_prompt("base", "style", Some(&ctx), Some(&map));
        assert_eq!(first, second);
    }
}
