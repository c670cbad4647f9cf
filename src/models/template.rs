use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateCategory {
    Logo,
    Social,
    Print,
    BrandKit,
    Other,
}

impl TemplateCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateCategory::Logo => "logo",
            TemplateCategory::Social => "social",
            TemplateCategory::Print => "print",
            TemplateCategory::BrandKit => "brand-kit",
            TemplateCategory::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<TemplateCategory> {
        match s {
            "logo" => Some(TemplateCategory::Logo),
            "social" => Some(TemplateCategory::Social),
            "print" => Some(TemplateCategory::Print),
            "brand-kit" => Some(TemplateCategory::BrandKit),
            "other" => Some(TemplateCategory::Other),
            _ => None,
        }
    }
}

/// Marketplace listing. Prices are integer cents; `industries` and
/// `style_tags` are serialized string sets parsed defensively.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: Uuid,
    pub creator_id: Uuid,
    pub name: String,
    pub description: String,
    pub preview_url: Option<String>,
    pub price_cents: i64,
    pub category: String,
    pub industries: Option<String>,
    pub style_tags: Option<String>,
    pub ai_prompt: Option<String>,
    pub use_case: Option<String>,
    pub default_palette: Option<serde_json::Value>,
    pub default_font: Option<String>,
    pub is_premium: bool,
    pub is_active: bool,
    pub sales_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn parse_string_set(raw: Option<&str>) -> Option<Vec<String>> {
    // Malformed serialized sets are treated as absent, never as an error.
    let parsed: Vec<String> = serde_json::from_str(raw?).ok()?;
    if parsed.is_empty() {
        None
    } else {
        Some(parsed)
    }
}

impl Template {
    pub fn style_tag_list(&self) -> Option<Vec<String>> {
        parse_string_set(self.style_tags.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTemplate {
    pub name: String,
    pub description: String,
    pub preview_url: Option<String>,
    pub price_cents: i64,
    pub category: TemplateCategory,
    pub industries: Option<Vec<String>>,
    pub style_tags: Option<Vec<String>>,
    pub ai_prompt: Option<String>,
    pub use_case: Option<String>,
    pub default_palette: Option<serde_json::Value>,
    pub default_font: Option<String>,
    #[serde(default)]
    pub is_premium: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub preview_url: Option<String>,
    pub price_cents: Option<i64>,
    pub category: Option<TemplateCategory>,
    pub is_premium: Option<bool>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TemplateVariant {
    pub id: Uuid,
    pub template_id: Uuid,
    pub name: String,
    pub width: i32,
    pub height: i32,
    pub orientation: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTemplateVariant {
    pub name: String,
    pub width: i32,
    pub height: i32,
    pub orientation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlKind {
    Color,
    Font,
    Text,
    Number,
    Select,
    Toggle,
}

impl ControlKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlKind::Color => "color",
            ControlKind::Font => "font",
            ControlKind::Text => "text",
            ControlKind::Number => "number",
            ControlKind::Select => "select",
            ControlKind::Toggle => "toggle",
        }
    }

    pub fn parse(s: &str) -> Option<ControlKind> {
        match s {
            "color" => Some(ControlKind::Color),
            "font" => Some(ControlKind::Font),
            "text" => Some(ControlKind::Text),
            "number" => Some(ControlKind::Number),
            "select" => Some(ControlKind::Select),
            "toggle" => Some(ControlKind::Toggle),
            _ => None,
        }
    }
}

/// Customization field definition; the set of controls on a template defines
/// the shape of a customization payload.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TemplateControl {
    pub id: Uuid,
    pub template_id: Uuid,
    pub kind: String,
    pub key: String,
    pub label: String,
    pub default_value: Option<serde_json::Value>,
    pub options: Option<serde_json::Value>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub required: bool,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
}

impl TemplateControl {
    pub fn kind(&self) -> Option<ControlKind> {
        ControlKind::parse(&self.kind)
    }

    pub fn option_list(&self) -> Option<Vec<String>> {
        let options = self.options.as_ref()?;
        serde_json::from_value(options.clone()).ok()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTemplateControl {
    pub kind: ControlKind,
    pub key: String,
    pub label: String,
    pub default_value: Option<serde_json::Value>,
    pub options: Option<Vec<String>>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub display_order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TemplateCustomization {
    pub id: Uuid,
    pub user_id: Uuid,
    pub template_id: Uuid,
    pub name: String,
    pub values: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTemplateCustomization {
    pub template_id: Uuid,
    pub name: String,
    pub values: serde_json::Map<String, serde_json::Value>,
}

/// Immutable record of one purchase, capturing the price split at purchase time.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TemplatePurchase {
    pub id: Uuid,
    pub user_id: Uuid,
    pub template_id: Uuid,
    pub purchase_price_cents: i64,
    pub creator_earnings_cents: i64,
    pub platform_fee_cents: i64,
    pub payment_reference: Option<String>,
    pub purchased_at: DateTime<Utc>,
}

/// Platform takes 20%, the creator keeps the remainder.
pub fn split_purchase_price(price_cents: i64) -> (i64, i64) {
    let platform_fee = price_cents * 20 / 100;
    (platform_fee, price_cents - platform_fee)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_style_tags_are_treated_as_absent() {
        let mut template = template_fixture();
        template.style_tags = Some("not json at all".to_string());
        assert_eq!(template.style_tag_list(), None);

        template.style_tags = Some("[\"minimal\",\"retro\"]".to_string());
        assert_eq!(
            template.style_tag_list(),
            Some(vec!["minimal".to_string(), "retro".to_string()])
        );

        template.style_tags = Some("[]".to_string());
        assert_eq!(template.style_tag_list(), None);
    }

    #[test]
    fn purchase_split_is_80_20() {
        let (fee, earnings) = split_purchase_price(2500);
        assert_eq!(fee, 500);
        assert_eq!(earnings, 2000);
        assert_eq!(fee + earnings, 2500);
    }

    #[test]
    fn purchase_split_never_loses_a_cent() {
        for price in [1, 99, 101, 12345] {
            let (fee, earnings) = split_purchase_price(price);
            assert_eq!(fee + earnings, price);
        }
    }

    fn template_fixture() -> Template {
        Template {
            id: Uuid::new_v4(),
            creator_id: Uuid::new_v4(),
            name: "Launch logo".to_string(),
            description: "A logo pack".to_string(),
            preview_url: None,
            price_cents: 2500,
            category: "logo".to_string(),
            industries: None,
            style_tags: None,
            ai_prompt: None,
            use_case: None,
            default_palette: None,
            default_font: None,
            is_premium: false,
            is_active: true,
            sales_count: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}
