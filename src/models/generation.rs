use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "16:9")]
    Wide,
    #[serde(rename = "9:16")]
    Tall,
    #[serde(rename = "4:3")]
    Standard,
    #[serde(rename = "3:4")]
    Portrait,
}

impl AspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Wide => "16:9",
            AspectRatio::Tall => "9:16",
            AspectRatio::Standard => "4:3",
            AspectRatio::Portrait => "3:4",
        }
    }

    /// Provider output size. Anything without a dedicated size renders square.
    pub fn output_size(&self) -> &'static str {
        match self {
            AspectRatio::Wide => "1792x1024",
            AspectRatio::Tall => "1024x1792",
            _ => "1024x1024",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Generation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub brand_kit_id: Option<Uuid>,
    pub template_id: Option<Uuid>,
    pub variant_id: Option<Uuid>,
    pub customizations: Option<serde_json::Value>,
    pub prompt: String,
    pub image_url: String,
    pub aspect_ratio: String,
    pub style: String,
    pub quality: i32,
    pub has_watermark: bool,
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewGeneration {
    pub user_id: Uuid,
    pub brand_kit_id: Option<Uuid>,
    pub template_id: Option<Uuid>,
    pub variant_id: Option<Uuid>,
    pub customizations: Option<serde_json::Value>,
    pub prompt: String,
    pub image_url: String,
    pub aspect_ratio: AspectRatio,
    pub style: String,
    pub quality: i32,
    pub has_watermark: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub prompt: Option<String>,
    pub aspect_ratio: Option<AspectRatio>,
    pub style: Option<String>,
    pub quality: Option<i32>,
    pub brand_kit_id: Option<Uuid>,
    pub template_id: Option<Uuid>,
    pub variant_id: Option<Uuid>,
    pub customizations: Option<serde_json::Map<String, serde_json::Value>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_ratio_size_mapping() {
        assert_eq!(AspectRatio::Square.output_size(), "1024x1024");
        assert_eq!(AspectRatio::Standard.output_size(), "1024x1024");
        assert_eq!(AspectRatio::Portrait.output_size(), "1024x1024");
        assert_eq!(AspectRatio::Wide.output_size(), "1792x1024");
        assert_eq!(AspectRatio::Tall.output_size(), "1024x1792");
    }

    #[test]
    fn aspect_ratio_deserializes_from_wire_format() {
        let ratio: AspectRatio = serde_json::from_str("\"16:9\"").unwrap();
        assert_eq!(ratio, AspectRatio::Wide);
    }
}
