use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BrandKit {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub colors: Vec<String>,
    pub tags: Vec<String>,
    pub thumbnail: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBrandKit {
    pub name: String,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandKitUpdate {
    pub name: Option<String>,
    pub colors: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetFileType {
    Image,
    Font,
    Document,
    Other,
}

impl AssetFileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetFileType::Image => "image",
            AssetFileType::Font => "font",
            AssetFileType::Document => "document",
            AssetFileType::Other => "other",
        }
    }

    pub fn from_mime(mime: &str) -> AssetFileType {
        if mime.starts_with("image/") {
            AssetFileType::Image
        } else if mime.starts_with("font/") || mime.contains("font") {
            AssetFileType::Font
        } else if mime == "application/pdf" || mime.starts_with("text/") {
            AssetFileType::Document
        } else {
            AssetFileType::Other
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BrandKitAsset {
    pub id: Uuid,
    pub brand_kit_id: Uuid,
    pub file_url: String,
    pub file_name: String,
    pub file_type: String,
    pub file_size: i64,
    pub storage_key: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_type_classification() {
        assert_eq!(AssetFileType::from_mime("image/png"), AssetFileType::Image);
        assert_eq!(AssetFileType::from_mime("font/woff2"), AssetFileType::Font);
        assert_eq!(
            AssetFileType::from_mime("application/pdf"),
            AssetFileType::Document
        );
        assert_eq!(
            AssetFileType::from_mime("application/zip"),
            AssetFileType::Other
        );
    }
}
