use async_trait::async_trait;
use rand::{distributions::Alphanumeric, Rng};

pub mod local;

pub use local::LocalAssetStore;

/// Object store for generated and uploaded assets. Keys under `public/` are
/// world-readable; everything else requires a time-limited signed URL.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Durably writes `bytes` and returns a dereferenceable URL. The caller is
    /// responsible for key uniqueness.
    async fn save(&self, key: &str, bytes: &[u8]) -> crate::error::Result<String>;

    /// Missing object reads fail with `ObjectNotFound`.
    async fn read(&self, key: &str) -> crate::error::Result<Vec<u8>>;

    /// Deleting an absent object is a no-op.
    async fn delete(&self, key: &str) -> crate::error::Result<()>;
}

pub fn is_public_key(key: &str) -> bool {
    key.starts_with("public/")
}

/// Unique key for one generated asset: millisecond timestamp + random suffix.
pub fn generation_key(public: bool, extension: &str) -> String {
    let prefix = if public { "public" } else { "private" };
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    format!(
        "{}/generations/{}-{}.{}",
        prefix,
        chrono::Utc::now().timestamp_millis(),
        suffix,
        extension
    )
}

pub fn brand_kit_asset_key(brand_kit_id: uuid::Uuid, file_name: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    format!("private/brand-kits/{}/{}-{}", brand_kit_id, suffix, file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_keys_are_unique_and_prefixed() {
        let a = generation_key(true, "png");
        let b = generation_key(true, "png");
        assert_ne!(a, b);
        assert!(a.starts_with("public/generations/"));
        assert!(a.ends_with(".png"));

        let private = generation_key(false, "svg");
        assert!(private.starts_with("private/generations/"));
        assert!(!is_public_key(&private));
    }
}
