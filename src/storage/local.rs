use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::path::{Component, Path, PathBuf};
use tokio::fs;

use crate::{
    error::{AppError, Result},
    storage::{is_public_key, AssetStore},
};

/// Filesystem-backed asset store. Public keys map to stable URLs; private keys
/// get URLs signed with a server secret and an expiry timestamp.
pub struct LocalAssetStore {
    base_path: PathBuf,
    base_url: String,
    url_secret: String,
    signed_url_ttl_secs: i64,
}

impl LocalAssetStore {
    pub fn new<P: AsRef<Path>>(
        base_path: P,
        base_url: &str,
        url_secret: &str,
        signed_url_ttl_secs: i64,
    ) -> Result<Self> {
        let base_path = base_path.as_ref().to_path_buf();
        std::fs::create_dir_all(&base_path)
            .map_err(|e| AppError::Storage(format!("failed to create asset directory: {}", e)))?;

        Ok(Self {
            base_path,
            base_url: base_url.trim_end_matches('/').to_string(),
            url_secret: url_secret.to_string(),
            signed_url_ttl_secs,
        })
    }

    fn full_path(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        // Keys are server-generated, but asset serving passes client paths here.
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(AppError::InvalidRequest("invalid asset key".to_string()));
        }
        Ok(self.base_path.join(relative))
    }

    fn signature(&self, key: &str, expires: i64) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.url_secret.as_bytes());
        hasher.update(b"\0");
        hasher.update(key.as_bytes());
        hasher.update(b"\0");
        hasher.update(expires.to_be_bytes());
        format!("{:x}", hasher.finalize())
    }

    pub fn signed_url(&self, key: &str) -> String {
        let expires = chrono::Utc::now().timestamp() + self.signed_url_ttl_secs;
        format!(
            "{}/{}?expires={}&sig={}",
            self.base_url,
            key,
            expires,
            self.signature(key, expires)
        )
    }

    pub fn verify_signature(&self, key: &str, expires: i64, sig: &str) -> bool {
        if expires < chrono::Utc::now().timestamp() {
            return false;
        }
        self.signature(key, expires) == sig
    }

    pub fn url_for(&self, key: &str) -> String {
        if is_public_key(key) {
            format!("{}/{}", self.base_url, key)
        } else {
            self.signed_url(key)
        }
    }
}

#[async_trait]
impl AssetStore for LocalAssetStore {
    async fn save(&self, key: &str, bytes: &[u8]) -> Result<String> {
        let full_path = self.full_path(key)?;
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Storage(format!("failed to create directory: {}", e)))?;
        }

        fs::write(&full_path, bytes)
            .await
            .map_err(|e| AppError::Storage(format!("failed to write object: {}", e)))?;

        Ok(self.url_for(key))
    }

    async fn read(&self, key: &str) -> Result<Vec<u8>> {
        let full_path = self.full_path(key)?;
        match fs::read(&full_path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(AppError::ObjectNotFound),
            Err(e) => Err(AppError::Storage(format!("failed to read object: {}", e))),
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let full_path = self.full_path(key)?;
        match fs::remove_file(&full_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Storage(format!("failed to delete object: {}", e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store(dir: &tempfile::TempDir) -> LocalAssetStore {
        LocalAssetStore::new(dir.path(), "/assets", "test-secret", 3600).unwrap()
    }

    #[tokio::test]
    async fn save_read_delete_roundtrip() {
        let dir = tempdir().unwrap();
        let store = store(&dir);

        let url = store
            .save("public/generations/1-abc.png", b"bytes")
            .await
            .unwrap();
        assert_eq!(url, "/assets/public/generations/1-abc.png");

        let read = store.read("public/generations/1-abc.png").await.unwrap();
        assert_eq!(read, b"bytes");

        store.delete("public/generations/1-abc.png").await.unwrap();
        let err = store.read("public/generations/1-abc.png").await.unwrap_err();
        assert!(matches!(err, AppError::ObjectNotFound));
    }

    #[tokio::test]
    async fn deleting_absent_object_is_a_no_op() {
        let dir = tempdir().unwrap();
        store(&dir).delete("public/generations/nope.png").await.unwrap();
    }

    #[tokio::test]
    async fn private_urls_are_signed_and_verifiable() {
        let dir = tempdir().unwrap();
        let store = store(&dir);

        let url = store
            .save("private/generations/2-def.svg", b"bytes")
            .await
            .unwrap();
        assert!(url.contains("expires="));
        assert!(url.contains("sig="));

        let query = url.split('?').nth(1).unwrap();
        let mut expires = 0i64;
        let mut sig = String::new();
        for pair in query.split('&') {
            let (k, v) = pair.split_once('=').unwrap();
            match k {
                "expires" => expires = v.parse().unwrap(),
                "sig" => sig = v.to_string(),
                _ => {}
            }
        }

        assert!(store.verify_signature("private/generations/2-def.svg", expires, &sig));
        assert!(!store.verify_signature("private/generations/other.svg", expires, &sig));
    }

    #[tokio::test]
    async fn expired_signature_is_rejected() {
        let dir = tempdir().unwrap();
        let store = store(&dir);
        let expired = chrono::Utc::now().timestamp() - 10;
        let sig = store.signature("private/generations/x.svg", expired);
        assert!(!store.verify_signature("private/generations/x.svg", expired, &sig));
    }

    #[tokio::test]
    async fn traversal_keys_are_rejected() {
        let dir = tempdir().unwrap();
        let err = store(&dir).read("../outside").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
    }
}
