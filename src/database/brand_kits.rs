use uuid::Uuid;

use crate::{
    database::Database,
    error::Result,
    models::{BrandKit, BrandKitAsset, BrandKitUpdate, NewBrandKit},
};

impl Database {
    pub async fn get_brand_kit(&self, id: Uuid) -> Result<Option<BrandKit>> {
        let kit = sqlx::query_as::<_, BrandKit>("SELECT * FROM brand_kits WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;

        Ok(kit)
    }

    pub async fn get_user_brand_kits(&self, user_id: Uuid) -> Result<Vec<BrandKit>> {
        let kits = sqlx::query_as::<_, BrandKit>(
            "SELECT * FROM brand_kits WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;

        Ok(kits)
    }

    pub async fn count_user_brand_kits(&self, user_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM brand_kits WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(self.pool())
            .await?;

        Ok(count)
    }

    pub async fn create_brand_kit(&self, user_id: Uuid, new: &NewBrandKit) -> Result<BrandKit> {
        let kit = sqlx::query_as::<_, BrandKit>(
            r#"
            INSERT INTO brand_kits (user_id, name, colors, tags, thumbnail)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&new.name)
        .bind(&new.colors)
        .bind(&new.tags)
        .bind(&new.thumbnail)
        .fetch_one(self.pool())
        .await?;

        Ok(kit)
    }

    pub async fn update_brand_kit(&self, id: Uuid, update: &BrandKitUpdate) -> Result<BrandKit> {
        let kit = sqlx::query_as::<_, BrandKit>(
            r#"
            UPDATE brand_kits
            SET name = COALESCE($2, name),
                colors = COALESCE($3, colors),
                tags = COALESCE($4, tags),
                thumbnail = COALESCE($5, thumbnail),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&update.name)
        .bind(&update.colors)
        .bind(&update.tags)
        .bind(&update.thumbnail)
        .fetch_one(self.pool())
        .await?;

        Ok(kit)
    }

    /// Row cascade removes the kit's asset records; stored objects are cleaned
    /// up by the caller.
    pub async fn delete_brand_kit(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM brand_kits WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn get_brand_kit_assets(&self, brand_kit_id: Uuid) -> Result<Vec<BrandKitAsset>> {
        let assets = sqlx::query_as::<_, BrandKitAsset>(
            "SELECT * FROM brand_kit_assets WHERE brand_kit_id = $1 ORDER BY created_at DESC",
        )
        .bind(brand_kit_id)
        .fetch_all(self.pool())
        .await?;

        Ok(assets)
    }

    pub async fn get_brand_kit_asset(&self, id: Uuid) -> Result<Option<BrandKitAsset>> {
        let asset =
            sqlx::query_as::<_, BrandKitAsset>("SELECT * FROM brand_kit_assets WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool())
                .await?;

        Ok(asset)
    }

    pub async fn create_brand_kit_asset(
        &self,
        brand_kit_id: Uuid,
        file_url: &str,
        file_name: &str,
        file_type: &str,
        file_size: i64,
        storage_key: &str,
    ) -> Result<BrandKitAsset> {
        let asset = sqlx::query_as::<_, BrandKitAsset>(
            r#"
            INSERT INTO brand_kit_assets
                (brand_kit_id, file_url, file_name, file_type, file_size, storage_key)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(brand_kit_id)
        .bind(file_url)
        .bind(file_name)
        .bind(file_type)
        .bind(file_size)
        .bind(storage_key)
        .fetch_one(self.pool())
        .await?;

        Ok(asset)
    }

    pub async fn delete_brand_kit_asset(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM brand_kit_assets WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
