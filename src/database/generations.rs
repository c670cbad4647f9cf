use uuid::Uuid;

use crate::{
    database::Database,
    error::Result,
    models::{Generation, NewGeneration},
};

impl Database {
    pub async fn create_generation(&self, new: &NewGeneration) -> Result<Generation> {
        let generation = sqlx::query_as::<_, Generation>(
            r#"
            INSERT INTO generations
                (user_id, brand_kit_id, template_id, variant_id, customizations,
                 prompt, image_url, aspect_ratio, style, quality, has_watermark, is_favorite)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, FALSE)
            RETURNING *
            "#,
        )
        .bind(new.user_id)
        .bind(new.brand_kit_id)
        .bind(new.template_id)
        .bind(new.variant_id)
        .bind(&new.customizations)
        .bind(&new.prompt)
        .bind(&new.image_url)
        .bind(new.aspect_ratio.as_str())
        .bind(&new.style)
        .bind(new.quality)
        .bind(new.has_watermark)
        .fetch_one(self.pool())
        .await?;

        Ok(generation)
    }

    pub async fn get_generation(&self, id: Uuid) -> Result<Option<Generation>> {
        let generation = sqlx::query_as::<_, Generation>("SELECT * FROM generations WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;

        Ok(generation)
    }

    pub async fn get_user_generations(
        &self,
        user_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<Generation>> {
        let generations = sqlx::query_as::<_, Generation>(
            r#"
            SELECT * FROM generations
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit.unwrap_or(i64::MAX))
        .fetch_all(self.pool())
        .await?;

        Ok(generations)
    }

    pub async fn toggle_generation_favorite(&self, id: Uuid) -> Result<()> {
        sqlx::query("UPDATE generations SET is_favorite = NOT is_favorite WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(())
    }

    pub async fn delete_generation(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM generations WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
