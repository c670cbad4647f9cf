use uuid::Uuid;

use crate::{
    database::Database,
    error::Result,
    models::{UpsertUser, User},
};

impl Database {
    pub async fn get_user(&self, user_id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(self.pool())
            .await?;

        Ok(user)
    }

    /// Inserts or refreshes the user row from the auth provider's claims, and
    /// seeds a default free subscription for first-time users.
    pub async fn upsert_user(
        &self,
        user_id: Uuid,
        data: &UpsertUser,
        free_limit: i32,
    ) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, first_name, last_name, profile_image_url)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                email = EXCLUDED.email,
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                profile_image_url = EXCLUDED.profile_image_url,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&data.email)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(&data.profile_image_url)
        .fetch_one(self.pool())
        .await?;

        if self.get_subscription(user.id).await?.is_none() {
            self.create_default_subscription(user.id, free_limit).await?;
        }

        Ok(user)
    }
}
