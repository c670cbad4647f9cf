use uuid::Uuid;

use crate::{
    database::Database,
    error::Result,
    models::{BillingUpdate, Subscription},
};

impl Database {
    pub async fn get_subscription(&self, user_id: Uuid) -> Result<Option<Subscription>> {
        let subscription = sqlx::query_as::<_, Subscription>(
            "SELECT * FROM subscriptions WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(self.pool())
        .await?;

        Ok(subscription)
    }

    pub async fn create_default_subscription(
        &self,
        user_id: Uuid,
        generations_limit: i32,
    ) -> Result<Subscription> {
        let subscription = sqlx::query_as::<_, Subscription>(
            r#"
            INSERT INTO subscriptions (user_id, tier, status, generations_used, generations_limit)
            VALUES ($1, 'free', 'active', 0, $2)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(generations_limit)
        .fetch_one(self.pool())
        .await?;

        Ok(subscription)
    }

    /// Single atomic increment at the storage layer; called exactly once per
    /// successful generation, after the asset is durably stored.
    pub async fn increment_generations_used(&self, user_id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE subscriptions
            SET generations_used = generations_used + 1, updated_at = NOW()
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    pub async fn reset_monthly_generations(&self, user_id: Uuid) -> Result<()> {
        sqlx::query(
            "UPDATE subscriptions SET generations_used = 0, updated_at = NOW() WHERE user_id = $1",
        )
        .bind(user_id)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    /// Applies a plan change pushed by the billing collaborator. The limit is
    /// derived from the new tier, never taken from the caller.
    pub async fn apply_billing_update(
        &self,
        update: &BillingUpdate,
        free_limit: i32,
    ) -> Result<Subscription> {
        let subscription = sqlx::query_as::<_, Subscription>(
            r#"
            UPDATE subscriptions
            SET tier = $2,
                status = $3,
                stripe_customer_id = COALESCE($4, stripe_customer_id),
                stripe_subscription_id = $5,
                current_period_end = $6,
                cancel_at_period_end = $7,
                generations_limit = $8,
                updated_at = NOW()
            WHERE user_id = $1
            RETURNING *
            "#,
        )
        .bind(update.user_id)
        .bind(update.tier.as_str())
        .bind(update.status.as_str())
        .bind(&update.stripe_customer_id)
        .bind(&update.stripe_subscription_id)
        .bind(update.current_period_end)
        .bind(update.cancel_at_period_end)
        .bind(update.tier.generation_limit(free_limit))
        .fetch_one(self.pool())
        .await?;

        Ok(subscription)
    }
}
