use uuid::Uuid;

use crate::{
    database::Database,
    error::Result,
    models::{
        split_purchase_price, NewTemplate, NewTemplateControl, NewTemplateCustomization,
        NewTemplateVariant, Template, TemplateCategory, TemplateControl, TemplateCustomization,
        TemplatePurchase, TemplateUpdate, TemplateVariant,
    },
};

#[derive(Debug, Clone, Default)]
pub struct TemplateFilter {
    pub category: Option<TemplateCategory>,
    pub creator_id: Option<Uuid>,
    pub active_only: bool,
}

fn to_string_set(values: &Option<Vec<String>>) -> Option<String> {
    values
        .as_ref()
        .filter(|v| !v.is_empty())
        .map(|v| serde_json::to_string(v).unwrap_or_default())
}

impl Database {
    pub async fn get_template(&self, id: Uuid) -> Result<Option<Template>> {
        let template = sqlx::query_as::<_, Template>("SELECT * FROM templates WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;

        Ok(template)
    }

    pub async fn get_templates(&self, filter: &TemplateFilter) -> Result<Vec<Template>> {
        let templates = sqlx::query_as::<_, Template>(
            r#"
            SELECT * FROM templates
            WHERE ($1::TEXT IS NULL OR category = $1)
              AND ($2::UUID IS NULL OR creator_id = $2)
              AND (NOT $3 OR is_active)
            ORDER BY created_at DESC
            "#,
        )
        .bind(filter.category.map(|c| c.as_str()))
        .bind(filter.creator_id)
        .bind(filter.active_only)
        .fetch_all(self.pool())
        .await?;

        Ok(templates)
    }

    pub async fn create_template(&self, creator_id: Uuid, new: &NewTemplate) -> Result<Template> {
        let template = sqlx::query_as::<_, Template>(
            r#"
            INSERT INTO templates
                (creator_id, name, description, preview_url, price_cents, category,
                 industries, style_tags, ai_prompt, use_case, default_palette,
                 default_font, is_premium, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, TRUE)
            RETURNING *
            "#,
        )
        .bind(creator_id)
        .bind(&new.name)
        .bind(&new.description)
        .bind(&new.preview_url)
        .bind(new.price_cents)
        .bind(new.category.as_str())
        .bind(to_string_set(&new.industries))
        .bind(to_string_set(&new.style_tags))
        .bind(&new.ai_prompt)
        .bind(&new.use_case)
        .bind(&new.default_palette)
        .bind(&new.default_font)
        .bind(new.is_premium)
        .fetch_one(self.pool())
        .await?;

        Ok(template)
    }

    pub async fn update_template(&self, id: Uuid, update: &TemplateUpdate) -> Result<Template> {
        let template = sqlx::query_as::<_, Template>(
            r#"
            UPDATE templates
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                preview_url = COALESCE($4, preview_url),
                price_cents = COALESCE($5, price_cents),
                category = COALESCE($6, category),
                is_premium = COALESCE($7, is_premium),
                is_active = COALESCE($8, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&update.name)
        .bind(&update.description)
        .bind(&update.preview_url)
        .bind(update.price_cents)
        .bind(update.category.map(|c| c.as_str()))
        .bind(update.is_premium)
        .bind(update.is_active)
        .fetch_one(self.pool())
        .await?;

        Ok(template)
    }

    /// Cascades to variants, controls, customizations, and purchases.
    pub async fn delete_template(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM templates WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn increment_template_sales(&self, id: Uuid) -> Result<()> {
        sqlx::query("UPDATE templates SET sales_count = sales_count + 1 WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(())
    }

    // Variants

    pub async fn get_template_variants(&self, template_id: Uuid) -> Result<Vec<TemplateVariant>> {
        let variants = sqlx::query_as::<_, TemplateVariant>(
            "SELECT * FROM template_variants WHERE template_id = $1 ORDER BY created_at",
        )
        .bind(template_id)
        .fetch_all(self.pool())
        .await?;

        Ok(variants)
    }

    pub async fn get_template_variant(&self, id: Uuid) -> Result<Option<TemplateVariant>> {
        let variant =
            sqlx::query_as::<_, TemplateVariant>("SELECT * FROM template_variants WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool())
                .await?;

        Ok(variant)
    }

    pub async fn create_template_variant(
        &self,
        template_id: Uuid,
        new: &NewTemplateVariant,
    ) -> Result<TemplateVariant> {
        let variant = sqlx::query_as::<_, TemplateVariant>(
            r#"
            INSERT INTO template_variants (template_id, name, width, height, orientation)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(template_id)
        .bind(&new.name)
        .bind(new.width)
        .bind(new.height)
        .bind(&new.orientation)
        .fetch_one(self.pool())
        .await?;

        Ok(variant)
    }

    pub async fn delete_template_variant(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM template_variants WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // Controls

    pub async fn get_template_controls(&self, template_id: Uuid) -> Result<Vec<TemplateControl>> {
        let controls = sqlx::query_as::<_, TemplateControl>(
            "SELECT * FROM template_controls WHERE template_id = $1 ORDER BY display_order, created_at",
        )
        .bind(template_id)
        .fetch_all(self.pool())
        .await?;

        Ok(controls)
    }

    pub async fn create_template_control(
        &self,
        template_id: Uuid,
        new: &NewTemplateControl,
    ) -> Result<TemplateControl> {
        let options = new
            .options
            .as_ref()
            .map(|o| serde_json::to_value(o).unwrap_or_default());

        let control = sqlx::query_as::<_, TemplateControl>(
            r#"
            INSERT INTO template_controls
                (template_id, kind, key, label, default_value, options,
                 min_value, max_value, required, display_order)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(template_id)
        .bind(new.kind.as_str())
        .bind(&new.key)
        .bind(&new.label)
        .bind(&new.default_value)
        .bind(options)
        .bind(new.min_value)
        .bind(new.max_value)
        .bind(new.required)
        .bind(new.display_order)
        .fetch_one(self.pool())
        .await?;

        Ok(control)
    }

    pub async fn delete_template_control(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM template_controls WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // Customizations

    pub async fn get_user_customizations(&self, user_id: Uuid) -> Result<Vec<TemplateCustomization>> {
        let customizations = sqlx::query_as::<_, TemplateCustomization>(
            "SELECT * FROM template_customizations WHERE user_id = $1 ORDER BY updated_at DESC",
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;

        Ok(customizations)
    }

    pub async fn get_template_customizations(
        &self,
        user_id: Uuid,
        template_id: Uuid,
    ) -> Result<Vec<TemplateCustomization>> {
        let customizations = sqlx::query_as::<_, TemplateCustomization>(
            r#"
            SELECT * FROM template_customizations
            WHERE user_id = $1 AND template_id = $2
            ORDER BY updated_at DESC
            "#,
        )
        .bind(user_id)
        .bind(template_id)
        .fetch_all(self.pool())
        .await?;

        Ok(customizations)
    }

    pub async fn get_customization(&self, id: Uuid) -> Result<Option<TemplateCustomization>> {
        let customization = sqlx::query_as::<_, TemplateCustomization>(
            "SELECT * FROM template_customizations WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(customization)
    }

    pub async fn create_customization(
        &self,
        user_id: Uuid,
        new: &NewTemplateCustomization,
    ) -> Result<TemplateCustomization> {
        let customization = sqlx::query_as::<_, TemplateCustomization>(
            r#"
            INSERT INTO template_customizations (user_id, template_id, name, "values")
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(new.template_id)
        .bind(&new.name)
        .bind(serde_json::Value::Object(new.values.clone()))
        .fetch_one(self.pool())
        .await?;

        Ok(customization)
    }

    pub async fn update_customization(
        &self,
        id: Uuid,
        name: Option<&str>,
        values: Option<&serde_json::Map<String, serde_json::Value>>,
    ) -> Result<TemplateCustomization> {
        let customization = sqlx::query_as::<_, TemplateCustomization>(
            r#"
            UPDATE template_customizations
            SET name = COALESCE($2, name),
                "values" = COALESCE($3, "values"),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(values.map(|v| serde_json::Value::Object(v.clone())))
        .fetch_one(self.pool())
        .await?;

        Ok(customization)
    }

    pub async fn delete_customization(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM template_customizations WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // Purchases

    pub async fn has_user_purchased_template(
        &self,
        user_id: Uuid,
        template_id: Uuid,
    ) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM template_purchases WHERE user_id = $1 AND template_id = $2",
        )
        .bind(user_id)
        .bind(template_id)
        .fetch_one(self.pool())
        .await?;

        Ok(count > 0)
    }

    /// Records one purchase with the price split captured at purchase time.
    pub async fn create_template_purchase(
        &self,
        user_id: Uuid,
        template: &Template,
        payment_reference: Option<&str>,
    ) -> Result<TemplatePurchase> {
        let (platform_fee, creator_earnings) = split_purchase_price(template.price_cents);

        let purchase = sqlx::query_as::<_, TemplatePurchase>(
            r#"
            INSERT INTO template_purchases
                (user_id, template_id, purchase_price_cents,
                 creator_earnings_cents, platform_fee_cents, payment_reference)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(template.id)
        .bind(template.price_cents)
        .bind(creator_earnings)
        .bind(platform_fee)
        .bind(payment_reference)
        .fetch_one(self.pool())
        .await?;

        self.increment_template_sales(template.id).await?;

        Ok(purchase)
    }

    pub async fn get_user_purchases(&self, user_id: Uuid) -> Result<Vec<TemplatePurchase>> {
        let purchases = sqlx::query_as::<_, TemplatePurchase>(
            "SELECT * FROM template_purchases WHERE user_id = $1 ORDER BY purchased_at DESC",
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;

        Ok(purchases)
    }
}
