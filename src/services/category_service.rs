use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::catalog_dto::{CreateCategoryPayload, UpdateCategoryPayload};
use crate::error::{Error, Result};
use crate::models::category::Category;
use crate::utils::validation::require_text;

#[derive(Clone)]
pub struct CategoryService {
    pool: PgPool,
}

impl CategoryService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, description, created_by, created_at FROM categories ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    pub async fn get(&self, id: Uuid) -> Result<Category> {
        sqlx::query_as::<_, Category>(
            "SELECT id, name, description, created_by, created_at FROM categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Category not found".to_string()))
    }

    pub async fn exists(&self, id: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM categories WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    pub async fn create(&self, payload: CreateCategoryPayload, created_by: Uuid) -> Result<Category> {
        require_text("name", &payload.name)?;

        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, description, created_by)
            VALUES ($1, $2, $3)
            RETURNING id, name, description, created_by, created_at
            "#,
        )
        .bind(payload.name.trim())
        .bind(payload.description.trim())
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(category_id = %category.id, "category created");
        Ok(category)
    }

    pub async fn update(&self, id: Uuid, payload: UpdateCategoryPayload) -> Result<Category> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET name = COALESCE($2, name),
                description = COALESCE($3, description)
            WHERE id = $1
            RETURNING id, name, description, created_by, created_at
            "#,
        )
        .bind(id)
        .bind(payload.name)
        .bind(payload.description.map(|d| d.trim().to_string()))
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Category not found".to_string()))?;

        tracing::info!(category_id = %id, "category updated");
        Ok(category)
    }

    /// Tests in the category are kept; their `category_id` becomes NULL.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Category not found".to_string()));
        }
        tracing::info!(category_id = %id, "category deleted");
        Ok(())
    }
}
