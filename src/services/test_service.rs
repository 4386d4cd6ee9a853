use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::catalog_dto::{CreateTestPayload, UpdateTestPayload};
use crate::error::{Error, Result};
use crate::models::test::Test;
use crate::services::category_service::CategoryService;
use crate::utils::validation::require_text;

const TEST_COLUMNS: &str = "id, name, description, category_id, created_by, created_at";

#[derive(Clone)]
pub struct TestService {
    pool: PgPool,
    categories: CategoryService,
}

impl TestService {
    pub fn new(pool: PgPool, categories: CategoryService) -> Self {
        Self { pool, categories }
    }

    /// All tests, or only those of one category when `category_id` is set.
    pub async fn list(&self, category_id: Option<Uuid>) -> Result<Vec<Test>> {
        let tests = sqlx::query_as::<_, Test>(&format!(
            r#"
            SELECT {}
            FROM tests
            WHERE ($1::uuid IS NULL OR category_id = $1)
            ORDER BY created_at
            "#,
            TEST_COLUMNS
        ))
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tests)
    }

    pub async fn get(&self, id: Uuid) -> Result<Test> {
        sqlx::query_as::<_, Test>(&format!("SELECT {} FROM tests WHERE id = $1", TEST_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Test not found".to_string()))
    }

    pub async fn create(&self, payload: CreateTestPayload, created_by: Uuid) -> Result<Test> {
        require_text("name", &payload.name)?;
        self.ensure_category(payload.category_id).await?;

        let test = sqlx::query_as::<_, Test>(&format!(
            r#"
            INSERT INTO tests (name, description, category_id, created_by)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            TEST_COLUMNS
        ))
        .bind(payload.name.trim())
        .bind(payload.description.trim())
        .bind(payload.category_id)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(test_id = %test.id, category_id = %payload.category_id, "test created");
        Ok(test)
    }

    pub async fn update(&self, id: Uuid, payload: UpdateTestPayload) -> Result<Test> {
        if let Some(category_id) = payload.category_id {
            self.ensure_category(category_id).await?;
        }

        let test = sqlx::query_as::<_, Test>(&format!(
            r#"
            UPDATE tests
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                category_id = COALESCE($4, category_id)
            WHERE id = $1
            RETURNING {}
            "#,
            TEST_COLUMNS
        ))
        .bind(id)
        .bind(payload.name)
        .bind(payload.description.map(|d| d.trim().to_string()))
        .bind(payload.category_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Test not found".to_string()))?;

        tracing::info!(test_id = %id, "test updated");
        Ok(test)
    }

    /// Removes the test and its questions. Stored results are left alone.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM tests WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Test not found".to_string()));
        }
        tracing::info!(test_id = %id, "test deleted");
        Ok(())
    }

    async fn ensure_category(&self, category_id: Uuid) -> Result<()> {
        if !self.categories.exists(category_id).await? {
            return Err(Error::BadRequest(format!(
                "Category {} does not exist",
                category_id
            )));
        }
        Ok(())
    }
}
