use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::catalog_dto::{CreateQuestionPayload, UpdateQuestionPayload};
use crate::error::{Error, Result};
use crate::models::question::Question;
use crate::services::test_service::TestService;
use crate::utils::validation::{require_text, validate_question_shape};

const QUESTION_COLUMNS: &str = "id, test_id, text, options, correct_option_index, created_at";

/// Applies a partial update on top of the stored question.
pub fn merge_question(existing: &Question, patch: UpdateQuestionPayload) -> Question {
    Question {
        text: patch.text.unwrap_or_else(|| existing.text.clone()),
        options: patch.options.unwrap_or_else(|| existing.options.clone()),
        correct_option_index: patch
            .correct_option_index
            .unwrap_or(existing.correct_option_index),
        ..existing.clone()
    }
}

fn trimmed_options(options: &[String]) -> Vec<String> {
    options.iter().map(|o| o.trim().to_string()).collect()
}

#[derive(Clone)]
pub struct QuestionService {
    pool: PgPool,
    tests: TestService,
}

impl QuestionService {
    pub fn new(pool: PgPool, tests: TestService) -> Self {
        Self { pool, tests }
    }

    pub async fn list_for_test(&self, test_id: Uuid) -> Result<Vec<Question>> {
        let questions = sqlx::query_as::<_, Question>(&format!(
            "SELECT {} FROM questions WHERE test_id = $1 ORDER BY created_at, id",
            QUESTION_COLUMNS
        ))
        .bind(test_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(questions)
    }

    pub async fn get(&self, id: Uuid) -> Result<Question> {
        sqlx::query_as::<_, Question>(&format!(
            "SELECT {} FROM questions WHERE id = $1",
            QUESTION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Question not found".to_string()))
    }

    pub async fn create(&self, test_id: Uuid, payload: CreateQuestionPayload) -> Result<Question> {
        self.tests.get(test_id).await?;
        require_text("text", &payload.text)?;
        let options = trimmed_options(&payload.options);
        validate_question_shape(&options, payload.correct_option_index)?;

        let question = sqlx::query_as::<_, Question>(&format!(
            r#"
            INSERT INTO questions (test_id, text, options, correct_option_index)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            QUESTION_COLUMNS
        ))
        .bind(test_id)
        .bind(payload.text.trim())
        .bind(&options)
        .bind(payload.correct_option_index)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(question_id = %question.id, test_id = %test_id, "question created");
        Ok(question)
    }

    pub async fn update(&self, id: Uuid, payload: UpdateQuestionPayload) -> Result<Question> {
        let existing = self.get(id).await?;
        let mut merged = merge_question(&existing, payload);
        merged.options = trimmed_options(&merged.options);
        require_text("text", &merged.text)?;
        validate_question_shape(&merged.options, merged.correct_option_index)?;

        let question = sqlx::query_as::<_, Question>(&format!(
            r#"
            UPDATE questions
            SET text = $2, options = $3, correct_option_index = $4
            WHERE id = $1
            RETURNING {}
            "#,
            QUESTION_COLUMNS
        ))
        .bind(id)
        .bind(&merged.text)
        .bind(&merged.options)
        .bind(merged.correct_option_index)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(question_id = %id, "question updated");
        Ok(question)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM questions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Question not found".to_string()));
        }
        tracing::info!(question_id = %id, "question deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn stored() -> Question {
        Question {
            id: Uuid::new_v4(),
            test_id: Uuid::new_v4(),
            text: "Capital of France?".into(),
            options: vec!["Paris".into(), "Rome".into(), "Oslo".into()],
            correct_option_index: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn merge_keeps_fields_missing_from_patch() {
        let existing = stored();
        let merged = merge_question(
            &existing,
            UpdateQuestionPayload {
                text: None,
                options: None,
                correct_option_index: Some(2),
            },
        );
        assert_eq!(merged.id, existing.id);
        assert_eq!(merged.text, existing.text);
        assert_eq!(merged.options, existing.options);
        assert_eq!(merged.correct_option_index, 2);
    }

    #[test]
    fn shrinking_options_can_strand_the_answer_key() {
        let existing = stored();
        let merged = merge_question(
            &existing,
            UpdateQuestionPayload {
                text: None,
                options: Some(vec!["Yes".into(), "No".into()]),
                correct_option_index: None,
            },
        );
        assert!(validate_question_shape(&merged.options, merged.correct_option_index).is_ok());

        let mut pointing_past_end = existing.clone();
        pointing_past_end.correct_option_index = 2;
        let merged = merge_question(
            &pointing_past_end,
            UpdateQuestionPayload {
                text: None,
                options: Some(vec!["Yes".into(), "No".into()]),
                correct_option_index: None,
            },
        );
        assert!(validate_question_shape(&merged.options, merged.correct_option_index).is_err());
    }

    #[test]
    fn options_are_trimmed() {
        assert_eq!(
            trimmed_options(&[" a ".to_string(), "b".to_string()]),
            vec!["a".to_string(), "b".to_string()]
        );
    }
}
