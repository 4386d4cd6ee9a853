use std::collections::HashSet;

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::question::{Answer, Question};
use crate::models::test_result::TestResult;
use crate::services::question_service::QuestionService;
use crate::services::scoring_service::{ScoringService, TestAttemptResult};
use crate::services::test_service::TestService;

const RESULT_COLUMNS: &str = "id, user_id, test_id, score, completed_at";

/// Questions of the test with no answer pointing at them.
pub fn unanswered_count(questions: &[Question], answers: &[Answer]) -> usize {
    let answered: HashSet<Uuid> = answers.iter().map(|a| a.question_id).collect();
    questions
        .iter()
        .filter(|q| !answered.contains(&q.id))
        .count()
}

pub fn ensure_submittable(questions: &[Question], answers: &[Answer]) -> Result<()> {
    if questions.is_empty() {
        return Err(Error::BadRequest("Test has no questions".to_string()));
    }
    let missing = unanswered_count(questions, answers);
    if missing > 0 {
        return Err(Error::BadRequest(format!(
            "{} question(s) left unanswered",
            missing
        )));
    }
    Ok(())
}

#[derive(Clone)]
pub struct ResultService {
    pool: PgPool,
    tests: TestService,
    questions: QuestionService,
}

impl ResultService {
    pub fn new(pool: PgPool, tests: TestService, questions: QuestionService) -> Self {
        Self {
            pool,
            tests,
            questions,
        }
    }

    /// Scores a completed attempt and stores the result for `user_id`.
    pub async fn submit(
        &self,
        user_id: Uuid,
        test_id: Uuid,
        answers: &[Answer],
    ) -> Result<(TestResult, TestAttemptResult)> {
        self.tests.get(test_id).await?;
        let questions = self.questions.list_for_test(test_id).await?;
        ensure_submittable(&questions, answers)?;

        let evaluation = ScoringService::evaluate(&questions, answers);

        let stored = sqlx::query_as::<_, TestResult>(&format!(
            r#"
            INSERT INTO test_results (user_id, test_id, score, completed_at)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            RESULT_COLUMNS
        ))
        .bind(user_id)
        .bind(test_id)
        .bind(evaluation.score)
        .bind(evaluation.completed_at)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(
            result_id = %stored.id,
            user_id = %user_id,
            test_id = %test_id,
            score = evaluation.score,
            correct = evaluation.correct_answers,
            total = evaluation.total_questions,
            "test submitted"
        );
        Ok((stored, evaluation))
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<TestResult>> {
        let results = sqlx::query_as::<_, TestResult>(&format!(
            "SELECT {} FROM test_results WHERE user_id = $1 ORDER BY completed_at DESC",
            RESULT_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(results)
    }

    pub async fn list_all(&self) -> Result<Vec<TestResult>> {
        let results = sqlx::query_as::<_, TestResult>(&format!(
            "SELECT {} FROM test_results ORDER BY completed_at DESC",
            RESULT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(results)
    }
}
