use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::question::Answer;
use crate::models::test_result::TestResult;
use crate::services::scoring_service::TestAttemptResult;
use crate::utils::format::format_score;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SubmitTestRequest {
    pub answers: Vec<Answer>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubmitTestResponse {
    pub result_id: Uuid,
    pub test_id: Uuid,
    pub score: f64,
    #[schema(value_type = String)]
    pub score_display: Decimal,
    pub total_questions: usize,
    pub correct_answers: usize,
    pub passed: bool,
    pub completed_at: DateTime<Utc>,
}

impl SubmitTestResponse {
    pub fn new(stored: &TestResult, evaluation: &TestAttemptResult) -> Self {
        Self {
            result_id: stored.id,
            test_id: stored.test_id,
            score: evaluation.score,
            score_display: format_score(Some(evaluation.score)),
            total_questions: evaluation.total_questions,
            correct_answers: evaluation.correct_answers,
            passed: evaluation.passed(),
            completed_at: evaluation.completed_at,
        }
    }
}
