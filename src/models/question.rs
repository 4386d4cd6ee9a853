use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Question {
    pub id: Uuid,
    pub test_id: Uuid,
    pub text: String,
    pub options: Vec<String>,
    pub correct_option_index: i32,
    pub created_at: DateTime<Utc>,
}

/// A learner's pick for one question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Answer {
    pub question_id: Uuid,
    pub selected_option_index: i32,
}
