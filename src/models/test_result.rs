use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// One scored attempt. Written once after evaluation, never updated.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TestResult {
    pub id: Uuid,
    pub user_id: Uuid,
    pub test_id: Uuid,
    pub score: f64,
    pub completed_at: DateTime<Utc>,
}
