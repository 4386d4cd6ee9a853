use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::services::statistics_service::{
    OverallStatistics, Statistics, TestStatistics, UserStatistics,
};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OverallStatisticsResponse {
    pub total_teachers: usize,
    pub total_categories: usize,
    pub total_tests: usize,
    pub total_attempts: usize,
    pub average_score: f64,
}

impl From<OverallStatistics> for OverallStatisticsResponse {
    fn from(o: OverallStatistics) -> Self {
        Self {
            total_teachers: o.total_teachers,
            total_categories: o.total_categories,
            total_tests: o.total_tests,
            total_attempts: o.total_attempts,
            average_score: o.average_score,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TestStatisticsResponse {
    pub test_id: Uuid,
    pub test_name: String,
    pub category_name: String,
    pub total_attempts: usize,
    /// `null` until the test has been attempted.
    pub average_score: Option<f64>,
    pub pass_count: usize,
    /// Whole-percent pass rate; `null` until the test has been attempted.
    pub pass_rate_percent: Option<f64>,
}

impl From<TestStatistics> for TestStatisticsResponse {
    fn from(t: TestStatistics) -> Self {
        let average_score = t.display_average();
        let pass_rate_percent = t.pass_rate().map(|rate| (rate * 100.0).round());
        Self {
            test_id: t.test_id,
            test_name: t.test_name,
            category_name: t.category_name,
            total_attempts: t.total_attempts,
            average_score,
            pass_count: t.pass_count,
            pass_rate_percent,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserStatisticsResponse {
    pub user_id: Uuid,
    pub user_name: String,
    pub email: String,
    pub tests_completed: usize,
    pub average_score: f64,
}

impl From<UserStatistics> for UserStatisticsResponse {
    fn from(u: UserStatistics) -> Self {
        Self {
            average_score: u.display_average(),
            user_id: u.user_id,
            user_name: u.user_name,
            email: u.email,
            tests_completed: u.tests_completed,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StatisticsResponse {
    pub overall: OverallStatisticsResponse,
    pub per_test: Vec<TestStatisticsResponse>,
    pub per_user: Vec<UserStatisticsResponse>,
}

impl From<Statistics> for StatisticsResponse {
    fn from(s: Statistics) -> Self {
        Self {
            overall: s.overall.into(),
            per_test: s.per_test.into_iter().map(Into::into).collect(),
            per_user: s.per_user.into_iter().map(Into::into).collect(),
        }
    }
}
