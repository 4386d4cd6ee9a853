use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::Result;
use crate::models::category::Category;
use crate::models::test::Test;
use crate::models::test_result::TestResult;
use crate::models::user::{Role, User};
use crate::services::category_service::CategoryService;
use crate::services::result_service::ResultService;
use crate::services::scoring_service::is_passed;
use crate::services::test_service::TestService;
use crate::services::user_service::UserService;
use crate::utils::format::{format_score, round_one_decimal};

pub const UNKNOWN_CATEGORY: &str = "unknown category";
pub const UNKNOWN_TEST: &str = "unknown test";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallStatistics {
    pub total_teachers: usize,
    pub total_categories: usize,
    pub total_tests: usize,
    pub total_attempts: usize,
    /// Mean of every result score, rounded to one decimal; 0 with no results.
    pub average_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestStatistics {
    pub test_id: Uuid,
    pub test_name: String,
    pub category_name: String,
    pub total_attempts: usize,
    pub average_score: f64,
    pub pass_count: usize,
}

impl TestStatistics {
    fn record(&mut self, score: f64) {
        self.total_attempts += 1;
        self.average_score = running_mean(self.average_score, self.total_attempts, score);
        if is_passed(score) {
            self.pass_count += 1;
        }
    }

    /// Fraction of passing attempts; `None` before the first attempt.
    pub fn pass_rate(&self) -> Option<f64> {
        (self.total_attempts > 0).then(|| self.pass_count as f64 / self.total_attempts as f64)
    }

    pub fn display_average(&self) -> Option<f64> {
        (self.total_attempts > 0).then(|| round_one_decimal(self.average_score))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserStatistics {
    pub user_id: Uuid,
    pub user_name: String,
    pub email: String,
    pub tests_completed: usize,
    pub average_score: f64,
}

impl UserStatistics {
    fn record(&mut self, score: f64) {
        self.tests_completed += 1;
        self.average_score = running_mean(self.average_score, self.tests_completed, score);
    }

    pub fn display_average(&self) -> f64 {
        round_one_decimal(self.average_score)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub overall: OverallStatistics,
    pub per_test: Vec<TestStatistics>,
    pub per_user: Vec<UserStatistics>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResultRow {
    pub result_id: Uuid,
    pub test_id: Uuid,
    pub test_name: String,
    pub category_name: String,
    pub score: f64,
    #[schema(value_type = String)]
    pub score_display: Decimal,
    pub passed: bool,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResultsSummary {
    pub total_attempts: usize,
    pub passed_attempts: usize,
    pub average_score: f64,
    pub results: Vec<UserResultRow>,
}

/// `mean` is the average of the first `n - 1` samples.
fn running_mean(mean: f64, n: usize, sample: f64) -> f64 {
    let n = n as f64;
    (mean * (n - 1.0) + sample) / n
}

#[derive(Clone)]
pub struct StatisticsService {
    users: UserService,
    categories: CategoryService,
    tests: TestService,
    results: ResultService,
}

impl StatisticsService {
    pub fn new(
        users: UserService,
        categories: CategoryService,
        tests: TestService,
        results: ResultService,
    ) -> Self {
        Self {
            users,
            categories,
            tests,
            results,
        }
    }

    /// Reads a fresh snapshot of teachers, categories, tests and results and
    /// aggregates it. Nothing is cached between calls.
    pub async fn compute(&self) -> Result<Statistics> {
        let (teachers, categories, tests, results) = tokio::try_join!(
            self.users.list_by_role(Role::Teacher),
            self.categories.list(),
            self.tests.list(None),
            self.results.list_all(),
        )?;

        tracing::info!(
            teachers = teachers.len(),
            categories = categories.len(),
            tests = tests.len(),
            results = results.len(),
            "computing statistics"
        );

        Ok(Self::aggregate(&teachers, &categories, &tests, &results))
    }

    /// Folds results into overall, per-test and per-user rollups.
    ///
    /// `users` is taken as the population to report on. Results pointing at
    /// a test or user outside the supplied sets still count towards the
    /// overall figures but are left out of the per-entity rollups.
    pub fn aggregate(
        users: &[User],
        categories: &[Category],
        tests: &[Test],
        results: &[TestResult],
    ) -> Statistics {
        let average_score = if results.is_empty() {
            0.0
        } else {
            let total: f64 = results.iter().map(|r| r.score).sum();
            round_one_decimal(total / results.len() as f64)
        };

        let overall = OverallStatistics {
            total_teachers: users.len(),
            total_categories: categories.len(),
            total_tests: tests.len(),
            total_attempts: results.len(),
            average_score,
        };

        let category_names: HashMap<Uuid, &str> = categories
            .iter()
            .map(|c| (c.id, c.name.as_str()))
            .collect();

        let mut per_test: Vec<TestStatistics> = Vec::with_capacity(tests.len());
        let mut test_slots: HashMap<Uuid, usize> = HashMap::with_capacity(tests.len());
        for test in tests {
            if test_slots.contains_key(&test.id) {
                continue;
            }
            let category_name = test
                .category_id
                .and_then(|id| category_names.get(&id).copied())
                .unwrap_or(UNKNOWN_CATEGORY);
            test_slots.insert(test.id, per_test.len());
            per_test.push(TestStatistics {
                test_id: test.id,
                test_name: test.name.clone(),
                category_name: category_name.to_string(),
                total_attempts: 0,
                average_score: 0.0,
                pass_count: 0,
            });
        }

        let mut per_user: Vec<UserStatistics> = Vec::with_capacity(users.len());
        let mut user_slots: HashMap<Uuid, usize> = HashMap::with_capacity(users.len());
        for user in users {
            if user_slots.contains_key(&user.id) {
                continue;
            }
            user_slots.insert(user.id, per_user.len());
            per_user.push(UserStatistics {
                user_id: user.id,
                user_name: user.name.clone(),
                email: user.email.clone(),
                tests_completed: 0,
                average_score: 0.0,
            });
        }

        for result in results {
            if let Some(&slot) = test_slots.get(&result.test_id) {
                per_test[slot].record(result.score);
            }
            if let Some(&slot) = user_slots.get(&result.user_id) {
                per_user[slot].record(result.score);
            }
        }

        per_user.retain(|u| u.tests_completed > 0);
        // Vec::sort_by is stable, so equal averages keep their input order.
        per_user.sort_by(|a, b| b.average_score.total_cmp(&a.average_score));

        Statistics {
            overall,
            per_test,
            per_user,
        }
    }

    /// One learner's history joined to test and category names, newest first.
    pub fn summarize_user_results(
        results: &[TestResult],
        tests: &[Test],
        categories: &[Category],
    ) -> UserResultsSummary {
        let tests_by_id: HashMap<Uuid, &Test> = tests.iter().map(|t| (t.id, t)).collect();
        let category_names: HashMap<Uuid, &str> = categories
            .iter()
            .map(|c| (c.id, c.name.as_str()))
            .collect();

        let mut rows: Vec<UserResultRow> = results
            .iter()
            .map(|result| {
                let test = tests_by_id.get(&result.test_id);
                let test_name = test.map(|t| t.name.as_str()).unwrap_or(UNKNOWN_TEST);
                let category_name = test
                    .and_then(|t| t.category_id)
                    .and_then(|id| category_names.get(&id).copied())
                    .unwrap_or(UNKNOWN_CATEGORY);
                UserResultRow {
                    result_id: result.id,
                    test_id: result.test_id,
                    test_name: test_name.to_string(),
                    category_name: category_name.to_string(),
                    score: result.score,
                    score_display: format_score(Some(result.score)),
                    passed: is_passed(result.score),
                    completed_at: result.completed_at,
                }
            })
            .collect();
        rows.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));

        let average_score = if rows.is_empty() {
            0.0
        } else {
            round_one_decimal(rows.iter().map(|r| r.score).sum::<f64>() / rows.len() as f64)
        };

        UserResultsSummary {
            total_attempts: rows.len(),
            passed_attempts: rows.iter().filter(|r| r.passed).count(),
            average_score,
            results: rows,
        }
    }
}
