pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::services::{
    category_service::CategoryService, question_service::QuestionService,
    result_service::ResultService, statistics_service::StatisticsService,
    test_service::TestService, user_service::UserService,
};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub user_service: UserService,
    pub category_service: CategoryService,
    pub test_service: TestService,
    pub question_service: QuestionService,
    pub result_service: ResultService,
    pub statistics_service: StatisticsService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let user_service = UserService::new(pool.clone());
        let category_service = CategoryService::new(pool.clone());
        let test_service = TestService::new(pool.clone(), category_service.clone());
        let question_service = QuestionService::new(pool.clone(), test_service.clone());
        let result_service =
            ResultService::new(pool.clone(), test_service.clone(), question_service.clone());
        let statistics_service = StatisticsService::new(
            user_service.clone(),
            category_service.clone(),
            test_service.clone(),
            result_service.clone(),
        );

        Self {
            pool,
            user_service,
            category_service,
            test_service,
            question_service,
            result_service,
            statistics_service,
        }
    }
}
