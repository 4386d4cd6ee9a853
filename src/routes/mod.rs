pub mod auth;
pub mod categories;
pub mod health;
pub mod results;
pub mod statistics;
pub mod users;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, patch, post},
    Json, Router,
};
use utoipa::OpenApi;

use crate::config::Config;
use crate::middleware::auth::{require_admin, require_session};
use crate::middleware::rate_limit::{rps_middleware, RateLimiter};
use crate::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        auth::register,
        auth::login,
        auth::bootstrap_status,
        auth::me,
        categories::list_categories,
        categories::get_category,
        categories::create_category,
        categories::update_category,
        categories::delete_category,
        tests::list_tests,
        tests::get_test,
        tests::create_test,
        tests::update_test,
        tests::delete_test,
        tests::list_questions,
        tests::create_question,
        tests::update_question,
        tests::delete_question,
        tests::submit_test,
        results::my_results,
        results::list_all_results,
        users::list_users,
        users::list_pending,
        users::list_teachers,
        users::activate_user,
        users::deactivate_user,
        statistics::get_statistics,
    ),
    components(schemas(
        crate::models::user::User,
        crate::models::user::Role,
        crate::models::user::ActivationState,
        crate::models::category::Category,
        crate::models::test::Test,
        crate::models::question::Question,
        crate::models::question::Answer,
        crate::models::test_result::TestResult,
        crate::dto::auth_dto::RegisterPayload,
        crate::dto::auth_dto::LoginPayload,
        crate::dto::auth_dto::LoginResponse,
        crate::dto::auth_dto::BootstrapStatus,
        crate::dto::catalog_dto::CreateCategoryPayload,
        crate::dto::catalog_dto::UpdateCategoryPayload,
        crate::dto::catalog_dto::CreateTestPayload,
        crate::dto::catalog_dto::UpdateTestPayload,
        crate::dto::catalog_dto::CreateQuestionPayload,
        crate::dto::catalog_dto::UpdateQuestionPayload,
        crate::dto::catalog_dto::QuestionView,
        crate::dto::result_dto::SubmitTestRequest,
        crate::dto::result_dto::SubmitTestResponse,
        crate::dto::statistics_dto::StatisticsResponse,
        crate::dto::statistics_dto::OverallStatisticsResponse,
        crate::dto::statistics_dto::TestStatisticsResponse,
        crate::dto::statistics_dto::UserStatisticsResponse,
        crate::services::statistics_service::UserResultsSummary,
        crate::services::statistics_service::UserResultRow,
    )),
    tags((name = "competency", description = "Competency testing API"))
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Assembles every route group with its guards and rate limits. Tracing and
/// CORS layers are added by the binary.
pub fn build_router(state: AppState, config: &Config) -> Router {
    let public_api = Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/bootstrap", get(auth::bootstrap_status))
        .layer(from_fn_with_state(
            RateLimiter::per_second(config.public_rps),
            rps_middleware,
        ));

    let session_api = Router::new()
        .route("/api/auth/me", get(auth::me))
        .route("/api/categories", get(categories::list_categories))
        .route("/api/categories/:id", get(categories::get_category))
        .route("/api/tests", get(tests::list_tests))
        .route("/api/tests/:id", get(tests::get_test))
        .route("/api/tests/:id/questions", get(tests::list_questions))
        .route("/api/tests/:id/submit", post(tests::submit_test))
        .route("/api/results/me", get(results::my_results))
        .route_layer(from_fn_with_state(state.clone(), require_session));

    // Layers run bottom-up: the session is resolved before the admin check.
    let admin_api = Router::new()
        .route("/api/admin/categories", post(categories::create_category))
        .route(
            "/api/admin/categories/:id",
            patch(categories::update_category).delete(categories::delete_category),
        )
        .route("/api/admin/tests", post(tests::create_test))
        .route(
            "/api/admin/tests/:id",
            patch(tests::update_test).delete(tests::delete_test),
        )
        .route("/api/admin/tests/:id/questions", post(tests::create_question))
        .route(
            "/api/admin/questions/:id",
            patch(tests::update_question).delete(tests::delete_question),
        )
        .route("/api/admin/users", get(users::list_users))
        .route("/api/admin/users/pending", get(users::list_pending))
        .route("/api/admin/users/teachers", get(users::list_teachers))
        .route("/api/admin/users/:id/activate", post(users::activate_user))
        .route("/api/admin/users/:id/deactivate", post(users::deactivate_user))
        .route("/api/admin/results", get(results::list_all_results))
        .route("/api/admin/statistics", get(statistics::get_statistics))
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(state.clone(), require_session));

    let api = session_api.merge(admin_api).layer(from_fn_with_state(
        RateLimiter::per_second(config.api_rps),
        rps_middleware,
    ));

    Router::new()
        .route("/health", get(health::health))
        .route("/api/openapi.json", get(openapi_json))
        .merge(public_api)
        .merge(api)
        .with_state(state)
}
