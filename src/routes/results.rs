use axum::{
    extract::State,
    response::{IntoResponse, Json},
    Extension,
};

use crate::{
    error::Result,
    middleware::auth::Session,
    models::test_result::TestResult,
    services::statistics_service::{StatisticsService, UserResultsSummary},
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/results/me",
    responses((status = 200, description = "The caller's attempts, newest first", body = UserResultsSummary))
)]
#[axum::debug_handler]
pub async fn my_results(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<impl IntoResponse> {
    let (results, tests, categories) = tokio::try_join!(
        state.result_service.list_for_user(session.user_id()),
        state.test_service.list(None),
        state.category_service.list(),
    )?;
    let summary = StatisticsService::summarize_user_results(&results, &tests, &categories);
    Ok(Json(summary))
}

#[utoipa::path(
    get,
    path = "/api/admin/results",
    responses((status = 200, description = "Every stored result, newest first", body = [TestResult]))
)]
#[axum::debug_handler]
pub async fn list_all_results(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let results = state.result_service.list_all().await?;
    Ok(Json(results))
}
