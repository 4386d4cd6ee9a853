use axum::{
    extract::State,
    response::{IntoResponse, Json},
};

use crate::{dto::statistics_dto::StatisticsResponse, error::Result, AppState};

#[utoipa::path(
    get,
    path = "/api/admin/statistics",
    responses((status = 200, description = "Overall, per-test and per-teacher rollups", body = StatisticsResponse))
)]
#[axum::debug_handler]
pub async fn get_statistics(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let statistics = state.statistics_service.compute().await?;
    Ok(Json(StatisticsResponse::from(statistics)))
}
