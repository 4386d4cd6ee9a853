use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json},
};
use uuid::Uuid;

use crate::{
    error::Result,
    models::user::{ActivationState, Role, User},
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/admin/users",
    responses((status = 200, description = "All accounts", body = [User]))
)]
#[axum::debug_handler]
pub async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let users = state.user_service.list_all().await?;
    Ok(Json(users))
}

#[utoipa::path(
    get,
    path = "/api/admin/users/pending",
    responses((status = 200, description = "Teachers awaiting activation", body = [User]))
)]
#[axum::debug_handler]
pub async fn list_pending(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let users = state.user_service.list_pending_teachers().await?;
    Ok(Json(users))
}

#[utoipa::path(
    get,
    path = "/api/admin/users/teachers",
    responses((status = 200, description = "All teacher accounts", body = [User]))
)]
#[axum::debug_handler]
pub async fn list_teachers(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let users = state.user_service.list_by_role(Role::Teacher).await?;
    Ok(Json(users))
}

#[utoipa::path(
    post,
    path = "/api/admin/users/{id}/activate",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Account activated", body = User),
        (status = 400, description = "Target is an administrator"),
        (status = 404, description = "User not found")
    )
)]
#[axum::debug_handler]
pub async fn activate_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let user = state
        .user_service
        .set_activation(id, ActivationState::Active)
        .await?;
    Ok(Json(user))
}

#[utoipa::path(
    post,
    path = "/api/admin/users/{id}/deactivate",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Account deactivated", body = User),
        (status = 400, description = "Target is an administrator"),
        (status = 404, description = "User not found")
    )
)]
#[axum::debug_handler]
pub async fn deactivate_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let user = state
        .user_service
        .set_activation(id, ActivationState::Deactivated)
        .await?;
    Ok(Json(user))
}
