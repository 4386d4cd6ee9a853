use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::catalog_dto::{CreateCategoryPayload, UpdateCategoryPayload},
    error::Result,
    middleware::auth::Session,
    models::category::Category,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/categories",
    responses((status = 200, description = "All categories", body = [Category]))
)]
#[axum::debug_handler]
pub async fn list_categories(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let categories = state.category_service.list().await?;
    Ok(Json(categories))
}

#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category found", body = Category),
        (status = 404, description = "Category not found")
    )
)]
#[axum::debug_handler]
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let category = state.category_service.get(id).await?;
    Ok(Json(category))
}

#[utoipa::path(
    post,
    path = "/api/admin/categories",
    request_body = CreateCategoryPayload,
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 400, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn create_category(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(payload): Json<CreateCategoryPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let category = state
        .category_service
        .create(payload, session.user_id())
        .await?;
    Ok((StatusCode::CREATED, Json(category)))
}

#[utoipa::path(
    patch,
    path = "/api/admin/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    request_body = UpdateCategoryPayload,
    responses(
        (status = 200, description = "Category updated", body = Category),
        (status = 404, description = "Category not found")
    )
)]
#[axum::debug_handler]
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCategoryPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let category = state.category_service.update(id, payload).await?;
    Ok(Json(category))
}

#[utoipa::path(
    delete,
    path = "/api/admin/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 204, description = "Category deleted; its tests become uncategorised"),
        (status = 404, description = "Category not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.category_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
