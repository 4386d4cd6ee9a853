use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use validator::Validate;

use crate::{
    config::get_config,
    dto::auth_dto::{BootstrapStatus, LoginPayload, LoginResponse, RegisterPayload},
    error::Result,
    middleware::auth::Session,
    models::user::User,
    utils::token::issue_token,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterPayload,
    responses(
        (status = 201, description = "Account created; the first account becomes administrator", body = User),
        (status = 400, description = "Invalid payload"),
        (status = 409, description = "Email is already registered")
    )
)]
#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user = state
        .user_service
        .register(&payload.name, &payload.email, &payload.password)
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Token issued", body = LoginResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "Account pending or deactivated")
    )
)]
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user = state
        .user_service
        .authenticate(&payload.email, &payload.password)
        .await?;

    let config = get_config();
    let token = issue_token(&user, &config.jwt_secret, config.jwt_ttl_hours)?;
    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in_seconds: config.jwt_ttl_hours * 3600,
        user,
    }))
}

#[utoipa::path(
    get,
    path = "/api/auth/bootstrap",
    responses((status = 200, description = "Whether an administrator exists yet", body = BootstrapStatus))
)]
#[axum::debug_handler]
pub async fn bootstrap_status(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let has_admin = state.user_service.has_admin().await?;
    Ok(Json(BootstrapStatus { has_admin }))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "The signed-in user", body = User),
        (status = 401, description = "Missing or invalid token")
    )
)]
#[axum::debug_handler]
pub async fn me(Extension(session): Extension<Session>) -> Json<User> {
    Json(session.user)
}
