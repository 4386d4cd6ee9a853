use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::config::get_config;
use crate::error::{Error, Result};
use crate::models::user::User;
use crate::services::user_service::ensure_can_authenticate;
use crate::utils::token::decode_token;
use crate::AppState;

/// The authenticated caller, freshly loaded from the database for this request.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
}

impl Session {
    pub fn user_id(&self) -> Uuid {
        self.user.id
    }

    pub fn is_admin(&self) -> bool {
        self.user.is_admin()
    }
}

pub fn bearer_token(headers: &HeaderMap) -> Result<&str> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| Error::Unauthorized("missing_authorization".to_string()))?;
    let value = value
        .to_str()
        .map_err(|_| Error::Unauthorized("bad_authorization".to_string()))?;
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| Error::Unauthorized("unsupported_scheme".to_string()))
}

async fn resolve_session(state: &AppState, token: &str) -> Result<Session> {
    let claims = decode_token(token, &get_config().jwt_secret)?;
    let user = match state.user_service.get_by_id(claims.sub).await {
        Ok(user) => user,
        Err(Error::NotFound(_)) => return Err(Error::Unauthorized("invalid_token".to_string())),
        Err(e) => return Err(e),
    };
    // Activation may have changed since the token was issued.
    ensure_can_authenticate(&user)?;
    Ok(Session { user })
}

pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let token = match bearer_token(req.headers()) {
        Ok(token) => token.to_owned(),
        Err(e) => return e.into_response(),
    };
    match resolve_session(&state, &token).await {
        Ok(session) => {
            req.extensions_mut().insert(session);
            next.run(req).await
        }
        Err(e) => {
            tracing::debug!(error = %e, "session rejected");
            e.into_response()
        }
    }
}

/// Must run inside `require_session`.
pub async fn require_admin(req: Request, next: Next) -> Response {
    let Some(session) = req.extensions().get::<Session>() else {
        return Error::Unauthorized("missing_authorization".to_string()).into_response();
    };
    if !session.is_admin() {
        tracing::warn!(user_id = %session.user_id(), "non-admin hit admin route");
        return Error::Forbidden("forbidden".to_string()).into_response();
    }
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(auth: Option<&str>) -> HeaderMap {
        let mut map = HeaderMap::new();
        if let Some(value) = auth {
            map.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(bearer_token(&headers(Some("Bearer abc.def"))).unwrap(), "abc.def");
    }

    #[test]
    fn rejects_missing_or_foreign_schemes() {
        for auth in [None, Some("Basic dXNlcjpwYXNz"), Some("Bearer   ")] {
            assert!(matches!(
                bearer_token(&headers(auth)),
                Err(Error::Unauthorized(_))
            ));
        }
    }
}
