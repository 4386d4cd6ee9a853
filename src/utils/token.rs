use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::models::user::{Role, User};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: Role,
    pub iat: usize,
    pub exp: usize,
}

pub fn issue_token(user: &User, secret: &str, ttl_hours: i64) -> Result<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user.id,
        role: user.role,
        iat: now.timestamp() as usize,
        exp: (now + Duration::hours(ttl_hours)).timestamp() as usize,
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}

pub fn decode_token(token: &str, secret: &str) -> Result<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::ActivationState;

    fn admin() -> User {
        User {
            id: Uuid::new_v4(),
            name: "Root".into(),
            email: "root@example.com".into(),
            role: Role::Admin,
            activation: ActivationState::Active,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn issued_token_decodes_with_same_secret() {
        let user = admin();
        let token = issue_token(&user, "secret", 2).unwrap();
        let claims = decode_token(&token, "secret").unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.role, Role::Admin);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = issue_token(&admin(), "secret", 2).unwrap();
        assert!(decode_token(&token, "other").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = issue_token(&admin(), "secret", -2).unwrap();
        assert!(decode_token(&token, "secret").is_err());
    }
}
