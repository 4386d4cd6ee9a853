use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Teacher,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Teacher => "teacher",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "teacher" => Ok(Role::Teacher),
            other => Err(Error::Internal(format!("Unknown role '{}'", other))),
        }
    }
}

/// Lifecycle of an account. Only `Active` accounts may authenticate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ActivationState {
    Pending,
    Active,
    Deactivated,
}

impl ActivationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivationState::Pending => "pending",
            ActivationState::Active => "active",
            ActivationState::Deactivated => "deactivated",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, ActivationState::Active)
    }
}

impl fmt::Display for ActivationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivationState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ActivationState::Pending),
            "active" => Ok(ActivationState::Active),
            "deactivated" => Ok(ActivationState::Deactivated),
            other => Err(Error::Internal(format!(
                "Unknown activation state '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub activation: ActivationState,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Row shape of the `users` table; carries the password hash, which never
/// leaves the service layer.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub activation: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = Error;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            role: row.role.parse()?,
            activation: row.activation.parse()?,
            created_at: row.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(role: &str, activation: &str) -> UserRow {
        UserRow {
            id: Uuid::new_v4(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password_hash: "hash".into(),
            role: role.into(),
            activation: activation.into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn row_converts_into_typed_user() {
        let user = User::try_from(row("teacher", "pending")).unwrap();
        assert_eq!(user.role, Role::Teacher);
        assert_eq!(user.activation, ActivationState::Pending);
        assert!(!user.is_admin());
        assert!(!user.activation.is_active());
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!(User::try_from(row("hr", "active")).is_err());
        assert!(User::try_from(row("admin", "banned")).is_err());
    }

    #[test]
    fn wire_names_match_storage_names() {
        for role in [Role::Admin, Role::Teacher] {
            let json = serde_json::to_value(role).unwrap();
            assert_eq!(json, serde_json::json!(role.as_str()));
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        for state in [
            ActivationState::Pending,
            ActivationState::Active,
            ActivationState::Deactivated,
        ] {
            let json = serde_json::to_value(state).unwrap();
            assert_eq!(json, serde_json::json!(state.as_str()));
            assert_eq!(state.as_str().parse::<ActivationState>().unwrap(), state);
        }
    }

    #[test]
    fn serialized_user_has_no_password_field() {
        let user = User::try_from(row("admin", "active")).unwrap();
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "admin");
    }
}
