use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::user::{ActivationState, Role, User, UserRow};
use crate::utils::crypto::{hash_password, verify_password};
use crate::utils::validation::require_text;

/// Key for the transaction-scoped advisory lock that serialises registrations
/// while the admin count is checked.
const BOOTSTRAP_LOCK_KEY: i64 = 0x5445_5354_4144_4D4E;

const USER_COLUMNS: &str = "id, name, email, password_hash, role, activation, created_at";

/// Role and activation for a new registrant given how many admins exist.
pub fn bootstrap_role(existing_admins: i64) -> (Role, ActivationState) {
    if existing_admins == 0 {
        (Role::Admin, ActivationState::Active)
    } else {
        (Role::Teacher, ActivationState::Pending)
    }
}

pub fn ensure_can_authenticate(user: &User) -> Result<()> {
    match user.activation {
        ActivationState::Active => Ok(()),
        ActivationState::Pending => Err(Error::Forbidden(
            "Account is awaiting administrator activation".to_string(),
        )),
        ActivationState::Deactivated => Err(Error::Forbidden(
            "Account has been deactivated".to_string(),
        )),
    }
}

pub fn check_activation_change(user: &User, target: ActivationState) -> Result<()> {
    if user.role == Role::Admin {
        return Err(Error::BadRequest(
            "Administrator accounts cannot be activated or deactivated".to_string(),
        ));
    }
    if target == ActivationState::Pending {
        return Err(Error::BadRequest(
            "Accounts cannot be moved back to pending".to_string(),
        ));
    }
    Ok(())
}

/// Trimmed display name; blank names are rejected.
pub fn registration_name(name: &str) -> Result<&str> {
    require_text("name", name)?;
    Ok(name.trim())
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates an account. The first registrant while no admin exists becomes
    /// an active admin; everyone else is a pending teacher. The admin check
    /// and the insert run under one advisory lock, so two concurrent first
    /// registrations cannot both be promoted.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<User> {
        let name = registration_name(name)?;
        let password_hash = hash_password(password)?;
        let email = normalize_email(email);

        let mut tx = self.pool.begin().await?;
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(BOOTSTRAP_LOCK_KEY)
            .execute(&mut *tx)
            .await?;

        let admins: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = $1")
            .bind(Role::Admin.as_str())
            .fetch_one(&mut *tx)
            .await?;
        let (role, activation) = bootstrap_role(admins);

        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (name, email, password_hash, role, activation)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(name)
        .bind(&email)
        .bind(password_hash)
        .bind(role.as_str())
        .bind(activation.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match Error::from(e) {
            Error::Conflict(_) => Error::Conflict("Email is already registered".to_string()),
            other => other,
        })?;

        tx.commit().await?;

        let user = User::try_from(row)?;
        if user.is_admin() {
            tracing::info!(user_id = %user.id, "first registrant promoted to administrator");
        } else {
            tracing::info!(user_id = %user.id, "teacher registered, awaiting activation");
        }
        Ok(user)
    }

    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(normalize_email(email))
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            tracing::warn!("login attempt for unknown email");
            return Err(Error::Unauthorized("invalid_credentials".to_string()));
        };
        if !verify_password(password, &row.password_hash)? {
            tracing::warn!(user_id = %row.id, "login attempt with wrong password");
            return Err(Error::Unauthorized("invalid_credentials".to_string()));
        }

        let user = User::try_from(row)?;
        ensure_can_authenticate(&user)?;
        tracing::info!(user_id = %user.id, role = %user.role, "user logged in");
        Ok(user)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))?;
        User::try_from(row)
    }

    pub async fn has_admin(&self) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE role = $1)")
                .bind(Role::Admin.as_str())
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    pub async fn list_all(&self) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users ORDER BY created_at",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(User::try_from).collect()
    }

    pub async fn list_by_role(&self, role: Role) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE role = $1 ORDER BY created_at",
            USER_COLUMNS
        ))
        .bind(role.as_str())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(User::try_from).collect()
    }

    pub async fn list_pending_teachers(&self) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE role = $1 AND activation = $2 ORDER BY created_at",
            USER_COLUMNS
        ))
        .bind(Role::Teacher.as_str())
        .bind(ActivationState::Pending.as_str())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(User::try_from).collect()
    }

    pub async fn set_activation(&self, id: Uuid, target: ActivationState) -> Result<User> {
        let user = self.get_by_id(id).await?;
        check_activation_change(&user, target)?;

        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users SET activation = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(id)
        .bind(target.as_str())
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(user_id = %id, from = %user.activation, to = %target, "activation changed");
        User::try_from(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(role: Role, activation: ActivationState) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Ann".into(),
            email: "ann@example.com".into(),
            role,
            activation,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn first_registrant_becomes_active_admin() {
        assert_eq!(bootstrap_role(0), (Role::Admin, ActivationState::Active));
        assert_eq!(bootstrap_role(1), (Role::Teacher, ActivationState::Pending));
        assert_eq!(bootstrap_role(5), (Role::Teacher, ActivationState::Pending));
    }

    #[test]
    fn only_active_accounts_authenticate() {
        assert!(ensure_can_authenticate(&user(Role::Teacher, ActivationState::Active)).is_ok());
        assert!(matches!(
            ensure_can_authenticate(&user(Role::Teacher, ActivationState::Pending)),
            Err(Error::Forbidden(_))
        ));
        assert!(matches!(
            ensure_can_authenticate(&user(Role::Teacher, ActivationState::Deactivated)),
            Err(Error::Forbidden(_))
        ));
    }

    #[test]
    fn activation_changes_apply_to_teachers_only() {
        let admin = user(Role::Admin, ActivationState::Active);
        let teacher = user(Role::Teacher, ActivationState::Pending);
        assert!(check_activation_change(&admin, ActivationState::Deactivated).is_err());
        assert!(check_activation_change(&teacher, ActivationState::Active).is_ok());
        assert!(check_activation_change(&teacher, ActivationState::Deactivated).is_ok());
        assert!(check_activation_change(&teacher, ActivationState::Pending).is_err());
    }

    #[test]
    fn blank_registration_names_are_rejected() {
        for name in ["", "    ", "\t\n"] {
            assert!(matches!(registration_name(name), Err(Error::BadRequest(_))));
        }
        assert_eq!(registration_name("  Ann Lee ").unwrap(), "Ann Lee");
    }

    #[test]
    fn emails_are_compared_case_insensitively() {
        assert_eq!(normalize_email("  Ann@Example.COM "), "ann@example.com");
    }
}
