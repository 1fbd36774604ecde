//! User service
//!
//! Implements account logic: registration with username restrictions,
//! argon2 password hashing, and database-backed session tokens used by the
//! auth middleware.

use crate::db::repositories::{SessionRepository, UserRepository};
use crate::models::{Session, User, UserRole};
use anyhow::{Context, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Duration;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

use super::ServiceError;

/// Session lifetime granted on login (7 days)
const SESSION_TTL_DAYS: i64 = 7;

/// Characters allowed in a username, mirroring the catalog's historic rule.
static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.@+-]+$").expect("username regex is valid"));

/// Reserved username that would shadow the `/users/me/` endpoint.
const RESERVED_USERNAME: &str = "me";

const MAX_USERNAME_LEN: usize = 150;
const MAX_EMAIL_LEN: usize = 254;

/// Hash a password using Argon2id with a random salt.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))
        .context("Password hashing failed")?;

    Ok(password_hash.to_string())
}

/// Verify a password against a stored PHC hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| anyhow::anyhow!("Invalid password hash format: {}", e))
        .context("Failed to parse password hash")?;

    let argon2 = Argon2::default();

    match argon2.verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(anyhow::anyhow!("Password verification failed: {}", e))
            .context("Password verification error"),
    }
}

/// Input for user registration
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

/// Input for login
#[derive(Debug, Clone)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// User service for account management and session auth.
pub struct UserService {
    repo: Arc<dyn UserRepository>,
    session_repo: Arc<dyn SessionRepository>,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>, session_repo: Arc<dyn SessionRepository>) -> Self {
        Self { repo, session_repo }
    }

    /// Register a new user.
    ///
    /// # Errors
    /// - `Validation` for an empty, overlong, ill-formed or reserved
    ///   username, a bad email, or an empty password
    /// - `Conflict` when the username or email is already taken
    pub async fn register(&self, input: RegisterInput) -> Result<User, ServiceError> {
        validate_username(&input.username)?;
        validate_email(&input.email)?;

        if input.password.is_empty() {
            return Err(ServiceError::Validation("Password cannot be empty".into()));
        }

        if self
            .repo
            .get_by_username(&input.username)
            .await
            .context("Failed to check username")?
            .is_some()
        {
            return Err(ServiceError::Conflict(format!(
                "Username '{}' is already taken",
                input.username
            )));
        }

        if self
            .repo
            .get_by_email(&input.email)
            .await
            .context("Failed to check email")?
            .is_some()
        {
            return Err(ServiceError::Conflict(format!(
                "Email '{}' is already registered",
                input.email
            )));
        }

        let password_hash = hash_password(&input.password)?;
        let user = User::new(
            input.username,
            input.email,
            input.first_name,
            input.last_name,
            password_hash,
            UserRole::User,
        );

        let created = self.repo.create(&user).await.context("Failed to create user")?;
        tracing::info!(user_id = created.id, username = %created.username, "user registered");
        Ok(created)
    }

    /// Log in with email and password, creating a session token.
    ///
    /// # Errors
    /// - `Permission` when the email is unknown or the password is wrong
    pub async fn login(&self, input: LoginInput) -> Result<Session, ServiceError> {
        let user = self
            .repo
            .get_by_email(&input.email)
            .await
            .context("Failed to look up user")?
            .ok_or_else(|| ServiceError::Permission("Invalid credentials".into()))?;

        let valid = verify_password(&input.password, &user.password_hash)?;
        if !valid {
            return Err(ServiceError::Permission("Invalid credentials".into()));
        }

        let session = Session::new(user.id, Duration::days(SESSION_TTL_DAYS));
        self.session_repo
            .create(&session)
            .await
            .context("Failed to create session")?;

        tracing::debug!(user_id = user.id, "session created");
        Ok(session)
    }

    /// Delete the session behind a token.
    ///
    /// # Errors
    /// - `NotFound` when the token does not reference a session
    pub async fn logout(&self, token: &str) -> Result<(), ServiceError> {
        let deleted = self
            .session_repo
            .delete(token)
            .await
            .context("Failed to delete session")?;

        if !deleted {
            return Err(ServiceError::NotFound("Session not found".into()));
        }
        Ok(())
    }

    /// Resolve a session token to its user.
    ///
    /// Expired sessions are deleted on sight and resolve to `None`.
    pub async fn validate_session(&self, token: &str) -> Result<Option<User>, ServiceError> {
        let session = match self
            .session_repo
            .get(token)
            .await
            .context("Failed to look up session")?
        {
            Some(session) => session,
            None => return Ok(None),
        };

        if session.is_expired() {
            let _ = self.session_repo.delete(token).await;
            return Ok(None);
        }

        let user = self
            .repo
            .get_by_id(session.user_id)
            .await
            .context("Failed to load session user")?;
        Ok(user)
    }

    /// Get user by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>, ServiceError> {
        Ok(self.repo.get_by_id(id).await.context("Failed to get user")?)
    }

    /// List users, paginated.
    pub async fn list(
        &self,
        params: &crate::models::ListParams,
    ) -> Result<crate::models::PagedResult<User>, ServiceError> {
        let users = self
            .repo
            .list(params.offset(), params.limit())
            .await
            .context("Failed to list users")?;
        let total = self.repo.count().await.context("Failed to count users")?;
        Ok(crate::models::PagedResult::new(users, total, params))
    }
}

/// Validate a username against length, character-set and reservation rules.
fn validate_username(username: &str) -> Result<(), ServiceError> {
    if username.trim().is_empty() {
        return Err(ServiceError::Validation("Username cannot be empty".into()));
    }
    if username.len() > MAX_USERNAME_LEN {
        return Err(ServiceError::Validation(format!(
            "Username cannot exceed {} characters",
            MAX_USERNAME_LEN
        )));
    }
    if username.eq_ignore_ascii_case(RESERVED_USERNAME) {
        return Err(ServiceError::Validation(
            "Username 'me' is reserved".into(),
        ));
    }
    if !USERNAME_RE.is_match(username) {
        return Err(ServiceError::Validation(
            "Username may only contain letters, digits and .@+-_".into(),
        ));
    }
    Ok(())
}

/// Minimal email shape check; uniqueness is checked against storage.
fn validate_email(email: &str) -> Result<(), ServiceError> {
    if email.trim().is_empty() || email.len() > MAX_EMAIL_LEN {
        return Err(ServiceError::Validation("Invalid email address".into()));
    }
    let Some((local, domain)) = email.split_once('@') else {
        return Err(ServiceError::Validation("Invalid email address".into()));
    };
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err(ServiceError::Validation("Invalid email address".into()));
    }
    Ok(())
}
