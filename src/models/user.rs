//! User model
//!
//! This module defines the User entity and related types for the Forkful
//! recipe backend. A user is both a reader and a potential recipe author;
//! administrators may edit or delete any recipe.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// User entity representing a registered account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Username (unique, restricted character set)
    pub username: String,
    /// Email address (unique, used for login)
    pub email: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Password hash (argon2)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// User role
    pub role: UserRole,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new User with the given parameters.
    ///
    /// The password must already be hashed before calling this function.
    pub fn new(
        username: String,
        email: String,
        first_name: String,
        last_name: String,
        password_hash: String,
        role: UserRole,
    ) -> Self {
        Self {
            id: 0, // Will be set by the database
            username,
            email,
            first_name,
            last_name,
            password_hash,
            role,
            created_at: Utc::now(),
        }
    }

    /// Check if the user is an administrator
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Check if the user may mutate a recipe owned by `author_id`.
    ///
    /// Admins may mutate any recipe; regular users only their own.
    pub fn can_edit(&self, author_id: i64) -> bool {
        self.is_admin() || self.id == author_id
    }
}

/// User role for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Administrator - may mutate any recipe
    Admin,
    /// Regular user - may only mutate own recipes
    User,
}

impl Default for UserRole {
    fn default() -> Self {
        Self::User
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Admin => write!(f, "admin"),
            UserRole::User => write!(f, "user"),
        }
    }
}

impl FromStr for UserRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(UserRole::Admin),
            "user" => Ok(UserRole::User),
            _ => Err(anyhow::anyhow!("Invalid user role: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_user(id: i64, role: UserRole) -> User {
        let mut user = User::new(
            "chef".to_string(),
            "chef@example.com".to_string(),
            "Ada".to_string(),
            "Lovelace".to_string(),
            "hash".to_string(),
            role,
        );
        user.id = id;
        user
    }

    #[test]
    fn test_user_new() {
        let user = make_user(0, UserRole::User);
        assert_eq!(user.username, "chef");
        assert_eq!(user.email, "chef@example.com");
        assert_eq!(user.role, UserRole::User);
    }

    #[test]
    fn test_user_is_admin() {
        assert!(make_user(1, UserRole::Admin).is_admin());
        assert!(!make_user(1, UserRole::User).is_admin());
    }

    #[test]
    fn test_user_can_edit() {
        let admin = make_user(1, UserRole::Admin);
        let user = make_user(2, UserRole::User);

        // Admin may edit anyone's recipes
        assert!(admin.can_edit(1));
        assert!(admin.can_edit(2));
        assert!(admin.can_edit(999));

        // Regular user may only edit own recipes
        assert!(user.can_edit(2));
        assert!(!user.can_edit(1));
        assert!(!user.can_edit(999));
    }

    #[test]
    fn test_user_role_display() {
        assert_eq!(UserRole::Admin.to_string(), "admin");
        assert_eq!(UserRole::User.to_string(), "user");
    }

    #[test]
    fn test_user_role_from_str() {
        assert_eq!(UserRole::from_str("admin").unwrap(), UserRole::Admin);
        assert_eq!(UserRole::from_str("ADMIN").unwrap(), UserRole::Admin);
        assert_eq!(UserRole::from_str("user").unwrap(), UserRole::User);
        assert!(UserRole::from_str("editor").is_err());
    }

    #[test]
    fn test_user_role_default() {
        assert_eq!(UserRole::default(), UserRole::User);
    }
}
