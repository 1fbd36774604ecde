//! Session model
//!
//! Database-backed auth tokens. A session is created on login, resolved by
//! the auth middleware on every request, and deleted on logout.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// An authentication session bound to a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Opaque session token (uuid v4)
    pub id: String,
    /// Owning user
    pub user_id: i64,
    /// Expiration timestamp
    pub expires_at: DateTime<Utc>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Create a new session for `user_id` expiring after `ttl`.
    pub fn new(user_id: i64, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id,
            expires_at: now + ttl,
            created_at: now,
        }
    }

    /// Check whether the session has expired.
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_not_expired() {
        let session = Session::new(1, Duration::days(7));
        assert_eq!(session.user_id, 1);
        assert!(!session.is_expired());
        assert!(!session.id.is_empty());
    }

    #[test]
    fn test_session_expiry() {
        let mut session = Session::new(1, Duration::days(7));
        session.expires_at = Utc::now() - Duration::seconds(1);
        assert!(session.is_expired());
    }

    #[test]
    fn test_session_tokens_are_unique() {
        let a = Session::new(1, Duration::days(7));
        let b = Session::new(1, Duration::days(7));
        assert_ne!(a.id, b.id);
    }
}
