use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// The payload of the signed session cookie.
///
/// The cookie is signed with the server secret, so the payload is trusted as
/// long as the signature verifies and `expires_at` lies in the future.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// The ID of the user this session belongs to.
    pub user_id: i32,
    /// The authenticated identity.
    pub email: String,
    /// The timestamp when the session was created.
    pub created_at: DateTime<Utc>,
    /// The timestamp when the session expires.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user_id: i32, email: String, lifetime: Duration) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            email,
            created_at: now,
            expires_at: now + lifetime,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_session_is_not_expired() {
        let session = Session::new(1, "a@x.com".to_string(), Duration::days(7));
        assert!(!session.is_expired());
        assert_eq!(session.expires_at - session.created_at, Duration::days(7));
    }

    #[test]
    fn session_in_the_past_is_expired() {
        let session = Session::new(1, "a@x.com".to_string(), Duration::seconds(-1));
        assert!(session.is_expired());
    }

    #[test]
    fn payload_survives_serialization() {
        let session = Session::new(7, "a@x.com".to_string(), Duration::days(1));
        let json = sonic_rs::to_string(&session).unwrap();
        let back: Session = sonic_rs::from_str(&json).unwrap();
        assert_eq!(back, session);
    }
}
