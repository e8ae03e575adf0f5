// src/models/session.rs
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub driver_id: String,
    pub num_visits: u64,   // Index page views during this session
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn start(driver_id: impl Into<String>, ttl_seconds: u64) -> Self {
        let now = Utc::now();
        let ttl = i64::try_from(ttl_seconds)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX);
        Self {
            token: Uuid::new_v4().simple().to_string(),
            driver_id: driver_id.into(),
            num_visits: 0,
            created_at: now,
            expires_at: now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Seconds left before expiry, zero once expired.
    pub fn remaining_seconds(&self) -> u64 {
        (self.expires_at - Utc::now()).num_seconds().max(0) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_live() {
        let session = Session::start("drv-231207-a1b2c", 60);
        assert_eq!(session.token.len(), 32);
        assert_eq!(session.num_visits, 0);
        assert!(!session.is_expired());
        assert!(session.remaining_seconds() <= 60);
    }

    #[test]
    fn test_zero_ttl_expires_immediately() {
        let session = Session::start("drv-231207-a1b2c", 0);
        assert!(session.is_expired());
        assert_eq!(session.remaining_seconds(), 0);
    }

    #[test]
    fn test_huge_ttl_saturates() {
        for ttl in [100_000_000_000_000_000, u64::MAX] {
            let session = Session::start("drv-231207-a1b2c", ttl);
            assert!(!session.is_expired());
            assert_eq!(session.expires_at, DateTime::<Utc>::MAX_UTC);
        }
    }
}
