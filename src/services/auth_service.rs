// src/services/auth_service.rs
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing;

use crate::{
    errors::TaxiError as AppError,
    models::{Driver, DriverLogin, DriverResponse, Session},
    services::store::FleetStore,
    utils::password,
};

#[async_trait]
pub trait AuthOperations: Send + Sync {
    async fn login(&self, login: DriverLogin) -> Result<(DriverResponse, Session), AppError>;
    async fn start_session(&self, driver: &Driver) -> Result<Session, AppError>;
    async fn authenticate(&self, token: &str) -> Result<Option<(Session, Driver)>, AppError>;
    async fn record_visit(&self, session: &mut Session) -> Result<u64, AppError>;
    async fn logout(&self, token: &str) -> Result<(), AppError>;
}

pub struct AuthService {
    store: Arc<dyn FleetStore>,
    session_ttl_seconds: u64,
}

impl AuthService {
    pub fn new(store: Arc<dyn FleetStore>, session_ttl_seconds: u64) -> Self {
        Self {
            store,
            session_ttl_seconds,
        }
    }
}

#[async_trait]
impl AuthOperations for AuthService {
    async fn login(&self, login: DriverLogin) -> Result<(DriverResponse, Session), AppError> {
        tracing::info!("Login attempt for {}", login.username);

        let mut driver = self
            .store
            .get_driver_by_username(&login.username)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !password::verify_password(&login.password, &driver.password_hash) {
            tracing::warn!("Invalid password for {}", login.username);
            return Err(AppError::InvalidCredentials);
        }
        if !driver.is_active {
            return Err(AppError::InactiveAccount);
        }

        driver.last_login = Some(Utc::now());
        self.store.update_driver(&driver).await?;

        let session = self.start_session(&driver).await?;
        tracing::info!("Driver logged in: {}", driver.id);
        Ok((driver.into(), session))
    }

    async fn start_session(&self, driver: &Driver) -> Result<Session, AppError> {
        let session = Session::start(&driver.id, self.session_ttl_seconds);
        self.store.save_session(&session).await?;
        Ok(session)
    }

    async fn authenticate(&self, token: &str) -> Result<Option<(Session, Driver)>, AppError> {
        let Some(session) = self.store.get_session(token).await? else {
            return Ok(None);
        };
        if session.is_expired() {
            tracing::debug!("Session expired for driver {}", session.driver_id);
            self.store.delete_session(token).await?;
            return Ok(None);
        }

        match self.store.get_driver(&session.driver_id).await? {
            Some(driver) if driver.is_active => Ok(Some((session, driver))),
            _ => {
                self.store.delete_session(token).await?;
                Ok(None)
            }
        }
    }

    async fn record_visit(&self, session: &mut Session) -> Result<u64, AppError> {
        match self.store.record_visit(&session.token).await? {
            Some(visits) => session.num_visits = visits,
            // Logged out mid-request
            None => session.num_visits += 1,
        }
        Ok(session.num_visits)
    }

    async fn logout(&self, token: &str) -> Result<(), AppError> {
        self.store.delete_session(token).await?;
        tracing::info!("Session closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{
        driver_service::{DriverOperations, DriverService},
        memory_store::MemoryStore,
    };

    async fn setup(ttl: u64) -> (Arc<MemoryStore>, AuthService) {
        let store = Arc::new(MemoryStore::new());
        DriverService::new(store.clone()).ensure_superuser("admin", "admin").await.unwrap();
        (store.clone(), AuthService::new(store, ttl))
    }

    fn credentials(password: &str) -> DriverLogin {
        DriverLogin {
            username: "admin".to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_and_authenticate() {
        let (_, auth) = setup(60).await;

        let (driver, session) = auth.login(credentials("admin")).await.unwrap();
        assert!(driver.last_login.is_some());

        let (resolved, resolved_driver) = auth.authenticate(&session.token).await.unwrap().unwrap();
        assert_eq!(resolved.token, session.token);
        assert_eq!(resolved_driver.id, driver.id);
    }

    #[tokio::test]
    async fn test_wrong_password() {
        let (_, auth) = setup(60).await;
        assert!(matches!(auth.login(credentials("nope")).await, Err(AppError::InvalidCredentials)));

        let unknown = DriverLogin {
            username: "ghost".to_string(),
            password: "admin".to_string(),
        };
        assert!(matches!(auth.login(unknown).await, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_inactive_account_cannot_login() {
        let (store, auth) = setup(60).await;
        let mut admin = store.get_driver_by_username("admin").await.unwrap().unwrap();
        admin.is_active = false;
        store.update_driver(&admin).await.unwrap();

        assert!(matches!(auth.login(credentials("admin")).await, Err(AppError::InactiveAccount)));
    }

    #[tokio::test]
    async fn test_expired_session_is_anonymous() {
        let (_, auth) = setup(0).await;
        let (_, session) = auth.login(credentials("admin")).await.unwrap();

        assert!(auth.authenticate(&session.token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_visits_and_logout() {
        let (_, auth) = setup(60).await;
        let (_, mut session) = auth.login(credentials("admin")).await.unwrap();

        assert_eq!(auth.record_visit(&mut session).await.unwrap(), 1);
        assert_eq!(auth.record_visit(&mut session).await.unwrap(), 2);
        let (stored, _) = auth.authenticate(&session.token).await.unwrap().unwrap();
        assert_eq!(stored.num_visits, 2);

        auth.logout(&session.token).await.unwrap();
        assert!(auth.authenticate(&session.token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_visits_from_stale_copies_are_not_lost() {
        let (_, auth) = setup(60).await;
        let (_, session) = auth.login(credentials("admin")).await.unwrap();
        let mut first = session.clone();
        let mut second = session.clone();

        auth.record_visit(&mut first).await.unwrap();
        assert_eq!(auth.record_visit(&mut second).await.unwrap(), 2);
    }
}
