// src/state.rs
use std::sync::Arc;

use crate::{
    errors::{TaxiError, TaxiResult},
    services::{
        AuthService, CarService, DashboardService, DriverService, FleetStore, ManufacturerService, MemoryStore,
        RedisStore,
    },
};

pub struct AppState {
    pub manufacturer_service: Arc<ManufacturerService>,
    pub driver_service: Arc<DriverService>,
    pub car_service: Arc<CarService>,
    pub auth_service: Arc<AuthService>,
    pub dashboard_service: Arc<DashboardService>,
    pub store: Arc<dyn FleetStore>,
    pub config: AppConfig,
}

/// Ten years; longer lifetimes are rejected at startup.
pub const MAX_SESSION_TTL_SECONDS: u64 = 60 * 60 * 24 * 365 * 10;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub redis_url: Option<String>,
    pub session_ttl_seconds: u64,
    pub page_size: usize,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            redis_url: None,
            session_ttl_seconds: 60 * 60 * 24 * 14, // two weeks
            page_size: 5,
            admin_username: None,
            admin_password: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> TaxiResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset or blank keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> TaxiResult<Self> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        let config = Self {
            bind_addr: get("TAXI_BIND_ADDR").unwrap_or(defaults.bind_addr),
            redis_url: get("REDIS_URL"),
            session_ttl_seconds: match get("SESSION_TTL_SECONDS") {
                Some(raw) => parse_number("SESSION_TTL_SECONDS", &raw)?,
                None => defaults.session_ttl_seconds,
            },
            page_size: match get("TAXI_PAGE_SIZE") {
                Some(raw) => parse_number("TAXI_PAGE_SIZE", &raw)?,
                None => defaults.page_size,
            },
            admin_username: get("TAXI_ADMIN_USERNAME"),
            admin_password: get("TAXI_ADMIN_PASSWORD"),
        };

        if config.session_ttl_seconds > MAX_SESSION_TTL_SECONDS {
            return Err(TaxiError::InvalidConfiguration(format!(
                "SESSION_TTL_SECONDS must be at most {}",
                MAX_SESSION_TTL_SECONDS
            )));
        }
        if config.page_size == 0 {
            return Err(TaxiError::InvalidConfiguration("TAXI_PAGE_SIZE must be at least 1".to_string()));
        }
        if config.admin_username.is_some() != config.admin_password.is_some() {
            return Err(TaxiError::ConfigurationError(
                "TAXI_ADMIN_USERNAME and TAXI_ADMIN_PASSWORD must be set together".to_string(),
            ));
        }
        Ok(config)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> TaxiResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| TaxiError::InvalidConfiguration(format!("{} must be a non-negative integer, got '{}'", key, raw)))
}

impl AppState {
    pub async fn new(config: AppConfig) -> TaxiResult<Self> {
        let store: Arc<dyn FleetStore> = match &config.redis_url {
            Some(redis_url) => Arc::new(RedisStore::connect(redis_url).await?),
            None => {
                tracing::warn!("REDIS_URL not set, using in-memory store");
                Arc::new(MemoryStore::new())
            }
        };
        Ok(Self::with_store(config, store))
    }

    pub fn with_store(config: AppConfig, store: Arc<dyn FleetStore>) -> Self {
        Self {
            manufacturer_service: Arc::new(ManufacturerService::new(store.clone())),
            driver_service: Arc::new(DriverService::new(store.clone())),
            car_service: Arc::new(CarService::new(store.clone())),
            auth_service: Arc::new(AuthService::new(store.clone(), config.session_ttl_seconds)),
            dashboard_service: Arc::new(DashboardService::new(store.clone())),
            store,
            config,
        }
    }

    /// In-memory state with default settings.
    pub fn in_memory() -> Self {
        Self::with_store(AppConfig::default(), Arc::new(MemoryStore::new()))
    }
}
