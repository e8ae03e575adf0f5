// src/models/driver.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::car::Car;

/// A user account extended with a driving license number.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Driver {
    pub id: String,
    pub username: String,               // Unique login name
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub license_number: Option<String>, // Unique when present
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl Driver {
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            username: username.into(),
            password_hash: password_hash.into(),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            license_number: None,
            is_staff: false,
            is_superuser: false,
            is_active: true,
            date_joined: Utc::now(),
            last_login: None,
        }
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} {})", self.username, self.first_name, self.last_name)
    }
}

// Request/Response Models
#[derive(Debug, Serialize, Deserialize)]
pub struct DriverLogin {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DriverResponse {
    pub id: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub license_number: Option<String>,
    pub is_superuser: bool,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl From<Driver> for DriverResponse {
    fn from(driver: Driver) -> Self {
        Self {
            id: driver.id,
            username: driver.username,
            first_name: driver.first_name,
            last_name: driver.last_name,
            email: driver.email,
            license_number: driver.license_number,
            is_superuser: driver.is_superuser,
            date_joined: driver.date_joined,
            last_login: driver.last_login,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DriverDetailResponse {
    #[serde(flatten)]
    pub driver: DriverResponse,
    pub cars: Vec<Car>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let mut driver = Driver::new("driver", "hash");
        driver.first_name = "Kwame".to_string();
        driver.last_name = "Mensah".to_string();
        assert_eq!(driver.to_string(), "driver (Kwame Mensah)");
    }

    #[test]
    fn test_display_with_blank_names() {
        let driver = Driver::new("driver", "hash");
        assert_eq!(
            driver.to_string(),
            format!("{} ({} {})", driver.username, driver.first_name, driver.last_name)
        );
    }

    #[test]
    fn test_response_omits_password() {
        let driver = Driver::new("driver", "sha256$salt$digest");
        let json = serde_json::to_value(DriverResponse::from(driver)).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "driver");
    }
}
