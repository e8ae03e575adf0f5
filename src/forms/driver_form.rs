// src/forms/driver_form.rs
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::{
    errors::{TaxiResult, ValidationError},
    forms::{FormErrors, MAX_TEXT_LENGTH, REQUIRED_MESSAGE},
};

pub const LICENSE_NUMBER_LENGTH: usize = 8;
const USERNAME_MAX_LENGTH: usize = 150;

static LICENSE_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z]{3}[0-9]{5}$").expect("valid license regex"));
static USERNAME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[\w.@+-]+$").expect("valid username regex"));
static EMAIL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// Checks a license number: 3 uppercase ASCII letters then 5 ASCII digits.
pub fn validate_license_number(value: &str) -> Result<(), Vec<ValidationError>> {
    if LICENSE_NUMBER.is_match(value) {
        return Ok(());
    }

    let chars: Vec<char> = value.chars().collect();
    if chars.len() != LICENSE_NUMBER_LENGTH {
        return Err(vec![ValidationError::new(
            "license_number",
            format!("License number should consist of {} characters", LICENSE_NUMBER_LENGTH),
        )]);
    }

    let mut errors = Vec::new();
    if !chars[..3].iter().all(|c| c.is_ascii_uppercase()) {
        errors.push(ValidationError::new("license_number", "First 3 characters should be uppercase letters"));
    }
    if !chars[3..].iter().all(|c| c.is_ascii_digit()) {
        errors.push(ValidationError::new("license_number", "Last 5 characters should be digits"));
    }
    Err(errors)
}

fn check_license(errors: &mut FormErrors, value: &str) {
    if value.is_empty() {
        errors.add("license_number", REQUIRED_MESSAGE);
    } else if let Err(found) = validate_license_number(value) {
        for error in found {
            errors.add(&error.field, error.message);
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverLicenseUpdateForm {
    #[serde(default)]
    pub license_number: String,
}

impl DriverLicenseUpdateForm {
    pub fn clean(&self) -> TaxiResult<String> {
        let mut errors = FormErrors::new();
        check_license(&mut errors, &self.license_number);
        errors.finish(self.license_number.clone())
    }

    pub fn is_valid(&self) -> bool {
        self.clean().is_ok()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverCreationForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub license_number: String,
}

/// Cleaned registration data; the password is still in plain text.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDriver {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub license_number: String,
}

impl DriverCreationForm {
    pub fn clean(&self) -> TaxiResult<NewDriver> {
        let mut errors = FormErrors::new();

        let username = errors.required_text("username", &self.username, USERNAME_MAX_LENGTH);
        if !username.is_empty() && !USERNAME.is_match(&username) {
            errors.add(
                "username",
                "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
            );
        }

        if self.password.is_empty() {
            errors.add("password", REQUIRED_MESSAGE);
        }

        let first_name = self.first_name.trim().to_string();
        errors.max_length("first_name", &first_name, USERNAME_MAX_LENGTH);
        let last_name = self.last_name.trim().to_string();
        errors.max_length("last_name", &last_name, USERNAME_MAX_LENGTH);

        let email = self.email.trim().to_string();
        if !email.is_empty() && !EMAIL.is_match(&email) {
            errors.add("email", "Enter a valid email address.");
        }
        errors.max_length("email", &email, MAX_TEXT_LENGTH);

        check_license(&mut errors, &self.license_number);

        errors.finish(NewDriver {
            username,
            password: self.password.clone(),
            first_name,
            last_name,
            email,
            license_number: self.license_number.clone(),
        })
    }

    pub fn is_valid(&self) -> bool {
        self.clean().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TaxiError;

    fn license_form(value: &str) -> DriverLicenseUpdateForm {
        DriverLicenseUpdateForm {
            license_number: value.to_string(),
        }
    }

    fn creation_form() -> DriverCreationForm {
        DriverCreationForm {
            username: "driver".to_string(),
            password: "secret".to_string(),
            first_name: "Ama".to_string(),
            last_name: "Owusu".to_string(),
            email: "ama@example.com".to_string(),
            license_number: "ABC12345".to_string(),
        }
    }

    #[test]
    fn test_driver_license_update_form() {
        assert!(license_form("ABC12345").is_valid());
        assert!(!license_form("ABC1234").is_valid());
        assert!(!license_form("ABb12345").is_valid());
        assert!(!license_form("ABCa2345").is_valid());
    }

    #[test]
    fn test_license_edge_cases() {
        assert!(!license_form("").is_valid());
        assert!(!license_form("ABC123456").is_valid());
        assert!(!license_form("12345ABC").is_valid());
        assert!(!license_form(" ABC1234").is_valid());
        assert!(!license_form("ÀBC12345").is_valid());
        assert!(!license_form("ABC1234٣").is_valid());
    }

    #[test]
    fn test_license_messages() {
        let short = validate_license_number("ABC1234").unwrap_err();
        assert_eq!(short.len(), 1);
        assert_eq!(short[0].message, "License number should consist of 8 characters");

        let lowercase = validate_license_number("ABb12345").unwrap_err();
        assert_eq!(lowercase[0].message, "First 3 characters should be uppercase letters");

        let letter_in_digits = validate_license_number("ABCa2345").unwrap_err();
        assert_eq!(letter_in_digits[0].message, "Last 5 characters should be digits");

        assert_eq!(validate_license_number("abc1234x").unwrap_err().len(), 2);
    }

    #[test]
    fn test_valid_creation_form() {
        let cleaned = creation_form().clean().unwrap();
        assert_eq!(cleaned.username, "driver");
        assert_eq!(cleaned.license_number, "ABC12345");
    }

    #[test]
    fn test_creation_form_validates_license_and_username() {
        let mut form = creation_form();
        form.username = "bad name".to_string();
        form.license_number = "abc12345".to_string();

        match form.clean() {
            Err(TaxiError::ValidationFailed(errors)) => {
                assert!(errors.iter().any(|e| e.field == "username"));
                assert!(errors.iter().any(|e| e.field == "license_number"));
            }
            other => panic!("Expected ValidationFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_creation_form_requires_password_and_valid_email() {
        let mut form = creation_form();
        form.password.clear();
        assert!(!form.is_valid());

        let mut form = creation_form();
        form.email = "not-an-email".to_string();
        assert!(!form.is_valid());

        let mut form = creation_form();
        form.email.clear();
        assert!(form.is_valid());
    }
}
