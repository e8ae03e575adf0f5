// src/forms/mod.rs
//! Form objects: each one cleans raw input into values ready for a store
//! write, or reports every failing field at once.
pub mod car_form;
pub mod driver_form;
pub mod manufacturer_form;

pub use car_form::*;
pub use driver_form::*;
pub use manufacturer_form::*;

use crate::errors::{TaxiError, TaxiResult, ValidationError};

pub const MAX_TEXT_LENGTH: usize = 255;

pub const REQUIRED_MESSAGE: &str = "This field is required.";

/// Per-field errors collected while a form is cleaned.
#[derive(Debug, Default)]
pub struct FormErrors(Vec<ValidationError>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(ValidationError::new(field, message));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Checks a required text field and returns its trimmed value.
    pub fn required_text(&mut self, field: &str, value: &str, max_length: usize) -> String {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.add(field, REQUIRED_MESSAGE);
        } else {
            self.max_length(field, trimmed, max_length);
        }
        trimmed.to_string()
    }

    pub fn max_length(&mut self, field: &str, value: &str, max_length: usize) {
        let length = value.chars().count();
        if length > max_length {
            self.add(
                field,
                format!("Ensure this value has at most {} characters (it has {}).", max_length, length),
            );
        }
    }

    pub fn finish<T>(self, cleaned: T) -> TaxiResult<T> {
        if self.0.is_empty() {
            Ok(cleaned)
        } else {
            Err(TaxiError::ValidationFailed(self.0))
        }
    }
}
