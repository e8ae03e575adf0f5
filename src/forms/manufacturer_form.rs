// src/forms/manufacturer_form.rs
use serde::{Deserialize, Serialize};

use crate::{
    errors::TaxiResult,
    forms::{FormErrors, MAX_TEXT_LENGTH},
    models::Manufacturer,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManufacturerForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub country: String,
}

impl ManufacturerForm {
    /// Returns an unsaved manufacturer; name uniqueness is left to the store.
    pub fn clean(&self) -> TaxiResult<Manufacturer> {
        let mut errors = FormErrors::new();
        let name = errors.required_text("name", &self.name, MAX_TEXT_LENGTH);
        let country = errors.required_text("country", &self.country, MAX_TEXT_LENGTH);
        errors.finish(Manufacturer::new(name, country))
    }

    pub fn is_valid(&self) -> bool {
        self.clean().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, country: &str) -> ManufacturerForm {
        ManufacturerForm {
            name: name.to_string(),
            country: country.to_string(),
        }
    }

    #[test]
    fn test_valid_manufacturer_form() {
        let manufacturer = form(" Toyota ", "Japan").clean().unwrap();
        assert_eq!(manufacturer.name, "Toyota");
        assert_eq!(manufacturer.country, "Japan");
        assert!(manufacturer.id.is_empty());
    }

    #[test]
    fn test_blank_fields_are_invalid() {
        assert!(!form("", "Japan").is_valid());
        assert!(!form("Toyota", " ").is_valid());
    }
}
