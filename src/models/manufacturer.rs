// src/models/manufacturer.rs
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Manufacturer {
    pub id: String,
    pub name: String,    // Unique across manufacturers
    pub country: String,
}

impl Manufacturer {
    /// Builds an unsaved manufacturer; the id is assigned on creation.
    pub fn new(name: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            country: country.into(),
        }
    }
}

impl fmt::Display for Manufacturer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.country)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let manufacturer = Manufacturer::new("manufacturer", "country");
        assert_eq!(
            manufacturer.to_string(),
            format!("{} {}", manufacturer.name, manufacturer.country)
        );
    }
}
