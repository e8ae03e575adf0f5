// src/models/car.rs
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::models::{driver::DriverResponse, manufacturer::Manufacturer};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Car {
    pub id: String,
    pub model: String,
    pub manufacturer_id: String,     // Exactly one manufacturer
    pub driver_ids: BTreeSet<String>, // Many-to-many with drivers
}

impl Car {
    pub fn new(model: impl Into<String>, manufacturer_id: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            model: model.into(),
            manufacturer_id: manufacturer_id.into(),
            driver_ids: BTreeSet::new(),
        }
    }

    pub fn has_driver(&self, driver_id: &str) -> bool {
        self.driver_ids.contains(driver_id)
    }
}

impl fmt::Display for Car {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.model)
    }
}

// Response Models
#[derive(Debug, Serialize, Deserialize)]
pub struct CarResponse {
    pub id: String,
    pub model: String,
    pub manufacturer: Manufacturer,
    pub drivers: Vec<DriverResponse>,
}
