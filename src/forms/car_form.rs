// src/forms/car_form.rs
use serde::{Deserialize, Serialize};

use crate::{
    errors::TaxiResult,
    forms::{FormErrors, MAX_TEXT_LENGTH, REQUIRED_MESSAGE},
    models::Car,
    services::store::FleetStore,
};

const INVALID_CHOICE: &str = "Select a valid choice. That choice is not one of the available choices.";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarForm {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub manufacturer: String, // Manufacturer id
    #[serde(default)]
    pub drivers: Vec<String>, // Driver ids
}

impl CarForm {
    /// Returns an unsaved car once every referenced id resolves.
    pub async fn clean(&self, store: &dyn FleetStore) -> TaxiResult<Car> {
        let mut errors = FormErrors::new();
        let model = errors.required_text("model", &self.model, MAX_TEXT_LENGTH);

        let manufacturer_id = self.manufacturer.trim();
        if manufacturer_id.is_empty() {
            errors.add("manufacturer", REQUIRED_MESSAGE);
        } else if store.get_manufacturer(manufacturer_id).await?.is_none() {
            errors.add("manufacturer", INVALID_CHOICE);
        }

        let mut car = Car::new(model, manufacturer_id);
        for driver_id in &self.drivers {
            if store.get_driver(driver_id).await?.is_none() {
                errors.add(
                    "drivers",
                    format!("Select a valid choice. {} is not one of the available choices.", driver_id),
                );
            } else {
                car.driver_ids.insert(driver_id.clone());
            }
        }

        errors.finish(car)
    }

    pub async fn is_valid(&self, store: &dyn FleetStore) -> bool {
        self.clean(store).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        errors::TaxiError,
        models::{Driver, Manufacturer},
        services::memory_store::MemoryStore,
        utils::id_generator::{IdType, WithGeneratedId},
    };

    async fn fixture() -> (MemoryStore, Manufacturer, Driver) {
        let store = MemoryStore::new();
        let manufacturer = Manufacturer::new("manufacturer", "country").with_generated_id(IdType::Manufacturer);
        store.insert_manufacturer(&manufacturer).await.unwrap();
        let mut driver = Driver::new("admin", "admin").with_generated_id(IdType::Driver);
        driver.is_superuser = true;
        store.insert_driver(&driver).await.unwrap();
        (store, manufacturer, driver)
    }

    #[tokio::test]
    async fn test_car_form_is_valid() {
        let (store, manufacturer, driver) = fixture().await;
        let form = CarForm {
            model: "test".to_string(),
            manufacturer: manufacturer.id.clone(),
            drivers: vec![driver.id.clone()],
        };

        assert!(form.is_valid(&store).await);
        let car = form.clean(&store).await.unwrap();
        assert_eq!(car.model, "test");
        assert_eq!(car.manufacturer_id, manufacturer.id);
        assert!(car.has_driver(&driver.id));
    }

    #[tokio::test]
    async fn test_empty_driver_set_is_valid() {
        let (store, manufacturer, _) = fixture().await;
        let form = CarForm {
            model: "test".to_string(),
            manufacturer: manufacturer.id,
            drivers: Vec::new(),
        };
        assert!(form.is_valid(&store).await);
    }

    #[tokio::test]
    async fn test_duplicate_drivers_collapse() {
        let (store, manufacturer, driver) = fixture().await;
        let form = CarForm {
            model: "test".to_string(),
            manufacturer: manufacturer.id,
            drivers: vec![driver.id.clone(), driver.id.clone()],
        };
        assert_eq!(form.clean(&store).await.unwrap().driver_ids.len(), 1);
    }

    #[tokio::test]
    async fn test_reports_every_invalid_field() {
        let (store, _, _) = fixture().await;
        let form = CarForm {
            model: " ".to_string(),
            manufacturer: "mfr-231207-zzzzz".to_string(),
            drivers: vec!["drv-231207-zzzzz".to_string()],
        };

        match form.clean(&store).await {
            Err(TaxiError::ValidationFailed(errors)) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["model", "manufacturer", "drivers"]);
            }
            other => panic!("Expected ValidationFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_manufacturer_is_required() {
        let (store, _, _) = fixture().await;
        let form = CarForm {
            model: "test".to_string(),
            manufacturer: String::new(),
            drivers: Vec::new(),
        };
        assert!(!form.is_valid(&store).await);
    }
}
