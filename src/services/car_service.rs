// src/services/car_service.rs
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing;

use crate::{
    errors::TaxiError as AppError,
    forms::CarForm,
    models::{Car, CarResponse, DriverResponse},
    services::{manufacturer_service::matches_filter, store::FleetStore},
    utils::id_generator::{IdGenerator, IdType, WithGeneratedId},
};

#[async_trait]
pub trait CarOperations: Send + Sync {
    async fn create_car(&self, form: CarForm) -> Result<CarResponse, AppError>;
    async fn get_car(&self, car_id: &str) -> Result<Option<CarResponse>, AppError>;
    async fn list_cars(&self, model: Option<&str>) -> Result<Vec<CarResponse>, AppError>;
    async fn update_car(&self, car_id: &str, form: CarForm) -> Result<CarResponse, AppError>;
    async fn delete_car(&self, car_id: &str) -> Result<(), AppError>;
    async fn toggle_assign(&self, car_id: &str, driver_id: &str) -> Result<CarResponse, AppError>;
    async fn get_cars_by_manufacturer_name(&self, name: &str) -> Result<Vec<Car>, AppError>;
}

pub struct CarService {
    store: Arc<dyn FleetStore>,
}

impl CarService {
    pub fn new(store: Arc<dyn FleetStore>) -> Self {
        Self { store }
    }

    async fn load_car(&self, car_id: &str) -> Result<Car, AppError> {
        if !IdGenerator::validate_id(car_id, Some(IdType::Car)) {
            return Err(AppError::car_not_found(car_id));
        }
        self.store
            .get_car(car_id)
            .await?
            .ok_or_else(|| AppError::car_not_found(car_id))
    }

    /// Joins cars with their manufacturer and drivers in one pass over each table.
    async fn to_responses(&self, cars: Vec<Car>) -> Result<Vec<CarResponse>, AppError> {
        if cars.is_empty() {
            return Ok(Vec::new());
        }
        let manufacturers: HashMap<String, _> = self
            .store
            .list_manufacturers()
            .await?
            .into_iter()
            .map(|m| (m.id.clone(), m))
            .collect();
        let drivers: HashMap<String, DriverResponse> = self
            .store
            .list_drivers()
            .await?
            .into_iter()
            .map(|d| (d.id.clone(), DriverResponse::from(d)))
            .collect();

        Ok(cars
            .into_iter()
            .filter_map(|car| {
                let Some(manufacturer) = manufacturers.get(&car.manufacturer_id).cloned() else {
                    tracing::warn!("Skipping car {}: manufacturer {} is gone", car.id, car.manufacturer_id);
                    return None;
                };
                let drivers = car.driver_ids.iter().filter_map(|id| drivers.get(id).cloned()).collect();
                Some(CarResponse {
                    id: car.id,
                    model: car.model,
                    manufacturer,
                    drivers,
                })
            })
            .collect())
    }

    async fn to_response(&self, car: Car) -> Result<CarResponse, AppError> {
        let car_id = car.id.clone();
        self.to_responses(vec![car])
            .await?
            .pop()
            .ok_or_else(|| AppError::car_not_found(car_id))
    }
}

#[async_trait]
impl CarOperations for CarService {
    async fn create_car(&self, form: CarForm) -> Result<CarResponse, AppError> {
        let car = form.clean(self.store.as_ref()).await?.with_generated_id(IdType::Car);
        tracing::info!("Creating car: {} ({})", car, car.manufacturer_id);

        self.store.insert_car(&car).await?;

        tracing::info!("Car created: {}", car.id);
        self.to_response(car).await
    }

    async fn get_car(&self, car_id: &str) -> Result<Option<CarResponse>, AppError> {
        match self.load_car(car_id).await {
            Ok(car) => Ok(Some(self.to_response(car).await?)),
            Err(AppError::CarNotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn list_cars(&self, model: Option<&str>) -> Result<Vec<CarResponse>, AppError> {
        let mut cars: Vec<Car> = self
            .store
            .list_cars()
            .await?
            .into_iter()
            .filter(|car| matches_filter(&car.model, model))
            .collect();
        cars.sort_by(|a, b| a.model.cmp(&b.model).then_with(|| a.id.cmp(&b.id)));
        self.to_responses(cars).await
    }

    async fn update_car(&self, car_id: &str, form: CarForm) -> Result<CarResponse, AppError> {
        let existing = self.load_car(car_id).await?;

        let mut car = form.clean(self.store.as_ref()).await?;
        car.id = existing.id;
        self.store.update_car(&car).await?;

        tracing::info!("Car updated: {}", car.id);
        self.to_response(car).await
    }

    async fn delete_car(&self, car_id: &str) -> Result<(), AppError> {
        if !self.store.delete_car(car_id).await? {
            return Err(AppError::car_not_found(car_id));
        }
        tracing::info!("Car deleted: {}", car_id);
        Ok(())
    }

    async fn toggle_assign(&self, car_id: &str, driver_id: &str) -> Result<CarResponse, AppError> {
        let mut car = self.load_car(car_id).await?;

        if car.driver_ids.remove(driver_id) {
            tracing::info!("Driver {} removed from car {}", driver_id, car.id);
        } else {
            car.driver_ids.insert(driver_id.to_string());
            tracing::info!("Driver {} assigned to car {}", driver_id, car.id);
        }

        self.store.update_car(&car).await?;
        self.to_response(car).await
    }

    async fn get_cars_by_manufacturer_name(&self, name: &str) -> Result<Vec<Car>, AppError> {
        let manufacturer_ids: Vec<String> = self
            .store
            .list_manufacturers()
            .await?
            .into_iter()
            .filter(|m| m.name == name)
            .map(|m| m.id)
            .collect();

        Ok(self
            .store
            .list_cars()
            .await?
            .into_iter()
            .filter(|car| manufacturer_ids.contains(&car.manufacturer_id))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{Driver, Manufacturer},
        services::memory_store::MemoryStore,
    };

    struct Fixture {
        store: Arc<MemoryStore>,
        service: CarService,
        manufacturer: Manufacturer,
        driver: Driver,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let manufacturer = Manufacturer::new("manufacturer", "country").with_generated_id(IdType::Manufacturer);
        store.insert_manufacturer(&manufacturer).await.unwrap();
        let driver = Driver::new("driver", "password").with_generated_id(IdType::Driver);
        store.insert_driver(&driver).await.unwrap();

        Fixture {
            service: CarService::new(store.clone()),
            store,
            manufacturer,
            driver,
        }
    }

    fn form(model: &str, manufacturer_id: &str, drivers: &[&str]) -> CarForm {
        CarForm {
            model: model.to_string(),
            manufacturer: manufacturer_id.to_string(),
            drivers: drivers.iter().map(|d| d.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_create_car_joins_relations() {
        let f = fixture().await;
        let car = f
            .service
            .create_car(form("model", &f.manufacturer.id, &[&f.driver.id]))
            .await
            .unwrap();

        assert_eq!(car.model, "model");
        assert_eq!(car.manufacturer, f.manufacturer);
        assert_eq!(car.drivers.len(), 1);
        assert_eq!(car.drivers[0].username, "driver");
    }

    #[tokio::test]
    async fn test_car_delete_with_manufacturer() {
        let f = fixture().await;
        f.service
            .create_car(form("model", &f.manufacturer.id, &[&f.driver.id]))
            .await
            .unwrap();

        f.store.delete_manufacturer(&f.manufacturer.id).await.unwrap();

        let cars = f.service.get_cars_by_manufacturer_name("manufacturer").await.unwrap();
        assert!(cars.is_empty());
        assert!(f.service.list_cars(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_form_writes_nothing() {
        let f = fixture().await;
        let result = f.service.create_car(form("", &f.manufacturer.id, &[])).await;

        assert!(matches!(result, Err(AppError::ValidationFailed(_))));
        assert_eq!(f.store.count_cars().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_toggle_assign() {
        let f = fixture().await;
        let car = f.service.create_car(form("model", &f.manufacturer.id, &[])).await.unwrap();

        let assigned = f.service.toggle_assign(&car.id, &f.driver.id).await.unwrap();
        assert_eq!(assigned.drivers.len(), 1);
        assert!(f.store.get_car(&car.id).await.unwrap().unwrap().has_driver(&f.driver.id));

        let removed = f.service.toggle_assign(&car.id, &f.driver.id).await.unwrap();
        assert!(removed.drivers.is_empty());
        assert!(!f.store.get_car(&car.id).await.unwrap().unwrap().has_driver(&f.driver.id));
    }

    #[tokio::test]
    async fn test_list_filters_by_model() {
        let f = fixture().await;
        for model in ["Corolla", "Camry", "Land Cruiser"] {
            f.service.create_car(form(model, &f.manufacturer.id, &[])).await.unwrap();
        }

        let models: Vec<String> = f.service.list_cars(Some("c")).await.unwrap().into_iter().map(|c| c.model).collect();
        assert_eq!(models, vec!["Camry", "Corolla", "Land Cruiser"]);

        let models: Vec<String> = f.service.list_cars(Some("cor")).await.unwrap().into_iter().map(|c| c.model).collect();
        assert_eq!(models, vec!["Corolla"]);
    }

    #[tokio::test]
    async fn test_missing_car() {
        let f = fixture().await;
        assert!(f.service.get_car("car-231207-zzzzz").await.unwrap().is_none());
        assert!(f.service.get_car("not-an-id").await.unwrap().is_none());
        assert!(matches!(
            f.service.delete_car("car-231207-zzzzz").await,
            Err(AppError::CarNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_responses_skip_cars_without_manufacturer() {
        let f = fixture().await;
        let kept = Car::new("kept", &f.manufacturer.id).with_generated_id(IdType::Car);
        let dangling = Car::new("dangling", "mfr-231207-zzzzz").with_generated_id(IdType::Car);

        let responses = f.service.to_responses(vec![dangling.clone(), kept]).await.unwrap();
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].model, "kept");

        assert!(matches!(
            f.service.to_response(dangling).await,
            Err(AppError::CarNotFound(_))
        ));
    }
}
