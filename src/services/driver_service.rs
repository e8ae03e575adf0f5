// src/services/driver_service.rs
use async_trait::async_trait;
use std::sync::Arc;
use tracing;

use crate::{
    errors::TaxiError as AppError,
    forms::{DriverCreationForm, DriverLicenseUpdateForm},
    models::{Car, Driver, DriverDetailResponse, DriverResponse},
    services::{manufacturer_service::matches_filter, store::FleetStore},
    utils::{
        id_generator::{IdGenerator, IdType, WithGeneratedId},
        password,
    },
};

#[async_trait]
pub trait DriverOperations: Send + Sync {
    async fn register_driver(&self, form: DriverCreationForm) -> Result<DriverResponse, AppError>;
    async fn get_driver(&self, driver_id: &str) -> Result<Option<DriverDetailResponse>, AppError>;
    async fn list_drivers(&self, username: Option<&str>) -> Result<Vec<DriverResponse>, AppError>;
    async fn update_license(&self, driver_id: &str, form: DriverLicenseUpdateForm) -> Result<DriverResponse, AppError>;
    async fn delete_driver(&self, driver_id: &str) -> Result<(), AppError>;
    async fn ensure_superuser(&self, username: &str, password: &str) -> Result<Driver, AppError>;
}

pub struct DriverService {
    store: Arc<dyn FleetStore>,
}

impl DriverService {
    pub fn new(store: Arc<dyn FleetStore>) -> Self {
        Self { store }
    }

    async fn load_driver(&self, driver_id: &str) -> Result<Driver, AppError> {
        if !IdGenerator::validate_id(driver_id, Some(IdType::Driver)) {
            tracing::warn!("Invalid driver ID format: {}", driver_id);
            return Err(AppError::driver_not_found(driver_id));
        }
        self.store
            .get_driver(driver_id)
            .await?
            .ok_or_else(|| AppError::driver_not_found(driver_id))
    }
}

#[async_trait]
impl DriverOperations for DriverService {
    async fn register_driver(&self, form: DriverCreationForm) -> Result<DriverResponse, AppError> {
        let cleaned = form.clean()?;
        tracing::info!("Registering driver: {}", cleaned.username);

        let mut driver = Driver::new(cleaned.username, password::hash_password(&cleaned.password))
            .with_generated_id(IdType::Driver);
        driver.first_name = cleaned.first_name;
        driver.last_name = cleaned.last_name;
        driver.email = cleaned.email;
        driver.license_number = Some(cleaned.license_number);

        self.store.insert_driver(&driver).await?;

        tracing::info!("Driver registered successfully: {}", driver.id);
        Ok(driver.into())
    }

    async fn get_driver(&self, driver_id: &str) -> Result<Option<DriverDetailResponse>, AppError> {
        let driver = match self.load_driver(driver_id).await {
            Ok(driver) => driver,
            Err(AppError::DriverNotFound(_)) => return Ok(None),
            Err(err) => return Err(err),
        };

        let mut cars: Vec<Car> = self
            .store
            .list_cars()
            .await?
            .into_iter()
            .filter(|car| car.has_driver(&driver.id))
            .collect();
        cars.sort_by(|a, b| a.model.cmp(&b.model));

        Ok(Some(DriverDetailResponse {
            driver: driver.into(),
            cars,
        }))
    }

    async fn list_drivers(&self, username: Option<&str>) -> Result<Vec<DriverResponse>, AppError> {
        let mut drivers: Vec<Driver> = self
            .store
            .list_drivers()
            .await?
            .into_iter()
            .filter(|driver| matches_filter(&driver.username, username))
            .collect();
        drivers.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(drivers.into_iter().map(DriverResponse::from).collect())
    }

    async fn update_license(&self, driver_id: &str, form: DriverLicenseUpdateForm) -> Result<DriverResponse, AppError> {
        let mut driver = self.load_driver(driver_id).await?;
        let license_number = form.clean()?;

        tracing::info!("Updating license number for driver: {}", driver.id);
        driver.license_number = Some(license_number);
        self.store.update_driver(&driver).await?;

        Ok(driver.into())
    }

    async fn delete_driver(&self, driver_id: &str) -> Result<(), AppError> {
        if !self.store.delete_driver(driver_id).await? {
            return Err(AppError::driver_not_found(driver_id));
        }
        tracing::info!("Driver deleted: {}", driver_id);
        Ok(())
    }

    async fn ensure_superuser(&self, username: &str, password: &str) -> Result<Driver, AppError> {
        if let Some(existing) = self.store.get_driver_by_username(username).await? {
            tracing::debug!("Superuser {} already present", username);
            return Ok(existing);
        }

        let mut driver = Driver::new(username, password::hash_password(password)).with_generated_id(IdType::Driver);
        driver.is_staff = true;
        driver.is_superuser = true;
        self.store.insert_driver(&driver).await?;

        tracing::info!("Superuser created: {}", username);
        Ok(driver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        forms::CarForm,
        models::Manufacturer,
        services::{
            car_service::{CarOperations, CarService},
            memory_store::MemoryStore,
        },
    };

    fn creation_form(username: &str, license_number: &str) -> DriverCreationForm {
        DriverCreationForm {
            username: username.to_string(),
            password: "password".to_string(),
            first_name: "Kofi".to_string(),
            last_name: "Boateng".to_string(),
            email: String::new(),
            license_number: license_number.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_hashes_password() {
        let store = Arc::new(MemoryStore::new());
        let service = DriverService::new(store.clone());

        let created = service.register_driver(creation_form("kofi", "ABC12345")).await.unwrap();

        let stored = store.get_driver(&created.id).await.unwrap().unwrap();
        assert_ne!(stored.password_hash, "password");
        assert!(password::verify_password("password", &stored.password_hash));
        assert_eq!(stored.to_string(), "kofi (Kofi Boateng)");
    }

    #[tokio::test]
    async fn test_register_rejects_bad_license_and_duplicates() {
        let service = DriverService::new(Arc::new(MemoryStore::new()));

        let invalid = service.register_driver(creation_form("kofi", "ABC1234")).await;
        assert!(matches!(invalid, Err(AppError::ValidationFailed(_))));

        service.register_driver(creation_form("kofi", "ABC12345")).await.unwrap();
        let same_license = service.register_driver(creation_form("ama", "ABC12345")).await;
        assert!(matches!(same_license, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_update_license() {
        let service = DriverService::new(Arc::new(MemoryStore::new()));
        let created = service.register_driver(creation_form("kofi", "ABC12345")).await.unwrap();

        let form = DriverLicenseUpdateForm {
            license_number: "XYZ98765".to_string(),
        };
        let updated = service.update_license(&created.id, form).await.unwrap();
        assert_eq!(updated.license_number.as_deref(), Some("XYZ98765"));

        let form = DriverLicenseUpdateForm {
            license_number: "ABCa2345".to_string(),
        };
        assert!(matches!(
            service.update_license(&created.id, form).await,
            Err(AppError::ValidationFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_detail_lists_cars_and_delete_detaches() {
        let store = Arc::new(MemoryStore::new());
        let drivers = DriverService::new(store.clone());
        let cars = CarService::new(store.clone());

        let manufacturer = Manufacturer::new("manufacturer", "country").with_generated_id(IdType::Manufacturer);
        store.insert_manufacturer(&manufacturer).await.unwrap();
        let driver = drivers.register_driver(creation_form("kofi", "ABC12345")).await.unwrap();
        let car = cars
            .create_car(CarForm {
                model: "model".to_string(),
                manufacturer: manufacturer.id.clone(),
                drivers: vec![driver.id.clone()],
            })
            .await
            .unwrap();

        let detail = drivers.get_driver(&driver.id).await.unwrap().unwrap();
        assert_eq!(detail.cars.len(), 1);

        drivers.delete_driver(&driver.id).await.unwrap();
        let car = cars.get_car(&car.id).await.unwrap().unwrap();
        assert!(car.drivers.is_empty());
        assert!(drivers.get_driver(&driver.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_ensure_superuser_is_idempotent() {
        let store = Arc::new(MemoryStore::new());
        let service = DriverService::new(store.clone());

        let first = service.ensure_superuser("admin", "admin").await.unwrap();
        let second = service.ensure_superuser("admin", "other").await.unwrap();

        assert!(first.is_superuser);
        assert_eq!(first.id, second.id);
        assert_eq!(store.count_drivers().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_list_drivers_by_username() {
        let service = DriverService::new(Arc::new(MemoryStore::new()));
        service.register_driver(creation_form("zed", "AAA11111")).await.unwrap();
        service.register_driver(creation_form("ama", "BBB22222")).await.unwrap();

        let all: Vec<String> = service.list_drivers(None).await.unwrap().into_iter().map(|d| d.username).collect();
        assert_eq!(all, vec!["ama", "zed"]);
        assert_eq!(service.list_drivers(Some("ZE")).await.unwrap().len(), 1);
    }
}
