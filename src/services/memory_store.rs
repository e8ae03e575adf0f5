// src/services/memory_store.rs
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::{
    errors::{TaxiError, TaxiResult},
    models::{Car, Driver, Manufacturer, Session},
    services::store::FleetStore,
};

#[derive(Default)]
struct Tables {
    manufacturers: HashMap<String, Manufacturer>,
    drivers: HashMap<String, Driver>,
    cars: HashMap<String, Car>,
    sessions: HashMap<String, Session>,
}

impl Tables {
    fn check_manufacturer_name(&self, manufacturer: &Manufacturer) -> TaxiResult<()> {
        let taken = self
            .manufacturers
            .values()
            .any(|other| other.id != manufacturer.id && other.name == manufacturer.name);
        if taken {
            return Err(TaxiError::conflict(format!(
                "Manufacturer with name '{}' already exists",
                manufacturer.name
            )));
        }
        Ok(())
    }

    fn check_driver_unique(&self, driver: &Driver) -> TaxiResult<()> {
        for other in self.drivers.values().filter(|other| other.id != driver.id) {
            if other.username == driver.username {
                return Err(TaxiError::conflict(format!(
                    "Driver with username '{}' already exists",
                    driver.username
                )));
            }
            if driver.license_number.is_some() && other.license_number == driver.license_number {
                return Err(TaxiError::conflict("Driver with this license number already exists"));
            }
        }
        Ok(())
    }

    fn check_car_references(&self, car: &Car) -> TaxiResult<()> {
        if !self.manufacturers.contains_key(&car.manufacturer_id) {
            return Err(TaxiError::manufacturer_not_found(&car.manufacturer_id));
        }
        if let Some(missing) = car.driver_ids.iter().find(|id| !self.drivers.contains_key(*id)) {
            return Err(TaxiError::driver_not_found(missing));
        }
        Ok(())
    }
}

/// In-process backend; every call holds the table lock for its whole duration.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FleetStore for MemoryStore {
    async fn insert_manufacturer(&self, manufacturer: &Manufacturer) -> TaxiResult<()> {
        let mut tables = self.tables.write().await;
        if tables.manufacturers.contains_key(&manufacturer.id) {
            return Err(TaxiError::conflict(format!("Manufacturer id already used: {}", manufacturer.id)));
        }
        tables.check_manufacturer_name(manufacturer)?;
        tables.manufacturers.insert(manufacturer.id.clone(), manufacturer.clone());
        Ok(())
    }

    async fn update_manufacturer(&self, manufacturer: &Manufacturer) -> TaxiResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.manufacturers.contains_key(&manufacturer.id) {
            return Err(TaxiError::manufacturer_not_found(&manufacturer.id));
        }
        tables.check_manufacturer_name(manufacturer)?;
        tables.manufacturers.insert(manufacturer.id.clone(), manufacturer.clone());
        Ok(())
    }

    async fn get_manufacturer(&self, id: &str) -> TaxiResult<Option<Manufacturer>> {
        Ok(self.tables.read().await.manufacturers.get(id).cloned())
    }

    async fn list_manufacturers(&self) -> TaxiResult<Vec<Manufacturer>> {
        Ok(self.tables.read().await.manufacturers.values().cloned().collect())
    }

    async fn delete_manufacturer(&self, id: &str) -> TaxiResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.manufacturers.remove(id).is_none() {
            return Ok(false);
        }
        let before = tables.cars.len();
        tables.cars.retain(|_, car| car.manufacturer_id != id);
        tracing::debug!("Manufacturer {} deleted with {} cars", id, before - tables.cars.len());
        Ok(true)
    }

    async fn count_manufacturers(&self) -> TaxiResult<usize> {
        Ok(self.tables.read().await.manufacturers.len())
    }

    async fn insert_driver(&self, driver: &Driver) -> TaxiResult<()> {
        let mut tables = self.tables.write().await;
        if tables.drivers.contains_key(&driver.id) {
            return Err(TaxiError::conflict(format!("Driver id already used: {}", driver.id)));
        }
        tables.check_driver_unique(driver)?;
        tables.drivers.insert(driver.id.clone(), driver.clone());
        Ok(())
    }

    async fn update_driver(&self, driver: &Driver) -> TaxiResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.drivers.contains_key(&driver.id) {
            return Err(TaxiError::driver_not_found(&driver.id));
        }
        tables.check_driver_unique(driver)?;
        tables.drivers.insert(driver.id.clone(), driver.clone());
        Ok(())
    }

    async fn get_driver(&self, id: &str) -> TaxiResult<Option<Driver>> {
        Ok(self.tables.read().await.drivers.get(id).cloned())
    }

    async fn get_driver_by_username(&self, username: &str) -> TaxiResult<Option<Driver>> {
        let tables = self.tables.read().await;
        Ok(tables.drivers.values().find(|driver| driver.username == username).cloned())
    }

    async fn list_drivers(&self) -> TaxiResult<Vec<Driver>> {
        Ok(self.tables.read().await.drivers.values().cloned().collect())
    }

    async fn delete_driver(&self, id: &str) -> TaxiResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.drivers.remove(id).is_none() {
            return Ok(false);
        }
        for car in tables.cars.values_mut() {
            car.driver_ids.remove(id);
        }
        tables.sessions.retain(|_, session| session.driver_id != id);
        Ok(true)
    }

    async fn count_drivers(&self) -> TaxiResult<usize> {
        Ok(self.tables.read().await.drivers.len())
    }

    async fn insert_car(&self, car: &Car) -> TaxiResult<()> {
        let mut tables = self.tables.write().await;
        if tables.cars.contains_key(&car.id) {
            return Err(TaxiError::conflict(format!("Car id already used: {}", car.id)));
        }
        tables.check_car_references(car)?;
        tables.cars.insert(car.id.clone(), car.clone());
        Ok(())
    }

    async fn update_car(&self, car: &Car) -> TaxiResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.cars.contains_key(&car.id) {
            return Err(TaxiError::car_not_found(&car.id));
        }
        tables.check_car_references(car)?;
        tables.cars.insert(car.id.clone(), car.clone());
        Ok(())
    }

    async fn get_car(&self, id: &str) -> TaxiResult<Option<Car>> {
        Ok(self.tables.read().await.cars.get(id).cloned())
    }

    async fn list_cars(&self) -> TaxiResult<Vec<Car>> {
        Ok(self.tables.read().await.cars.values().cloned().collect())
    }

    async fn delete_car(&self, id: &str) -> TaxiResult<bool> {
        Ok(self.tables.write().await.cars.remove(id).is_some())
    }

    async fn count_cars(&self) -> TaxiResult<usize> {
        Ok(self.tables.read().await.cars.len())
    }

    async fn save_session(&self, session: &Session) -> TaxiResult<()> {
        let mut tables = self.tables.write().await;
        let before = tables.sessions.len();
        tables.sessions.retain(|_, stored| !stored.is_expired());
        if tables.sessions.len() < before {
            tracing::debug!("Swept {} expired sessions", before - tables.sessions.len());
        }
        tables.sessions.insert(session.token.clone(), session.clone());
        Ok(())
    }

    async fn get_session(&self, token: &str) -> TaxiResult<Option<Session>> {
        Ok(self.tables.read().await.sessions.get(token).cloned())
    }

    async fn record_visit(&self, token: &str) -> TaxiResult<Option<u64>> {
        let mut tables = self.tables.write().await;
        Ok(tables.sessions.get_mut(token).map(|session| {
            session.num_visits += 1;
            session.num_visits
        }))
    }

    async fn delete_session(&self, token: &str) -> TaxiResult<()> {
        self.tables.write().await.sessions.remove(token);
        Ok(())
    }
}
