// src/services/store.rs
use async_trait::async_trait;

use crate::{
    errors::TaxiResult,
    models::{Car, Driver, Manufacturer, Session},
};

/// Persistence seam shared by every service.
///
/// Backends own the relational rules: unique manufacturer names, unique
/// usernames and license numbers, cars referencing existing manufacturers
/// and drivers, and the cascades run by `delete_manufacturer` and
/// `delete_driver`. Each call is atomic.
#[async_trait]
pub trait FleetStore: Send + Sync {
    async fn insert_manufacturer(&self, manufacturer: &Manufacturer) -> TaxiResult<()>;
    async fn update_manufacturer(&self, manufacturer: &Manufacturer) -> TaxiResult<()>;
    async fn get_manufacturer(&self, id: &str) -> TaxiResult<Option<Manufacturer>>;
    async fn list_manufacturers(&self) -> TaxiResult<Vec<Manufacturer>>;
    /// Removes the manufacturer and every car referencing it.
    async fn delete_manufacturer(&self, id: &str) -> TaxiResult<bool>;
    async fn count_manufacturers(&self) -> TaxiResult<usize>;

    async fn insert_driver(&self, driver: &Driver) -> TaxiResult<()>;
    async fn update_driver(&self, driver: &Driver) -> TaxiResult<()>;
    async fn get_driver(&self, id: &str) -> TaxiResult<Option<Driver>>;
    async fn get_driver_by_username(&self, username: &str) -> TaxiResult<Option<Driver>>;
    async fn list_drivers(&self) -> TaxiResult<Vec<Driver>>;
    /// Removes the driver and drops it from every car's driver set.
    async fn delete_driver(&self, id: &str) -> TaxiResult<bool>;
    async fn count_drivers(&self) -> TaxiResult<usize>;

    async fn insert_car(&self, car: &Car) -> TaxiResult<()>;
    async fn update_car(&self, car: &Car) -> TaxiResult<()>;
    async fn get_car(&self, id: &str) -> TaxiResult<Option<Car>>;
    async fn list_cars(&self) -> TaxiResult<Vec<Car>>;
    async fn delete_car(&self, id: &str) -> TaxiResult<bool>;
    async fn count_cars(&self) -> TaxiResult<usize>;

    async fn save_session(&self, session: &Session) -> TaxiResult<()>;
    async fn get_session(&self, token: &str) -> TaxiResult<Option<Session>>;
    /// Bumps the stored visit counter in place. `None` once the session is gone.
    async fn record_visit(&self, token: &str) -> TaxiResult<Option<u64>>;
    async fn delete_session(&self, token: &str) -> TaxiResult<()>;
}
