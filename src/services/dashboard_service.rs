// src/services/dashboard_service.rs
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{errors::TaxiResult, services::store::FleetStore};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FleetCounts {
    pub num_drivers: usize,
    pub num_cars: usize,
    pub num_manufacturers: usize,
}

pub struct DashboardService {
    store: Arc<dyn FleetStore>,
}

impl DashboardService {
    pub fn new(store: Arc<dyn FleetStore>) -> Self {
        Self { store }
    }

    pub async fn counts(&self) -> TaxiResult<FleetCounts> {
        Ok(FleetCounts {
            num_drivers: self.store.count_drivers().await?,
            num_cars: self.store.count_cars().await?,
            num_manufacturers: self.store.count_manufacturers().await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{Car, Manufacturer},
        services::memory_store::MemoryStore,
        utils::id_generator::{IdType, WithGeneratedId},
    };

    #[tokio::test]
    async fn test_counts_follow_cascade() {
        let store = Arc::new(MemoryStore::new());
        let dashboard = DashboardService::new(store.clone());
        assert_eq!(
            dashboard.counts().await.unwrap(),
            FleetCounts { num_drivers: 0, num_cars: 0, num_manufacturers: 0 }
        );

        let manufacturer = Manufacturer::new("manufacturer", "country").with_generated_id(IdType::Manufacturer);
        store.insert_manufacturer(&manufacturer).await.unwrap();
        store.insert_car(&Car::new("model", &manufacturer.id).with_generated_id(IdType::Car)).await.unwrap();
        assert_eq!(dashboard.counts().await.unwrap().num_cars, 1);

        store.delete_manufacturer(&manufacturer.id).await.unwrap();
        let counts = dashboard.counts().await.unwrap();
        assert_eq!(counts.num_cars, 0);
        assert_eq!(counts.num_manufacturers, 0);
    }
}
