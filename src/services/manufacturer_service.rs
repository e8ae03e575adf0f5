// src/services/manufacturer_service.rs
use async_trait::async_trait;
use std::sync::Arc;
use tracing;

use crate::{
    errors::TaxiError as AppError,
    forms::ManufacturerForm,
    models::Manufacturer,
    services::store::FleetStore,
    utils::id_generator::{IdGenerator, IdType, WithGeneratedId},
};

#[async_trait]
pub trait ManufacturerOperations: Send + Sync {
    async fn create_manufacturer(&self, form: ManufacturerForm) -> Result<Manufacturer, AppError>;
    async fn get_manufacturer(&self, manufacturer_id: &str) -> Result<Option<Manufacturer>, AppError>;
    async fn list_manufacturers(&self, name: Option<&str>) -> Result<Vec<Manufacturer>, AppError>;
    async fn update_manufacturer(&self, manufacturer_id: &str, form: ManufacturerForm) -> Result<Manufacturer, AppError>;
    async fn delete_manufacturer(&self, manufacturer_id: &str) -> Result<(), AppError>;
}

pub struct ManufacturerService {
    store: Arc<dyn FleetStore>,
}

impl ManufacturerService {
    pub fn new(store: Arc<dyn FleetStore>) -> Self {
        Self { store }
    }
}

/// Case-insensitive substring match, empty needle matches everything.
pub(crate) fn matches_filter(value: &str, needle: Option<&str>) -> bool {
    match needle.map(str::trim).filter(|n| !n.is_empty()) {
        Some(needle) => value.to_lowercase().contains(&needle.to_lowercase()),
        None => true,
    }
}

#[async_trait]
impl ManufacturerOperations for ManufacturerService {
    async fn create_manufacturer(&self, form: ManufacturerForm) -> Result<Manufacturer, AppError> {
        let manufacturer = form.clean()?.with_generated_id(IdType::Manufacturer);
        tracing::info!("Creating manufacturer: {}", manufacturer);

        self.store.insert_manufacturer(&manufacturer).await?;

        tracing::info!("Manufacturer created: {}", manufacturer.id);
        Ok(manufacturer)
    }

    async fn get_manufacturer(&self, manufacturer_id: &str) -> Result<Option<Manufacturer>, AppError> {
        if !IdGenerator::validate_id(manufacturer_id, Some(IdType::Manufacturer)) {
            tracing::warn!("Invalid manufacturer ID format: {}", manufacturer_id);
            return Ok(None);
        }
        self.store.get_manufacturer(manufacturer_id).await
    }

    async fn list_manufacturers(&self, name: Option<&str>) -> Result<Vec<Manufacturer>, AppError> {
        let mut manufacturers: Vec<Manufacturer> = self
            .store
            .list_manufacturers()
            .await?
            .into_iter()
            .filter(|m| matches_filter(&m.name, name))
            .collect();
        manufacturers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(manufacturers)
    }

    async fn update_manufacturer(&self, manufacturer_id: &str, form: ManufacturerForm) -> Result<Manufacturer, AppError> {
        let existing = self
            .get_manufacturer(manufacturer_id)
            .await?
            .ok_or_else(|| AppError::manufacturer_not_found(manufacturer_id))?;

        let mut manufacturer = form.clean()?;
        manufacturer.id = existing.id;
        self.store.update_manufacturer(&manufacturer).await?;

        tracing::info!("Manufacturer updated: {}", manufacturer.id);
        Ok(manufacturer)
    }

    async fn delete_manufacturer(&self, manufacturer_id: &str) -> Result<(), AppError> {
        if !self.store.delete_manufacturer(manufacturer_id).await? {
            return Err(AppError::manufacturer_not_found(manufacturer_id));
        }
        tracing::info!("Manufacturer deleted: {}", manufacturer_id);
        Ok(())
    }
}
