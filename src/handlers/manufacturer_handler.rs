// src/handlers/manufacturer_handler.rs
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    errors::{TaxiError, TaxiResult},
    forms::ManufacturerForm,
    handlers::extractors::CurrentSession,
    models::Manufacturer,
    services::ManufacturerOperations,
    state::AppState,
    utils::pagination::{paginate, Page},
};

#[derive(Debug, Deserialize)]
pub struct ManufacturerSearch {
    pub name: Option<String>,
    pub page: Option<String>,
}

pub async fn list_manufacturers(
    State(state): State<Arc<AppState>>,
    _: CurrentSession,
    Query(search): Query<ManufacturerSearch>,
) -> TaxiResult<Json<Page<Manufacturer>>> {
    let manufacturers = state.manufacturer_service.list_manufacturers(search.name.as_deref()).await?;
    Ok(Json(paginate(manufacturers, search.page.as_deref(), state.config.page_size)?))
}

pub async fn create_manufacturer(
    State(state): State<Arc<AppState>>,
    _: CurrentSession,
    Json(form): Json<ManufacturerForm>,
) -> TaxiResult<(StatusCode, Json<Manufacturer>)> {
    let manufacturer = state.manufacturer_service.create_manufacturer(form).await?;
    Ok((StatusCode::CREATED, Json(manufacturer)))
}

pub async fn get_manufacturer(
    State(state): State<Arc<AppState>>,
    _: CurrentSession,
    Path(manufacturer_id): Path<String>,
) -> TaxiResult<Json<Manufacturer>> {
    state
        .manufacturer_service
        .get_manufacturer(&manufacturer_id)
        .await?
        .map(Json)
        .ok_or(TaxiError::ManufacturerNotFound(manufacturer_id))
}

pub async fn update_manufacturer(
    State(state): State<Arc<AppState>>,
    _: CurrentSession,
    Path(manufacturer_id): Path<String>,
    Json(form): Json<ManufacturerForm>,
) -> TaxiResult<Json<Manufacturer>> {
    let manufacturer = state.manufacturer_service.update_manufacturer(&manufacturer_id, form).await?;
    Ok(Json(manufacturer))
}

pub async fn delete_manufacturer(
    State(state): State<Arc<AppState>>,
    _: CurrentSession,
    Path(manufacturer_id): Path<String>,
) -> TaxiResult<StatusCode> {
    state.manufacturer_service.delete_manufacturer(&manufacturer_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
