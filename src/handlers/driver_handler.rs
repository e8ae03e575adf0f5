// src/handlers/driver_handler.rs
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    errors::{TaxiError, TaxiResult},
    forms::{DriverCreationForm, DriverLicenseUpdateForm},
    handlers::extractors::CurrentSession,
    models::{DriverDetailResponse, DriverResponse},
    services::DriverOperations,
    state::AppState,
    utils::pagination::{paginate, Page},
};

#[derive(Debug, Deserialize)]
pub struct DriverSearch {
    pub username: Option<String>,
    pub page: Option<String>,
}

pub async fn list_drivers(
    State(state): State<Arc<AppState>>,
    _: CurrentSession,
    Query(search): Query<DriverSearch>,
) -> TaxiResult<Json<Page<DriverResponse>>> {
    let drivers = state.driver_service.list_drivers(search.username.as_deref()).await?;
    Ok(Json(paginate(drivers, search.page.as_deref(), state.config.page_size)?))
}

pub async fn create_driver(
    State(state): State<Arc<AppState>>,
    _: CurrentSession,
    Json(form): Json<DriverCreationForm>,
) -> TaxiResult<(StatusCode, Json<DriverResponse>)> {
    let driver = state.driver_service.register_driver(form).await?;
    Ok((StatusCode::CREATED, Json(driver)))
}

pub async fn get_driver(
    State(state): State<Arc<AppState>>,
    _: CurrentSession,
    Path(driver_id): Path<String>,
) -> TaxiResult<Json<DriverDetailResponse>> {
    state
        .driver_service
        .get_driver(&driver_id)
        .await?
        .map(Json)
        .ok_or(TaxiError::DriverNotFound(driver_id))
}

pub async fn update_license(
    State(state): State<Arc<AppState>>,
    _: CurrentSession,
    Path(driver_id): Path<String>,
    Json(form): Json<DriverLicenseUpdateForm>,
) -> TaxiResult<Json<DriverResponse>> {
    Ok(Json(state.driver_service.update_license(&driver_id, form).await?))
}

pub async fn delete_driver(
    State(state): State<Arc<AppState>>,
    _: CurrentSession,
    Path(driver_id): Path<String>,
) -> TaxiResult<StatusCode> {
    state.driver_service.delete_driver(&driver_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
