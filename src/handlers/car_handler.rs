// src/handlers/car_handler.rs
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    errors::{TaxiError, TaxiResult},
    forms::CarForm,
    handlers::extractors::CurrentSession,
    models::CarResponse,
    services::CarOperations,
    state::AppState,
    utils::pagination::{paginate, Page},
};

#[derive(Debug, Deserialize)]
pub struct CarSearch {
    pub model: Option<String>,
    pub page: Option<String>,
}

pub async fn list_cars(
    State(state): State<Arc<AppState>>,
    _: CurrentSession,
    Query(search): Query<CarSearch>,
) -> TaxiResult<Json<Page<CarResponse>>> {
    let cars = state.car_service.list_cars(search.model.as_deref()).await?;
    Ok(Json(paginate(cars, search.page.as_deref(), state.config.page_size)?))
}

pub async fn create_car(
    State(state): State<Arc<AppState>>,
    _: CurrentSession,
    Json(form): Json<CarForm>,
) -> TaxiResult<(StatusCode, Json<CarResponse>)> {
    let car = state.car_service.create_car(form).await?;
    Ok((StatusCode::CREATED, Json(car)))
}

pub async fn get_car(
    State(state): State<Arc<AppState>>,
    _: CurrentSession,
    Path(car_id): Path<String>,
) -> TaxiResult<Json<CarResponse>> {
    state
        .car_service
        .get_car(&car_id)
        .await?
        .map(Json)
        .ok_or(TaxiError::CarNotFound(car_id))
}

pub async fn update_car(
    State(state): State<Arc<AppState>>,
    _: CurrentSession,
    Path(car_id): Path<String>,
    Json(form): Json<CarForm>,
) -> TaxiResult<Json<CarResponse>> {
    Ok(Json(state.car_service.update_car(&car_id, form).await?))
}

pub async fn delete_car(
    State(state): State<Arc<AppState>>,
    _: CurrentSession,
    Path(car_id): Path<String>,
) -> TaxiResult<StatusCode> {
    state.car_service.delete_car(&car_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Adds the logged-in driver to the car, or removes them if already assigned.
pub async fn toggle_assign(
    State(state): State<Arc<AppState>>,
    current: CurrentSession,
    Path(car_id): Path<String>,
) -> TaxiResult<Json<CarResponse>> {
    Ok(Json(state.car_service.toggle_assign(&car_id, &current.driver.id).await?))
}
