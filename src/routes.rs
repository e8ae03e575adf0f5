// src/routes.rs
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{auth_handler, car_handler, driver_handler, index_handler, manufacturer_handler},
    state::AppState,
};

pub fn create_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_handler::index))
        .route("/accounts/login/", get(auth_handler::login_page).post(auth_handler::login))
        .route("/accounts/logout/", post(auth_handler::logout))
        .route(
            "/manufacturers/",
            get(manufacturer_handler::list_manufacturers).post(manufacturer_handler::create_manufacturer),
        )
        .route("/manufacturers/:id/", get(manufacturer_handler::get_manufacturer))
        .route("/manufacturers/:id/update/", post(manufacturer_handler::update_manufacturer))
        .route("/manufacturers/:id/delete/", post(manufacturer_handler::delete_manufacturer))
        .route("/cars/", get(car_handler::list_cars).post(car_handler::create_car))
        .route("/cars/:id/", get(car_handler::get_car))
        .route("/cars/:id/update/", post(car_handler::update_car))
        .route("/cars/:id/delete/", post(car_handler::delete_car))
        .route("/cars/:id/toggle-assign/", post(car_handler::toggle_assign))
        .route("/drivers/", get(driver_handler::list_drivers).post(driver_handler::create_driver))
        .route("/drivers/:id/", get(driver_handler::get_driver))
        .route("/drivers/:id/update/", post(driver_handler::update_license))
        .route("/drivers/:id/delete/", post(driver_handler::delete_driver))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
