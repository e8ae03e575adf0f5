// src/handlers/mod.rs
pub mod auth_handler;
pub mod car_handler;
pub mod driver_handler;
pub mod extractors;
pub mod index_handler;
pub mod manufacturer_handler;
