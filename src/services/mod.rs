// src/services/mod.rs
pub mod auth_service;
pub mod car_service;
pub mod dashboard_service;
pub mod driver_service;
pub mod manufacturer_service;
pub mod memory_store;
pub mod redis_store;
pub mod store;

pub use auth_service::{AuthOperations, AuthService};
pub use car_service::{CarOperations, CarService};
pub use dashboard_service::{DashboardService, FleetCounts};
pub use driver_service::{DriverOperations, DriverService};
pub use manufacturer_service::{ManufacturerOperations, ManufacturerService};
pub use memory_store::MemoryStore;
pub use redis_store::RedisStore;
pub use store::FleetStore;
