pub mod errors;
pub mod forms;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

// Re-export commonly used types
pub use errors::{TaxiError, TaxiResult, ValidationError};
pub use routes::create_app;
pub use state::{AppConfig, AppState};
