use std::sync::Arc;

use taxi_fleet::{
    create_app,
    services::DriverOperations,
    state::{AppConfig, AppState},
    utils::logger,
    TaxiResult,
};

#[tokio::main]
async fn main() -> TaxiResult<()> {
    logger::init_logger();

    let config = AppConfig::from_env()?;
    let bind_addr = config.bind_addr.clone();
    let admin = config.admin_username.clone().zip(config.admin_password.clone());

    let app_state = AppState::new(config).await?;
    if let Some((username, password)) = admin {
        app_state.driver_service.ensure_superuser(&username, &password).await?;
    }

    let app = create_app(Arc::new(app_state));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| taxi_fleet::TaxiError::ConfigurationError(format!("Cannot bind {}: {}", bind_addr, e)))?;
    tracing::info!("Taxi fleet service listening on {}", bind_addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| taxi_fleet::TaxiError::internal_error(e.to_string()))
}
