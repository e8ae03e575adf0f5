// src/handlers/index_handler.rs
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    errors::TaxiResult,
    handlers::extractors::CurrentSession,
    services::{AuthOperations, FleetCounts},
    state::AppState,
};

#[derive(Debug, Serialize, Deserialize)]
pub struct IndexResponse {
    #[serde(flatten)]
    pub counts: FleetCounts,
    pub num_visits: u64,
}

pub async fn index(
    State(state): State<Arc<AppState>>,
    CurrentSession { mut session, .. }: CurrentSession,
) -> TaxiResult<Json<IndexResponse>> {
    let counts = state.dashboard_service.counts().await?;
    let num_visits = state.auth_service.record_visit(&mut session).await?;

    Ok(Json(IndexResponse { counts, num_visits }))
}
