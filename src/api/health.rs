//! Health check endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Current status of the service
    pub status: String,
    /// Version of the service
    pub version: String,
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness check endpoint (checks database connectivity)
#[utoipa::path(
    get,
    path = "/ready",
    tag = "health",
    responses(
        (status = 200, description = "Service is ready", body = HealthResponse),
        (status = 503, description = "Database unreachable")
    )
)]
pub async fn readiness_check(
    State(state): State<crate::AppState>,
) -> Result<Json<HealthResponse>, StatusCode> {
    match state.services.ping().await {
        Ok(()) => Ok(Json(HealthResponse {
            status: "ready".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        })),
        Err(e) => {
            tracing::warn!("Readiness check failed: {}", e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AppConfig, error::AppError, repository::MockGateway, services::Services, AppState,
    };
    use std::sync::Arc;

    fn state(gateway: MockGateway) -> AppState {
        let config = AppConfig {
            server: Default::default(),
            database: Default::default(),
            auth: Default::default(),
            logging: Default::default(),
        };
        AppState {
            config: Arc::new(config),
            services: Arc::new(Services::new(Arc::new(gateway), Default::default())),
        }
    }

    #[tokio::test]
    async fn readiness_reports_ready_when_database_answers() {
        let mut gateway = MockGateway::new();
        gateway.expect_ping().returning(|| Ok(()));

        let response = readiness_check(State(state(gateway))).await.unwrap();
        assert_eq!(response.0.status, "ready");
    }

    #[tokio::test]
    async fn readiness_reports_unavailable_when_database_is_down() {
        let mut gateway = MockGateway::new();
        gateway
            .expect_ping()
            .returning(|| Err(AppError::Internal("connection refused".to_string())));

        let err = readiness_check(State(state(gateway))).await.unwrap_err();
        assert_eq!(err, StatusCode::SERVICE_UNAVAILABLE);
    }
}
