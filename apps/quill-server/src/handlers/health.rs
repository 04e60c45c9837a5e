//! Health check endpoint.

use actix_web::{HttpResponse, web};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub database: &'static str,
    pub timestamp: String,
}

/// GET /api/health
///
/// `database` is `memory` when running on the in-memory store. An unreachable
/// database reports `degraded` with status 503.
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let database = database_status(&state).await;
    let healthy = database != "unreachable";

    let response = HealthResponse {
        status: if healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        database,
        timestamp: chrono::Utc::now().to_rfc3339(),
    };

    if healthy {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}

#[cfg(feature = "postgres")]
async fn database_status(state: &AppState) -> &'static str {
    let Some(db) = &state.db else {
        return "memory";
    };

    match db.ping().await {
        Ok(()) => "connected",
        Err(e) => {
            tracing::error!(error = %e, "Database health check failed");
            "unreachable"
        }
    }
}

#[cfg(not(feature = "postgres"))]
async fn database_status(_state: &AppState) -> &'static str {
    "memory"
}
