use crate::{models::HealthStatus, services::RedisTransactionStore};
use axum::{extract::State, Json};
use chrono::Utc;
use std::sync::Arc;

#[derive(Clone)]
pub struct HealthState {
    pub store: Arc<RedisTransactionStore>,
    pub gateway_configured: bool,
}

pub async fn health_check(State(state): State<HealthState>) -> Json<HealthStatus> {
    let redis_ok = state.store.ping().await;

    let status = if redis_ok && state.gateway_configured {
        "healthy"
    } else if state.gateway_configured {
        "degraded"
    } else {
        "unhealthy"
    };

    Json(HealthStatus {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        redis: redis_ok,
        payment_gateway: state.gateway_configured,
        timestamp: Utc::now(),
    })
}
