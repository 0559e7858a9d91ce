use crate::{
    error::LimitterError,
    models::{CheckoutSession, CreatePaymentIntentRequest, GetSessionRequest, PaymentIntentResponse},
};
use axum::{extract::State, Json};
use serde::Serialize;

use super::AppState;

pub async fn create_payment_intent(
    State(state): State<AppState>,
    Json(req): Json<CreatePaymentIntentRequest>,
) -> Result<Json<PaymentIntentResponse>, LimitterError> {
    let client_secret = state
        .gateway
        .create_payment_intent(
            req.amount,
            &req.payment_type,
            req.quantity,
            req.plan.as_deref(),
        )
        .await?;

    Ok(Json(PaymentIntentResponse { client_secret }))
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub session: CheckoutSession,
}

pub async fn get_session(
    State(state): State<AppState>,
    Json(req): Json<GetSessionRequest>,
) -> Result<Json<SessionResponse>, LimitterError> {
    let session = state.gateway.get_checkout_session(&req.session_id).await?;
    Ok(Json(SessionResponse { session }))
}
