use crate::{
    error::LimitterError,
    middleware::Session,
    models::{ApiResponse, TransactionDetails, TransactionPage, TransactionView},
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

pub async fn list_transactions(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ApiResponse<TransactionPage>>, LimitterError> {
    let page = state.store.list_all(params.cursor.as_deref()).await?;
    Ok(Json(ApiResponse::new(page)))
}

/// An empty or whitespace-only term is the listing-mode first page, not a
/// search round trip.
pub async fn search_transactions(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<ApiResponse<TransactionPage>>, LimitterError> {
    let term = params.q.trim();
    let page = if term.is_empty() {
        state.store.list_all(None).await?
    } else {
        let transactions = state.store.search(term).await?;
        TransactionPage {
            transactions,
            cursor: None,
            has_more: false,
        }
    };
    Ok(Json(ApiResponse::new(page)))
}

pub async fn transaction_details(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<TransactionDetails>>, LimitterError> {
    let details = state.store.details(&id).await?;
    tracing::info!(admin = %session.user.id, transaction = %id, "Transaction details viewed");
    Ok(Json(ApiResponse::new(details)))
}

pub async fn user_transactions(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<TransactionView>>>, LimitterError> {
    let transactions = state.store.for_user(&user_id).await?;
    Ok(Json(ApiResponse::new(transactions)))
}
