use crate::error::LimitterError;
use crate::models::User;
use crate::services::TransactionStore;
use axum::{extract::Request, middleware::Next, response::Response};
use std::sync::Arc;

/// Request-scoped identity, resolved once per request and threaded through
/// request extensions instead of ambient global state.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
}

/// Guards the admin surface: resolves the `x-user-id` header against the
/// store and requires `is_admin`. The flag itself has no write path in this
/// service; it is only ever flipped by hand in the store (see the
/// `admin-flag` binary).
pub async fn require_admin(
    store: Arc<dyn TransactionStore>,
    request: Request,
    next: Next,
) -> Result<Response, LimitterError> {
    let user_id = request
        .headers()
        .get("x-user-id")
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or(LimitterError::Unauthorized)?
        .to_string();

    let user = store
        .get_user(&user_id)
        .await?
        .ok_or(LimitterError::Unauthorized)?;

    if !user.is_admin {
        tracing::warn!(%user_id, "Admin route refused for non-admin user");
        return Err(LimitterError::AdminRequired);
    }

    let mut request = request;
    request.extensions_mut().insert(Session { user });

    Ok(next.run(request).await)
}
