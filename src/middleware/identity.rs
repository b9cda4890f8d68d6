use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use serde::Serialize;
use uuid::Uuid;

use super::auth::SessionUser;
use crate::database::UserStore;
use crate::error::ApiError;
use crate::state::AppState;

/// The resolved principal, injected into every protected handler. Handlers
/// take this from request extensions and never resolve sessions themselves.
#[derive(Clone, Debug, Serialize)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
}

/// Second half of the authorization gate: maps the session's user id to a
/// stored User. A valid session whose principal has disappeared is a 404,
/// deliberately distinct from the 401 the session layer produces.
pub async fn resolve_identity(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let session = request
        .extensions()
        .get::<SessionUser>()
        .cloned()
        .ok_or_else(|| {
            ApiError::unauthorized("Session authentication required before identity resolution")
        })?;

    let user = state
        .users
        .find_by_id(session.user_id)
        .await
        .map_err(|e| {
            tracing::error!("Database error resolving identity {}: {}", session.user_id, e);
            ApiError::internal_server_error("Failed to resolve identity")
        })?
        .ok_or_else(|| {
            tracing::warn!(
                "Identity resolution failed: no user for session subject {}",
                session.user_id
            );
            ApiError::identity_not_found("User not found")
        })?;

    request.extensions_mut().insert(CurrentUser {
        id: user.id,
        email: user.email,
        display_name: user.display_name,
    });

    Ok(next.run(request).await)
}
