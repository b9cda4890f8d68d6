use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::error::ApiError;
use crate::session;

/// Verified session context extracted from the cookie. Carries only the
/// user id claim; the identity layer turns it into a full principal.
#[derive(Clone, Debug)]
pub struct SessionUser {
    pub user_id: Uuid,
}

/// First half of the authorization gate: validates the session cookie and
/// injects `SessionUser` into the request. Requests without a valid,
/// unexpired session never reach the layers below.
pub async fn session_auth(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = session::token_from_headers(&headers)
        .ok_or_else(|| ApiError::unauthorized("Missing session cookie"))?;

    let claims = session::verify(&token).map_err(|e| {
        tracing::debug!("Session rejected: {}", e);
        ApiError::unauthorized("Invalid or expired session")
    })?;

    request.extensions_mut().insert(SessionUser {
        user_id: claims.sub,
    });

    Ok(next.run(request).await)
}
