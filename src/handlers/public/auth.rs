use axum::{
    extract::State,
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;
use crate::identity;
use crate::middleware::ApiResponse;
use crate::provider::IdentityProvider;
use crate::session;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    /// Opaque credential from the identity provider (e.g. a Google ID token)
    pub credential: String,
}

/// POST /auth/session - Exchange a verified provider credential for a session
///
/// Verifies the credential with the identity provider, resolves (or lazily
/// creates) the internal User, and sets the HTTP-only session cookie. Any
/// store fault blocks sign-in rather than issuing a session.
pub async fn session_create(
    State(state): State<AppState>,
    Json(payload): Json<SignInRequest>,
) -> Result<Response, ApiError> {
    let profile = state.provider.verify(&payload.credential).await?;

    let outcome = identity::resolve_sign_in(state.users.as_ref(), &profile).await?;
    tracing::info!(
        "Sign-in for user {} (identity {})",
        outcome.user().id,
        outcome.label()
    );

    let user = outcome.into_user();
    let token = session::issue(user.id)?;
    let cookie = session::session_cookie(&token);

    let mut response = ApiResponse::success(json!({ "user": user })).into_response();
    response.headers_mut().insert(
        header::SET_COOKIE,
        HeaderValue::from_str(&cookie)
            .map_err(|_| ApiError::internal_server_error("Failed to establish session"))?,
    );

    Ok(response)
}

/// DELETE /auth/session - Sign out by clearing the session cookie
///
/// Sessions are stateless signed tokens, so sign-out is purely a cookie
/// removal; there is no server-side revocation list.
pub async fn session_delete() -> Result<Response, ApiError> {
    let cookie = session::clear_session_cookie();

    let mut response =
        ApiResponse::success(json!({ "message": "Signed out" })).into_response();
    response.headers_mut().insert(
        header::SET_COOKIE,
        HeaderValue::from_str(&cookie)
            .map_err(|_| ApiError::internal_server_error("Failed to clear session"))?,
    );

    Ok(response)
}
