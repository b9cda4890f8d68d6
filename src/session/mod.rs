use axum::http::{header, HeaderMap};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config;

/// Name of the HTTP-only session cookie set at sign-in.
pub const SESSION_COOKIE: &str = "token";

/// Signed session claims. The internal user id travels in `sub`; everything
/// else about the principal is re-resolved from the store on each request.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: Uuid) -> Self {
        let now = Utc::now();
        let ttl_hours = config::config().security.session_ttl_hours;
        let exp = (now + Duration::hours(ttl_hours as i64)).timestamp();

        Self {
            sub: user_id,
            exp,
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session token generation error: {0}")]
    TokenGeneration(String),
    #[error("invalid session token: {0}")]
    InvalidToken(String),
    #[error("session secret is not configured")]
    InvalidSecret,
}

/// Sign a session token for the given user id.
pub fn issue(user_id: Uuid) -> Result<String, SessionError> {
    let secret = &config::config().security.session_secret;

    if secret.is_empty() {
        return Err(SessionError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    let header = Header::default();

    encode(&header, &Claims::new(user_id), &encoding_key)
        .map_err(|e| SessionError::TokenGeneration(e.to_string()))
}

/// Verify a session token's signature and expiry and return its claims.
pub fn verify(token: &str) -> Result<Claims, SessionError> {
    let secret = &config::config().security.session_secret;

    if secret.is_empty() {
        return Err(SessionError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| SessionError::InvalidToken(e.to_string()))?;

    Ok(token_data.claims)
}

/// Pull the session token out of the request's Cookie header, if present.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;

    raw.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.to_string())
    })
}

/// Build the Set-Cookie value carrying a freshly issued session token.
pub fn session_cookie(token: &str) -> String {
    let security = &config::config().security;
    let max_age = security.session_ttl_hours * 3600;

    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, token, max_age
    );
    if security.cookie_secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Build the Set-Cookie value that clears the session cookie on sign-out.
pub fn clear_session_cookie() -> String {
    let mut cookie = format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
        SESSION_COOKIE
    );
    if config::config().security.cookie_secure {
        cookie.push_str("; Secure");
    }
    cookie
}
