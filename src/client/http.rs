use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use super::cache::CachedTodo;
use super::mutation::TodoApi;
use super::ClientError;
use crate::session::SESSION_COOKIE;

/// HTTP implementation of the task API, speaking the server's
/// `{"success": true, "data": …}` envelope and carrying the session
/// cookie on every request.
pub struct HttpTodoApi {
    http: reqwest::Client,
    base_url: String,
    cookie: String,
}

impl HttpTodoApi {
    pub fn new(base_url: impl Into<String>, session_token: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            cookie: format!("{}={}", SESSION_COOKIE, session_token),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = request
            .header(reqwest::header::COOKIE, &self.cookie)
            .send()
            .await?;

        unwrap_envelope(response).await
    }
}

/// Unwrap the success envelope, or surface the server's error message.
pub(crate) async fn unwrap_envelope<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ClientError> {
    let status = response.status();
    let body: Value = response
        .json()
        .await
        .map_err(|e| ClientError::Decode(e.to_string()))?;

    if !status.is_success() {
        let message = body
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("request failed")
            .to_string();
        return Err(ClientError::Api {
            status: status.as_u16(),
            message,
        });
    }

    let data = body
        .get("data")
        .cloned()
        .ok_or_else(|| ClientError::Decode("missing data field".to_string()))?;

    serde_json::from_value(data).map_err(|e| ClientError::Decode(e.to_string()))
}

#[async_trait]
impl TodoApi for HttpTodoApi {
    async fn list(&self) -> Result<Vec<CachedTodo>, ClientError> {
        self.send(self.http.get(self.url("/todos"))).await
    }

    async fn create(
        &self,
        title: &str,
        description: Option<&str>,
    ) -> Result<CachedTodo, ClientError> {
        let mut body = json!({ "title": title });
        if let Some(description) = description {
            body["description"] = json!(description);
        }

        self.send(self.http.post(self.url("/todos")).json(&body))
            .await
    }

    async fn set_completed(&self, id: &str, completed: bool) -> Result<CachedTodo, ClientError> {
        self.send(
            self.http
                .put(self.url(&format!("/todos/{}", id)))
                .json(&json!({ "completed": completed })),
        )
        .await
    }

    async fn delete(&self, id: &str) -> Result<(), ClientError> {
        let _: Value = self
            .send(self.http.delete(self.url(&format!("/todos/{}", id))))
            .await?;
        Ok(())
    }
}

/// Exchange a provider credential for a session token via POST
/// /auth/session, returning the signed-in user and the token parsed from
/// the Set-Cookie header.
pub async fn sign_in(
    base_url: &str,
    credential: &str,
) -> Result<(Value, String), ClientError> {
    let http = reqwest::Client::new();
    let url = format!("{}/auth/session", base_url.trim_end_matches('/'));

    let response = http
        .post(&url)
        .json(&json!({ "credential": credential }))
        .send()
        .await?;

    let token = response
        .headers()
        .get(reqwest::header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|cookie| {
            let pair = cookie.split(';').next()?;
            let (name, value) = pair.trim().split_once('=')?;
            (name == SESSION_COOKIE).then(|| value.to_string())
        });

    let user: Value = unwrap_envelope(response).await?;

    let token = token.ok_or_else(|| {
        ClientError::Decode("sign-in response carried no session cookie".to_string())
    })?;

    Ok((user, token))
}
