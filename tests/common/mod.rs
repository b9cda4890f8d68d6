#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::Utc;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use todo_api_rust::database::models::{NewTodo, NewUser, Todo, TodoPatch, User};
use todo_api_rust::database::{StoreError, TodoStore, UserStore};
use todo_api_rust::provider::{IdentityProvider, ProviderError, ProviderProfile};
use todo_api_rust::routes;
use todo_api_rust::session;
use todo_api_rust::state::AppState;

/// In-memory UserStore with the same lookup/link semantics as the
/// Postgres implementation.
#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
    identities: Mutex<Vec<(String, String, Uuid)>>,
}

impl MemoryUserStore {
    pub fn user_count(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    pub fn identity_count(&self) -> usize {
        self.identities.lock().unwrap().len()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned())
    }

    async fn find_by_identity(
        &self,
        provider: &str,
        subject: &str,
    ) -> Result<Option<User>, StoreError> {
        let user_id = self
            .identities
            .lock()
            .unwrap()
            .iter()
            .find(|(p, s, _)| p == provider && s == subject)
            .map(|(_, _, id)| *id);

        match user_id {
            Some(id) => self.find_by_id(id).await,
            None => Ok(None),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn insert(&self, new: NewUser) -> Result<User, StoreError> {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: new.email,
            first_name: new.first_name,
            last_name: new.last_name,
            display_name: new.display_name,
            avatar: new.avatar,
            created_at: now,
            updated_at: now,
        };
        self.users.lock().unwrap().push(user.clone());
        self.identities
            .lock()
            .unwrap()
            .push((new.provider, new.subject, user.id));
        Ok(user)
    }

    async fn link_identity(
        &self,
        user_id: Uuid,
        provider: &str,
        subject: &str,
    ) -> Result<(), StoreError> {
        let mut identities = self.identities.lock().unwrap();
        let exists = identities
            .iter()
            .any(|(p, s, _)| p == provider && s == subject);
        if !exists {
            identities.push((provider.to_string(), subject.to_string(), user_id));
        }
        Ok(())
    }
}

/// In-memory TodoStore mirroring the Postgres ownership-filter and
/// merge-update semantics. Listing returns reverse insertion order, the
/// fake's equivalent of created_at DESC.
#[derive(Default)]
pub struct MemoryTodoStore {
    todos: Mutex<Vec<Todo>>,
}

#[async_trait]
impl TodoStore for MemoryTodoStore {
    async fn find_by_owner(&self, owner: Uuid) -> Result<Vec<Todo>, StoreError> {
        Ok(self
            .todos
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|t| t.owner_id == owner)
            .cloned()
            .collect())
    }

    async fn find_one_by_id_and_owner(
        &self,
        id: Uuid,
        owner: Uuid,
    ) -> Result<Option<Todo>, StoreError> {
        Ok(self
            .todos
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id == id && t.owner_id == owner)
            .cloned())
    }

    async fn insert(&self, owner: Uuid, new: NewTodo) -> Result<Todo, StoreError> {
        let now = Utc::now();
        let todo = Todo {
            id: Uuid::new_v4(),
            owner_id: owner,
            title: new.title,
            description: new.description,
            completed: new.completed,
            created_at: now,
            updated_at: now,
        };
        self.todos.lock().unwrap().push(todo.clone());
        Ok(todo)
    }

    async fn update_by_id_and_owner(
        &self,
        id: Uuid,
        owner: Uuid,
        patch: TodoPatch,
    ) -> Result<Option<Todo>, StoreError> {
        let mut todos = self.todos.lock().unwrap();
        let todo = todos.iter_mut().find(|t| t.id == id && t.owner_id == owner);

        Ok(todo.map(|t| {
            if let Some(title) = patch.title {
                t.title = title;
            }
            if let Some(description) = patch.description {
                t.description = Some(description);
            }
            if let Some(completed) = patch.completed {
                t.completed = completed;
            }
            t.updated_at = Utc::now();
            t.clone()
        }))
    }

    async fn delete_by_id_and_owner(&self, id: Uuid, owner: Uuid) -> Result<bool, StoreError> {
        let mut todos = self.todos.lock().unwrap();
        let before = todos.len();
        todos.retain(|t| !(t.id == id && t.owner_id == owner));
        Ok(todos.len() < before)
    }

    async fn health(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Scripted identity provider: a credential either maps to a canned
/// profile or is rejected.
#[derive(Default)]
pub struct ScriptedProvider {
    profiles: Mutex<HashMap<String, ProviderProfile>>,
}

impl ScriptedProvider {
    pub fn with_profile(self, credential: &str, profile: ProviderProfile) -> Self {
        self.profiles
            .lock()
            .unwrap()
            .insert(credential.to_string(), profile);
        self
    }
}

#[async_trait]
impl IdentityProvider for ScriptedProvider {
    async fn verify(&self, credential: &str) -> Result<ProviderProfile, ProviderError> {
        self.profiles
            .lock()
            .unwrap()
            .get(credential)
            .cloned()
            .ok_or_else(|| ProviderError::Rejected("unknown credential".to_string()))
    }
}

pub fn profile(subject: &str, email: &str) -> ProviderProfile {
    ProviderProfile {
        provider: "google".to_string(),
        subject: subject.to_string(),
        email: email.to_string(),
        given_name: Some("Test".to_string()),
        family_name: Some("User".to_string()),
        full_name: Some("Test User".to_string()),
        picture: None,
    }
}

pub struct TestStores {
    pub users: Arc<MemoryUserStore>,
    pub todos: Arc<MemoryTodoStore>,
}

pub fn test_app() -> (Router, TestStores) {
    test_app_with_provider(ScriptedProvider::default())
}

pub fn test_app_with_provider(provider: ScriptedProvider) -> (Router, TestStores) {
    let users = Arc::new(MemoryUserStore::default());
    let todos = Arc::new(MemoryTodoStore::default());

    let state = AppState {
        users: users.clone(),
        todos: todos.clone(),
        provider: Arc::new(provider),
    };

    (routes::app(state), TestStores { users, todos })
}

/// Create a user directly in the store, bypassing the sign-in flow.
pub async fn seed_user(users: &MemoryUserStore, email: &str, subject: &str) -> User {
    users
        .insert(NewUser {
            email: email.to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            display_name: "Test User".to_string(),
            avatar: None,
            provider: "google".to_string(),
            subject: subject.to_string(),
        })
        .await
        .expect("seed user")
}

/// Session cookie header value for the given user id.
pub fn cookie_for(user_id: Uuid) -> String {
    let token = session::issue(user_id).expect("issue session token");
    format!("{}={}", session::SESSION_COOKIE, token)
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header("cookie", cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn delete(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("DELETE").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header("cookie", cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, cookie: Option<&str>, body: &Value) -> Request<Body> {
    json_request("POST", uri, cookie, body)
}

pub fn put_json(uri: &str, cookie: Option<&str>, body: &Value) -> Request<Body> {
    json_request("PUT", uri, cookie, body)
}

fn json_request(method: &str, uri: &str, cookie: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header("cookie", cookie);
    }
    builder
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

/// Drive one request through the router and decode the JSON body.
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, _headers, value) = send_full(app, request).await;
    (status, value)
}

/// Like `send`, but also returns the response headers for cookie
/// assertions.
pub async fn send_full(
    app: &Router,
    request: Request<Body>,
) -> (StatusCode, axum::http::HeaderMap, Value) {
    let response = app.clone().oneshot(request).await.expect("infallible");
    let status = response.status();
    let headers = response.headers().clone();

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };

    (status, headers, value)
}

/// The Set-Cookie header value of a response, if any.
pub fn set_cookie(headers: &axum::http::HeaderMap) -> Option<&str> {
    headers.get("set-cookie").and_then(|v| v.to_str().ok())
}
