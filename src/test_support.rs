//! Router-level test harness: a `MemoryStore`-backed app plus helpers that
//! sign tokens and send JSON requests.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use crate::{app::build_app, auth::jwt::JwtKeys, state::AppState, store::memory::MemoryStore};

pub struct TestUser {
    pub id: Uuid,
    pub token: String,
}

pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub state: AppState,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::fake(store.clone());
        let router = build_app(state.clone());
        Self {
            store,
            state,
            router,
        }
    }

    fn keys(&self) -> JwtKeys {
        JwtKeys::new(&self.state.config.auth)
    }

    /// Seeds a profile row and returns a signed token for it.
    pub async fn user(&self, name: &str, username: &str) -> TestUser {
        let profile = self.store.add_user(name, username).await;
        let email = profile.email.clone().unwrap_or_default();
        TestUser {
            id: profile.id,
            token: self.keys().sign(profile.id, &email, None),
        }
    }

    /// A token for an id with no profile row behind it.
    pub fn token_only(&self, email: &str, metadata: Option<Value>) -> TestUser {
        let id = Uuid::new_v4();
        TestUser {
            id,
            token: self.keys().sign(id, email, metadata),
        }
    }

    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let res = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("router is infallible");
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX)
            .await
            .expect("read body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, body)
    }

    async fn request(
        &self,
        method: &str,
        user: &TestUser,
        path: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder()
            .method(method)
            .uri(path)
            .header("authorization", format!("Bearer {}", user.token));
        let req = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("build request");
        self.send(req).await
    }

    pub async fn get(&self, user: &TestUser, path: &str) -> (StatusCode, Value) {
        self.request("GET", user, path, None).await
    }

    pub async fn post(&self, user: &TestUser, path: &str, body: Value) -> (StatusCode, Value) {
        self.request("POST", user, path, Some(body)).await
    }

    pub async fn put(&self, user: &TestUser, path: &str, body: Value) -> (StatusCode, Value) {
        self.request("PUT", user, path, Some(body)).await
    }

    pub async fn patch(&self, user: &TestUser, path: &str, body: Value) -> (StatusCode, Value) {
        self.request("PATCH", user, path, Some(body)).await
    }

    pub async fn delete(&self, user: &TestUser, path: &str) -> (StatusCode, Value) {
        self.request("DELETE", user, path, None).await
    }

    pub async fn anonymous_get(&self, path: &str) -> (StatusCode, Value) {
        let req = Request::get(path).body(Body::empty()).expect("build request");
        self.send(req).await
    }
}
