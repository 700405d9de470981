//! Fixtures for handler tests.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request},
    response::Response,
    Router,
};
use entities::{Account, Zone};
use forms::SignUpForm;
use study_store::{MemoryStudyStore, StudyStore};
use tower::ServiceExt;

use crate::config::Config;
use crate::state::AppState;
use crate::{create_app, create_state};

pub const TEST_SECRET: &str = "test-secret-key-must-be-long-enough-for-security";

/// A router over a fresh store holding the account `gyuwon` and the zone
/// `Zone A(Zone B)/Zone C`.
pub struct TestApp {
    pub app: Router,
    pub state: Arc<AppState<MemoryStudyStore>>,
    pub account: Account,
    pub token: String,
    pub zone: Zone,
}

impl TestApp {
    pub async fn new() -> Self {
        let state = create_state(Config::new(TEST_SECRET), MemoryStudyStore::new());
        let account = state
            .accounts()
            .make_account(&SignUpForm {
                nickname: "gyuwon".to_string(),
                email: "google@google.com".to_string(),
                password: "123456789".to_string(),
                password_repeat: "123456789".to_string(),
            })
            .await
            .unwrap();
        let zone = state
            .store
            .create_zone(Zone::new("Zone A", "Zone B", "Zone C"))
            .await
            .unwrap();
        let token = state
            .jwt_manager
            .generate_token(account.id, &account.nickname)
            .unwrap();
        let app = create_app(Arc::clone(&state));

        Self {
            app,
            state,
            account,
            token,
            zone,
        }
    }

    /// Creates another account and returns it with its token.
    pub async fn another_account(&self, nickname: &str) -> (Account, String) {
        let account = self
            .state
            .store
            .create_account(Account::new(nickname, format!("{nickname}@example.com"), "hash"))
            .await
            .unwrap();
        let token = self
            .state
            .jwt_manager
            .generate_token(account.id, &account.nickname)
            .unwrap();
        (account, token)
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.app.clone().oneshot(request).await.unwrap()
    }

    /// Sends a bodiless request as `gyuwon`.
    pub async fn call(&self, method: Method, uri: &str) -> Response {
        self.send(empty_request(method, uri, Some(&self.token))).await
    }

    /// Reloads `gyuwon` from the store.
    pub async fn reload_account(&self) -> Account {
        self.state
            .store
            .get_account(self.account.id)
            .await
            .unwrap()
            .unwrap()
    }
}

fn builder(method: Method, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match token {
        Some(token) => builder.header(header::AUTHORIZATION, format!("Bearer {token}")),
        None => builder,
    }
}

pub fn empty_request(method: Method, uri: &str, token: Option<&str>) -> Request<Body> {
    builder(method, uri, token).body(Body::empty()).unwrap()
}

pub fn json_request(method: Method, uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    builder(method, uri, token)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn form_request(uri: &str, token: &str, params: &[(&str, &str)]) -> Request<Body> {
    let body = params
        .iter()
        .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");

    builder(Method::POST, uri, Some(token))
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
