#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use tower::ServiceExt;
use wsp_api::{auth::hash_password, AppState, AuthSettings};
use wsp_core::{MeasurementStore, MemoryStore, Role, UserRecord, UserStore};

pub const PASSWORD: &str = "123456";

pub fn settings() -> AuthSettings {
    AuthSettings {
        jwt_secret: "integration-secret".into(),
        token_ttl_secs: 3600,
        hash_cost: 4,
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
}

/// Router over an in-memory store seeded with a `dashboard` reader and a
/// `sensors` writer
pub async fn app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    for (login, role) in [("dashboard", Role::Read), ("sensors", Role::Write)] {
        store
            .create_user(&UserRecord {
                login: login.into(),
                password_hash: hash_password(PASSWORD.into(), 4).await.unwrap(),
                role,
            })
            .await
            .unwrap();
    }

    let router = router_with(store.clone(), store.clone());
    TestApp { router, store }
}

pub fn router_with(store: Arc<dyn MeasurementStore>, users: Arc<dyn UserStore>) -> Router {
    let state = AppState::new(store, users, &settings()).unwrap();
    wsp_api::build_router(Arc::new(state))
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub text: String,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.text).unwrap()
    }
}

pub async fn send(router: &Router, request: Request<Body>) -> TestResponse {
    let res = router.clone().oneshot(request).await.unwrap();
    let status = res.status();
    let headers = res.headers().clone();
    let body = to_bytes(res.into_body(), 1024 * 1024).await.unwrap();
    TestResponse {
        status,
        headers,
        text: String::from_utf8(body.to_vec()).unwrap(),
    }
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    post_raw(uri, token, body.to_string())
}

pub fn post_raw(uri: &str, token: Option<&str>, body: String) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body)).unwrap()
}

pub async fn login(router: &Router, login: &str) -> String {
    let res = send(
        router,
        post_json(
            "/auth",
            None,
            serde_json::json!({ "login": login, "password": PASSWORD }),
        ),
    )
    .await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.text);
    res.json()["access_token"].as_str().unwrap().to_string()
}
