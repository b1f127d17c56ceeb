//! Request helpers - drive the router with `oneshot` and track the session cookie
#![allow(dead_code)] // Test utilities may not all be used in every test

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use axum_extra::extract::cookie::Cookie;
use serde_json::Value;
use tower::ServiceExt; // for `oneshot`

use car_doctor::session::TOKEN_COOKIE;

pub struct TestResponse {
    pub status: StatusCode,
    pub set_cookie: Option<String>,
    pub body: Value,
}

impl TestResponse {
    /// The `token` cookie set by this response, if any
    pub fn token_cookie(&self) -> Option<Cookie<'static>> {
        let raw = self.set_cookie.clone()?;
        let cookie = Cookie::parse(raw).ok()?;
        (cookie.name() == TOKEN_COOKIE).then_some(cookie)
    }
}

/// Minimal cookie-carrying client, mimicking a browser for the `token` cookie
pub struct TestClient {
    app: Router,
    token: Option<String>,
}

impl TestClient {
    pub fn new(app: Router) -> Self {
        Self { app, token: None }
    }

    pub fn with_token(app: Router, token: impl Into<String>) -> Self {
        Self {
            app,
            token: Some(token.into()),
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.send("GET", uri, None).await
    }

    pub async fn post(&mut self, uri: &str, body: Value) -> TestResponse {
        self.send("POST", uri, Some(body)).await
    }

    pub async fn patch(&mut self, uri: &str, body: Value) -> TestResponse {
        self.send("PATCH", uri, Some(body)).await
    }

    pub async fn delete(&mut self, uri: &str) -> TestResponse {
        self.send("DELETE", uri, None).await
    }

    pub async fn login(&mut self, email: &str) -> TestResponse {
        self.post("/jwt", serde_json::json!({ "email": email })).await
    }

    pub async fn logout(&mut self) -> TestResponse {
        self.send("POST", "/logout", None).await
    }

    async fn send(&mut self, method: &str, uri: &str, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = &self.token {
            builder = builder.header(header::COOKIE, format!("{TOKEN_COOKIE}={token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .map(|value| value.to_str().unwrap().to_string());
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        let test_response = TestResponse {
            status,
            set_cookie,
            body,
        };

        // Like a browser, keep whatever the server stored in the cookie;
        // a removal cookie leaves an empty value behind
        if let Some(cookie) = test_response.token_cookie() {
            self.token = Some(cookie.value().to_string());
        }

        test_response
    }
}
