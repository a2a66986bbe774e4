//! Test harness: the full router over in-memory stores.
//!
//! Requests go through the real middleware and routes via `oneshot`, so
//! status codes, cookies and error envelopes are exactly what clients see.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use nextplay_core::domains::users::models::User;
use nextplay_core::kernel::memory::{memory_deps, MemoryBackend};
use nextplay_core::server::build_app;

pub struct TestHarness {
    pub backend: MemoryBackend,
    pub app: Router,
}

impl TestHarness {
    pub fn new() -> Self {
        let backend = memory_deps("test-secret", "test-issuer", "http://localhost:3000");
        let app = build_app(
            Arc::new(backend.deps.clone()),
            &[],
            false,
            "/tmp/nextplay-test-uploads",
        );
        Self { backend, app }
    }

    pub fn token_for(&self, user: &User) -> String {
        self.backend
            .deps
            .jwt
            .create_token(user)
            .expect("failed to mint test token")
    }

    /// Fire one request through the router. The token rides the session
    /// cookie, matching the browser client.
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::COOKIE, format!("token={token}"));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("failed to build request");

        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("router errored");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("failed to read body")
            .to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, json)
    }

    /// Raw variant for responses that are not JSON (CSV exports) or where
    /// headers matter (cookies).
    pub async fn request_raw(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, axum::http::HeaderMap, String) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::COOKIE, format!("token={token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("failed to build request");

        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("router errored");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("failed to read body")
            .to_bytes();
        (status, headers, String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Pull the one-time token out of the last emailed link for `email`.
    pub fn last_emailed_token(&self, email: &str) -> Option<String> {
        self.backend
            .mailer
            .sent_to(email)
            .into_iter()
            .rev()
            .find_map(|mail| mail.link)
            .and_then(|link| {
                link.split_once("token=")
                    .map(|(_, token)| token.to_string())
            })
    }
}
