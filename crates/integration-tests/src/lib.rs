//! Integration tests for Sokoni.
//!
//! The storefront router is driven in-process against the in-memory
//! backend with `tower::ServiceExt::oneshot` - no sockets, no external
//! services. The session cookie from the last response is carried into
//! the next request, so a `TestContext` behaves like one browser.
//!
//! # Test Categories
//!
//! - `cart_flow` - Cart aggregation and mutation through the API
//! - `seller_dashboard` - Profile merge and product CRUD
//! - `checkout_links` - Per-seller checkout handoff

// Test harness: unwraps are assertions here.
#![allow(clippy::unwrap_used)]
#![allow(clippy::missing_panics_doc)]

use std::net::IpAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

use sokoni_backend::{Backend, BackendConfig, DocumentRef, MemoryBackend, WriteMode, collections};
use sokoni_core::catalog::{Catalog, Product, SellerProfile};
use sokoni_core::{Money, PhoneNumber, ProductId, SellerName};
use sokoni_storefront::config::StorefrontConfig;
use sokoni_storefront::state::AppState;

/// A response, digested for assertions.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub json: Value,
}

impl TestResponse {
    /// The `Location` header, for redirect assertions.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
    }
}

/// One simulated browser against an in-process storefront.
pub struct TestContext {
    app: Router,
    backend: Arc<MemoryBackend>,
    cookie: Option<String>,
}

impl TestContext {
    /// Build a storefront over a fresh in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        let backend = Arc::new(MemoryBackend::new());
        let state = AppState::new(test_config(), backend.clone());
        Self {
            app: sokoni_storefront::app(state),
            backend,
            cookie: None,
        }
    }

    /// Direct handle to the backend, for seeding and assertions.
    #[must_use]
    pub fn backend(&self) -> &Arc<MemoryBackend> {
        &self.backend
    }

    /// Send a request, carrying the session cookie of the last response.
    pub async fn request(
        &mut self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie.clone());
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let cookie = set_cookie
                .to_str()
                .unwrap()
                .split(';')
                .next()
                .unwrap()
                .to_owned();
            self.cookie = Some(cookie);
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            headers,
            json,
        }
    }

    pub async fn get(&mut self, path: &str) -> TestResponse {
        self.request(Method::GET, path, None).await
    }

    pub async fn post(&mut self, path: &str, body: Value) -> TestResponse {
        self.request(Method::POST, path, Some(body)).await
    }

    pub async fn put(&mut self, path: &str, body: Value) -> TestResponse {
        self.request(Method::PUT, path, Some(body)).await
    }

    pub async fn patch(&mut self, path: &str, body: Value) -> TestResponse {
        self.request(Method::PATCH, path, Some(body)).await
    }

    pub async fn delete(&mut self, path: &str) -> TestResponse {
        self.request(Method::DELETE, path, None).await
    }

    /// Register an account and leave the session signed in.
    pub async fn sign_up(&mut self, email: &str) {
        let response = self
            .post(
                "/auth/register",
                serde_json::json!({"email": email, "password": "correct-horse-battery"}),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.json);
    }

    /// Seed one seller with a profile and products, bypassing the API.
    ///
    /// Returns the generated product ids in fixture order.
    pub async fn seed_seller(
        &self,
        seller_id: &str,
        shop_name: &str,
        whatsapp: Option<&str>,
        products: &[(&str, i64)],
    ) -> Vec<ProductId> {
        let profile = SellerProfile {
            shop_name: SellerName::new(shop_name),
            whatsapp: whatsapp.map(|raw| PhoneNumber::parse(raw).unwrap()),
            description: String::new(),
            location: String::new(),
            profile_image: None,
            banner_image: None,
        };
        self.backend
            .write(
                &DocumentRef::new(collections::SELLERS, seller_id),
                serde_json::to_value(&profile).unwrap(),
                WriteMode::Replace,
            )
            .await
            .unwrap();

        let mut catalog = Catalog::default();
        let mut ids = Vec::new();
        for (name, price) in products {
            let product = Product {
                id: ProductId::generate(),
                name: (*name).to_owned(),
                price: Money::new(*price),
                description: String::new(),
                image: None,
            };
            ids.push(product.id.clone());
            catalog.add(product);
        }
        self.backend
            .write(
                &DocumentRef::new(collections::CATALOGS, seller_id),
                catalog.to_body().unwrap(),
                WriteMode::Replace,
            )
            .await
            .unwrap();

        ids
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

fn test_config() -> StorefrontConfig {
    StorefrontConfig {
        host: IpAddr::from([127, 0, 0, 1]),
        port: 0,
        base_url: "http://localhost:3000".to_owned(),
        session_secret: SecretString::from("uP8#kD2!rT6@wQ9$zX4%vB7^nM1&jH5*"),
        currency: "UGX".to_owned(),
        chat_domain: "wa.me".to_owned(),
        backend: BackendConfig::Memory,
        sentry_dsn: None,
        sentry_environment: None,
    }
}
