//! Shared harness for the HTTP integration tests: an in-memory app with
//! seeded admin/seller/buyer identities and real bearer tokens.
#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, Response, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use serde_json::Value;
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

use adeylink_api::config::AppConfig;
use adeylink_api::events::{self, EventSender};
use adeylink_api::models::{Location, Product, Role, UserProfile};
use adeylink_api::services::FixedEstimator;
use adeylink_api::store::{self, keys, MemoryStore, RecordStore};
use adeylink_api::{app_router, AppState};

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: Arc<dyn RecordStore>,
    pub admin: TestUser,
    pub seller: TestUser,
    pub buyer: TestUser,
}

pub struct TestUser {
    pub id: Uuid,
    pub token: String,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
        let config = AppConfig {
            jwt_secret: "integration-test-secret".into(),
            ..AppConfig::default()
        };

        let (tx, rx) = mpsc::channel(256);
        tokio::spawn(events::process_events(rx));

        let state = AppState::new(
            Arc::new(config),
            Arc::clone(&store),
            Arc::new(FixedEstimator(Duration::minutes(45))),
            EventSender::new(tx),
        );
        let router = app_router(state.clone());

        let admin = Self::seed_user(&state, store.as_ref(), Role::Admin, "ops@example.com").await;
        let seller =
            Self::seed_user(&state, store.as_ref(), Role::Seller, "seller@example.com").await;
        let buyer =
            Self::seed_user(&state, store.as_ref(), Role::Buyer, "buyer@example.com").await;

        Self {
            router,
            state,
            store,
            admin,
            seller,
            buyer,
        }
    }

    async fn seed_user(
        state: &AppState,
        store: &dyn RecordStore,
        role: Role,
        email: &str,
    ) -> TestUser {
        let id = Uuid::new_v4();
        let profile = UserProfile {
            id,
            email: email.into(),
            name: format!("{role} user"),
            phone: "+251911000000".into(),
            bio: String::new(),
            location: Location {
                city: "Addis Ababa".into(),
                lat: 9.03,
                lng: 38.74,
            },
            role,
            created_at: Utc::now(),
        };
        store::set_typed(store, &keys::user(id), &profile)
            .await
            .expect("seed profile");
        let token = state
            .auth
            .issue_token(id, Duration::hours(1))
            .expect("issue token");
        TestUser { id, token }
    }

    pub async fn seed_product(&self, price: Decimal) -> Product {
        let product = Product {
            id: Uuid::new_v4(),
            seller_id: self.seller.id,
            title: "Roasted coffee, 500g".into(),
            description: String::new(),
            price,
            category: "food".into(),
            images: vec![],
            available: true,
            created_at: Utc::now(),
        };
        store::set_typed(
            self.store.as_ref(),
            &keys::product(product.seller_id, product.id),
            &product,
        )
        .await
        .expect("seed product");
        product
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .expect("build request"),
            None => builder.body(Body::empty()).expect("build request"),
        };
        self.router.clone().oneshot(request).await.expect("run request")
    }

    pub async fn get(&self, uri: &str, token: &str) -> Response<Body> {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> Response<Body> {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn post_empty(&self, uri: &str, token: &str) -> Response<Body> {
        self.request(Method::POST, uri, Some(token), None).await
    }
}

pub async fn response_json(response: Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("parse json body")
}

pub async fn expect_status(response: Response<Body>, expected: StatusCode) -> Value {
    let status = response.status();
    let body = response_json(response).await;
    assert_eq!(status, expected, "unexpected status, body: {body}");
    body
}
