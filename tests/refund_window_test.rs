//! Refund window boundaries and amount validation over the HTTP surface.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use rust_decimal_macros::dec;
use serde_json::json;

use adeylink_api::models::{Order, OrderStatus};
use adeylink_api::repositories::OrderRepository;

use common::{expect_status, TestApp};

/// Places an order, delivers it, then backdates `delivered_at` by `age`.
async fn delivered_order_aged(app: &TestApp, age: Duration) -> Order {
    let product = app.seed_product(dec!(10.00)).await;
    let response = app
        .post(
            "/api/v1/orders/cod",
            &app.buyer.token,
            json!({
                "product_id": product.id,
                "seller_id": product.seller_id,
                "quantity": 2,
                "delivery_address": "Bole, Addis Ababa",
                "delivery_phone": "+251911223344",
            }),
        )
        .await;
    let body = expect_status(response, StatusCode::CREATED).await;
    let order_id = body["data"]["id"].as_str().unwrap().to_string();

    for status in ["confirmed", "preparing", "out_for_delivery", "delivered"] {
        app.post(
            &format!("/api/v1/admin/orders/{order_id}/status"),
            &app.admin.token,
            json!({ "status": status }),
        )
        .await;
    }

    let repo = OrderRepository::new(Arc::clone(&app.store));
    let order = repo
        .find_by_id(order_id.parse().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(order.status, OrderStatus::Delivered);

    let mut aged = order.clone();
    aged.delivered_at = Some(Utc::now() - age);
    repo.update_versioned(order.version, aged).await.unwrap()
}

#[tokio::test]
async fn refund_is_accepted_exactly_at_the_boundary() {
    let app = TestApp::spawn().await;
    // just under two days; the request lands inside the inclusive window
    let order = delivered_order_aged(&app, Duration::days(2) - Duration::seconds(5)).await;

    let response = app
        .post(
            "/api/v1/refund-requests",
            &app.buyer.token,
            json!({
                "order_id": order.id,
                "reason": "quality_issue",
                "refund_type": "full",
            }),
        )
        .await;
    let body = expect_status(response, StatusCode::CREATED).await;
    assert_eq!(body["data"]["refund_amount"], json!("20.00"));
}

#[tokio::test]
async fn refund_is_refused_after_the_window() {
    let app = TestApp::spawn().await;
    let order = delivered_order_aged(&app, Duration::days(2) + Duration::minutes(1)).await;

    let response = app
        .post(
            "/api/v1/refund-requests",
            &app.buyer.token,
            json!({
                "order_id": order.id,
                "reason": "changed_mind",
                "refund_type": "full",
            }),
        )
        .await;
    let body = expect_status(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(body["error"], json!("refund_window_expired"));
}

#[tokio::test]
async fn partial_refund_amount_must_fit_the_total() {
    let app = TestApp::spawn().await;
    let order = delivered_order_aged(&app, Duration::hours(1)).await;

    // over the 20.00 total
    let response = app
        .post(
            "/api/v1/refund-requests",
            &app.buyer.token,
            json!({
                "order_id": order.id,
                "reason": "wrong_item",
                "refund_type": "partial",
                "refund_amount": "25.00",
            }),
        )
        .await;
    let body = expect_status(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(body["error"], json!("validation_error"));

    // partial without an amount is also rejected
    let response = app
        .post(
            "/api/v1/refund-requests",
            &app.buyer.token,
            json!({
                "order_id": order.id,
                "reason": "wrong_item",
                "refund_type": "partial",
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .post(
            "/api/v1/refund-requests",
            &app.buyer.token,
            json!({
                "order_id": order.id,
                "reason": "wrong_item",
                "refund_type": "partial",
                "refund_amount": "7.50",
            }),
        )
        .await;
    let body = expect_status(response, StatusCode::CREATED).await;
    assert_eq!(body["data"]["refund_amount"], json!("7.50"));
}

#[tokio::test]
async fn undelivered_orders_are_not_refundable() {
    let app = TestApp::spawn().await;
    let product = app.seed_product(dec!(10.00)).await;

    let response = app
        .post(
            "/api/v1/orders/cod",
            &app.buyer.token,
            json!({
                "product_id": product.id,
                "seller_id": product.seller_id,
                "quantity": 1,
                "delivery_address": "Bole, Addis Ababa",
                "delivery_phone": "+251911223344",
            }),
        )
        .await;
    let body = expect_status(response, StatusCode::CREATED).await;
    let order_id = body["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .post(
            "/api/v1/refund-requests",
            &app.buyer.token,
            json!({
                "order_id": order_id,
                "reason": "changed_mind",
                "refund_type": "full",
            }),
        )
        .await;
    let body = expect_status(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(body["error"], json!("validation_error"));
}
