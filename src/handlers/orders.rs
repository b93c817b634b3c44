//! Buyer-facing order endpoints: checkout, tracking, cancellation, returns
//! and refund requests.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::auth::{AuthRouterExt, AuthUser};
use crate::errors::ServiceError;
use crate::models::{Order, RefundReason, RefundRequest, RefundType, ReturnRecord};
use crate::services::{NewOrderInput, RefundRequestInput};
use crate::AppState;

use super::{validate, ApiResponse};

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/orders/cod", post(create_cod_order))
        .route("/orders", get(list_my_orders))
        .route("/orders/:id", get(get_order))
        .route("/orders/:id/cancel", post(cancel_order))
        .route("/orders/:id/return", post(request_return))
        .route("/refund-requests", post(submit_refund_request))
        .with_auth(state.auth.clone())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCodOrderRequest {
    pub product_id: Uuid,
    pub seller_id: Uuid,
    #[validate(range(min = 1))]
    pub quantity: u32,
    #[validate(length(min = 1, message = "Delivery address is required"))]
    pub delivery_address: String,
    #[validate(length(min = 1, message = "Delivery phone is required"))]
    pub delivery_phone: String,
    pub delivery_notes: Option<String>,
    pub preferred_delivery_time: Option<DateTime<Utc>>,
}

#[utoipa::path(
    post,
    path = "/api/v1/orders/cod",
    request_body = CreateCodOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = Order),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub(crate) async fn create_cod_order(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateCodOrderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Order>>), ServiceError> {
    validate(&payload)?;
    let order = state
        .orders
        .create_cod_order(
            &user,
            NewOrderInput {
                product_id: payload.product_id,
                seller_id: payload.seller_id,
                quantity: payload.quantity,
                delivery_address: payload.delivery_address,
                delivery_phone: payload.delivery_phone,
                delivery_notes: payload.delivery_notes,
                preferred_delivery_time: payload.preferred_delivery_time,
            },
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message(order, "Order placed")),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders",
    responses((status = 200, description = "The caller's orders", body = [Order])),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub(crate) async fn list_my_orders(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<Vec<Order>>>, ServiceError> {
    let orders = state.orders.list_orders_for_buyer(&user).await?;
    Ok(Json(ApiResponse::ok(orders)))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "The order", body = Order),
        (status = 403, description = "Caller is not a party to the order"),
        (status = 404, description = "No such order")
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub(crate) async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Order>>, ServiceError> {
    let order = state.orders.get_order(id, &user).await?;
    Ok(Json(ApiResponse::ok(order)))
}

#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/cancel",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order cancelled", body = Order),
        (status = 400, description = "Order already dispatched"),
        (status = 409, description = "Order changed concurrently")
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub(crate) async fn cancel_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Order>>, ServiceError> {
    let order = state.orders.cancel_order(id, &user).await?;
    Ok(Json(ApiResponse::ok_with_message(order, "Order cancelled")))
}

#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/return",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Return recorded", body = ReturnRecord),
        (status = 400, description = "Order not delivered yet"),
        (status = 409, description = "Return already requested")
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub(crate) async fn request_return(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ReturnRecord>>, ServiceError> {
    let record = state.orders.request_return(id, &user).await?;
    Ok(Json(ApiResponse::ok_with_message(record, "Return recorded")))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SubmitRefundRequest {
    pub order_id: Uuid,
    pub reason: RefundReason,
    pub refund_type: RefundType,
    pub refund_amount: Option<Decimal>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/v1/refund-requests",
    request_body = SubmitRefundRequest,
    responses(
        (status = 201, description = "Refund request recorded", body = RefundRequest),
        (status = 400, description = "Window expired or invalid amount")
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub(crate) async fn submit_refund_request(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<SubmitRefundRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RefundRequest>>), ServiceError> {
    validate(&payload)?;
    let request = state
        .orders
        .submit_refund_request(
            &user,
            RefundRequestInput {
                order_id: payload.order_id,
                reason: payload.reason,
                refund_type: payload.refund_type,
                refund_amount: payload.refund_amount,
                description: payload.description,
            },
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message(request, "Refund request recorded")),
    ))
}
