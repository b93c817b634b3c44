//! Operator console endpoints. Every route here is gated on the admin role.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::auth::{AuthRouterExt, AuthUser};
use crate::errors::ServiceError;
use crate::models::{OperationalSnapshot, Order, OrderStatus, Role, UserProfile};
use crate::services::admin::{AdminOrderView, OrderFilter};
use crate::AppState;

use super::ApiResponse;

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/admin/orders", get(list_orders))
        .route("/admin/orders/snapshot", get(snapshot))
        .route("/admin/orders/:id/status", post(set_order_status))
        .route("/admin/users/:id/role", post(set_user_role))
        .with_role(state.auth.clone(), Role::Admin)
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListOrdersQuery {
    /// all | pending | delivery | completed
    #[serde(default)]
    pub filter: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/orders",
    params(ListOrdersQuery),
    responses(
        (status = 200, description = "Orders for the console", body = [AdminOrderView]),
        (status = 403, description = "Caller is not an operator")
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub(crate) async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<ListOrdersQuery>,
) -> Result<Json<ApiResponse<Vec<AdminOrderView>>>, ServiceError> {
    let filter = match query.filter.as_deref() {
        Some(raw) => raw.parse::<OrderFilter>()?,
        None => OrderFilter::All,
    };
    let views = state.admin.list_orders(filter).await?;
    Ok(Json(ApiResponse::ok(views)))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/orders/snapshot",
    responses((status = 200, description = "Operational stats", body = OperationalSnapshot)),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub(crate) async fn snapshot(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<OperationalSnapshot>>, ServiceError> {
    let snapshot = state.admin.snapshot().await?;
    Ok(Json(ApiResponse::ok(snapshot)))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetOrderStatusRequest {
    pub status: OrderStatus,
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/orders/{id}/status",
    params(("id" = Uuid, Path, description = "Order id")),
    request_body = SetOrderStatusRequest,
    responses(
        (status = 200, description = "Order transitioned", body = Order),
        (status = 400, description = "Illegal transition"),
        (status = 409, description = "Order changed concurrently")
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub(crate) async fn set_order_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetOrderStatusRequest>,
) -> Result<Json<ApiResponse<Order>>, ServiceError> {
    let order = state
        .admin
        .set_order_status(id, payload.status, &user)
        .await?;
    Ok(Json(ApiResponse::ok_with_message(order, "Order updated")))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetRoleRequest {
    pub role: Role,
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/users/{id}/role",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = SetRoleRequest,
    responses(
        (status = 200, description = "Role updated", body = UserProfile),
        (status = 404, description = "No such user")
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub(crate) async fn set_user_role(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetRoleRequest>,
) -> Result<Json<ApiResponse<UserProfile>>, ServiceError> {
    let profile = state.users.set_role(&user, id, payload.role).await?;
    Ok(Json(ApiResponse::ok(profile)))
}
