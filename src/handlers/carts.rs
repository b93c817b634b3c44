//! Cart endpoints. All routes act on the caller's own cart.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::auth::{AuthRouterExt, AuthUser};
use crate::errors::ServiceError;
use crate::models::CartItem;
use crate::services::carts::CartEntry;
use crate::AppState;

use super::{validate, ApiResponse};

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/cart", get(get_cart))
        .route("/cart/items", post(add_item))
        .route("/cart/items/:product_id", delete(remove_item))
        .with_auth(state.auth.clone())
}

#[utoipa::path(
    get,
    path = "/api/v1/cart",
    responses((status = 200, description = "The caller's cart", body = [CartEntry])),
    security(("bearer_auth" = [])),
    tag = "cart"
)]
pub(crate) async fn get_cart(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<Vec<CartEntry>>>, ServiceError> {
    let cart = state.carts.get_cart(&user).await?;
    Ok(Json(ApiResponse::ok(cart)))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddCartItemRequest {
    pub product_id: Uuid,
    pub seller_id: Uuid,
    #[validate(range(min = 1))]
    pub quantity: u32,
}

#[utoipa::path(
    post,
    path = "/api/v1/cart/items",
    request_body = AddCartItemRequest,
    responses(
        (status = 201, description = "Item added", body = CartItem),
        (status = 404, description = "No such product")
    ),
    security(("bearer_auth" = [])),
    tag = "cart"
)]
pub(crate) async fn add_item(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<AddCartItemRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CartItem>>), ServiceError> {
    validate(&payload)?;
    let item = state
        .carts
        .add_item(&user, payload.seller_id, payload.product_id, payload.quantity)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(item))))
}

#[utoipa::path(
    delete,
    path = "/api/v1/cart/items/{product_id}",
    params(("product_id" = Uuid, Path, description = "Product id")),
    responses((status = 204, description = "Item removed")),
    security(("bearer_auth" = [])),
    tag = "cart"
)]
pub(crate) async fn remove_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.carts.remove_item(&user, product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
