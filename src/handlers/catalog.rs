//! Catalog endpoints: listings, seller discovery and reviews.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::auth::{AuthRouterExt, AuthUser};
use crate::errors::ServiceError;
use crate::models::{Location, Product, Review, Role};
use crate::services::catalog::{NewProductInput, SellerRanking};
use crate::AppState;

use super::{validate, ApiResponse};

pub fn routes(state: &AppState) -> Router<AppState> {
    let seller_routes = Router::new()
        .route("/products", post(create_product))
        .with_role(state.auth.clone(), Role::Seller);

    let authed_routes = Router::new()
        .route("/sellers/:id/reviews", post(create_review))
        .with_auth(state.auth.clone());

    // discovery is open to unauthenticated browsing
    Router::new()
        .route("/sellers", get(discover_sellers))
        .route("/sellers/:id/products", get(list_seller_products))
        .route("/sellers/:id/reviews", get(list_reviews))
        .merge(seller_routes)
        .merge(authed_routes)
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 5000))]
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[validate(length(min = 1, max = 100))]
    pub category: String,
    #[serde(default)]
    pub images: Vec<String>,
}

#[utoipa::path(
    post,
    path = "/api/v1/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Listing created", body = Product),
        (status = 403, description = "Caller is not a seller")
    ),
    security(("bearer_auth" = [])),
    tag = "catalog"
)]
pub(crate) async fn create_product(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Product>>), ServiceError> {
    validate(&payload)?;
    let product = state
        .catalog
        .add_product(
            &user,
            NewProductInput {
                title: payload.title,
                description: payload.description,
                price: payload.price,
                category: payload.category,
                images: payload.images,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(product))))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct DiscoverQuery {
    pub category: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[utoipa::path(
    get,
    path = "/api/v1/sellers",
    params(DiscoverQuery),
    responses((status = 200, description = "Sellers ranked by proximity then rating", body = [SellerRanking])),
    tag = "catalog"
)]
pub(crate) async fn discover_sellers(
    State(state): State<AppState>,
    Query(query): Query<DiscoverQuery>,
) -> Result<Json<ApiResponse<Vec<SellerRanking>>>, ServiceError> {
    let near = match (query.lat, query.lng) {
        (Some(lat), Some(lng)) => Some(Location {
            city: String::new(),
            lat,
            lng,
        }),
        _ => None,
    };
    let rankings = state
        .catalog
        .sellers_by_category(&query.category, near.as_ref())
        .await?;
    Ok(Json(ApiResponse::ok(rankings)))
}

#[utoipa::path(
    get,
    path = "/api/v1/sellers/{id}/products",
    params(("id" = Uuid, Path, description = "Seller id")),
    responses((status = 200, description = "The seller's listings", body = [Product])),
    tag = "catalog"
)]
pub(crate) async fn list_seller_products(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<Product>>>, ServiceError> {
    let products = state.catalog.list_seller_products(id).await?;
    Ok(Json(ApiResponse::ok(products)))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateReviewRequest {
    #[validate(range(min = 1, max = 5))]
    pub rating: u8,
    #[validate(length(max = 2000))]
    #[serde(default)]
    pub comment: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/sellers/{id}/reviews",
    params(("id" = Uuid, Path, description = "Seller id")),
    request_body = CreateReviewRequest,
    responses((status = 201, description = "Review recorded", body = Review)),
    security(("bearer_auth" = [])),
    tag = "catalog"
)]
pub(crate) async fn create_review(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Review>>), ServiceError> {
    validate(&payload)?;
    let review = state
        .catalog
        .add_review(&user, id, payload.rating, payload.comment)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(review))))
}

#[utoipa::path(
    get,
    path = "/api/v1/sellers/{id}/reviews",
    params(("id" = Uuid, Path, description = "Seller id")),
    responses((status = 200, description = "Reviews for the seller", body = [Review])),
    tag = "catalog"
)]
pub(crate) async fn list_reviews(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<Review>>>, ServiceError> {
    let reviews = state.catalog.list_reviews(id).await?;
    Ok(Json(ApiResponse::ok(reviews)))
}
