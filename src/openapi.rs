//! Generated API documentation, served at /swagger-ui.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::errors::ErrorResponse;
use crate::handlers;
use crate::models::{
    CartItem, Location, OperationalSnapshot, Order, OrderStatus, OrderSummary, PaymentMethod,
    Product, RefundReason, RefundRequest, RefundType, ReturnRecord, Review, Role, UserProfile,
};
use crate::services::admin::AdminOrderView;
use crate::services::carts::CartEntry;
use crate::services::catalog::SellerRanking;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::orders::create_cod_order,
        handlers::orders::list_my_orders,
        handlers::orders::get_order,
        handlers::orders::cancel_order,
        handlers::orders::request_return,
        handlers::orders::submit_refund_request,
        handlers::admin::list_orders,
        handlers::admin::snapshot,
        handlers::admin::set_order_status,
        handlers::admin::set_user_role,
        handlers::catalog::create_product,
        handlers::catalog::discover_sellers,
        handlers::catalog::list_seller_products,
        handlers::catalog::create_review,
        handlers::catalog::list_reviews,
        handlers::carts::get_cart,
        handlers::carts::add_item,
        handlers::carts::remove_item,
        handlers::users::get_own_profile,
        handlers::users::upsert_own_profile,
        handlers::users::get_profile,
    ),
    components(schemas(
        Order,
        OrderStatus,
        OrderSummary,
        PaymentMethod,
        OperationalSnapshot,
        RefundReason,
        RefundType,
        RefundRequest,
        ReturnRecord,
        Product,
        Review,
        CartItem,
        CartEntry,
        AdminOrderView,
        SellerRanking,
        UserProfile,
        Location,
        Role,
        ErrorResponse,
        handlers::orders::CreateCodOrderRequest,
        handlers::orders::SubmitRefundRequest,
        handlers::admin::SetOrderStatusRequest,
        handlers::admin::SetRoleRequest,
        handlers::catalog::CreateProductRequest,
        handlers::catalog::CreateReviewRequest,
        handlers::carts::AddCartItemRequest,
        handlers::users::UpsertProfileRequest,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "orders", description = "Cash-on-delivery order lifecycle"),
        (name = "admin", description = "Operator console"),
        (name = "catalog", description = "Listings, discovery and reviews"),
        (name = "cart", description = "Buyer carts"),
        (name = "users", description = "Profiles")
    ),
    info(
        title = "Adeylink Marketplace API",
        description = "Local marketplace with cash-on-delivery fulfilment"
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}
