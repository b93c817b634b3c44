//! Key layout for the flat record-store namespace.
//!
//! Every entity class gets its own prefix so list operations stay scoped to
//! one prefix scan. Index keys (`order_ix:*`) are maintained by the order
//! repository and hold only the order id, never a full record.

use uuid::Uuid;

use crate::models::OrderStatus;

pub fn user(id: Uuid) -> String {
    format!("user:{id}")
}

pub fn product(seller_id: Uuid, product_id: Uuid) -> String {
    format!("product:{seller_id}:{product_id}")
}

pub fn product_prefix(seller_id: Uuid) -> String {
    format!("product:{seller_id}:")
}

pub const ALL_PRODUCTS_PREFIX: &str = "product:";

pub fn order(id: Uuid) -> String {
    format!("order:{id}")
}

pub const ALL_ORDERS_PREFIX: &str = "order:";

pub fn order_status_index(status: OrderStatus, id: Uuid) -> String {
    format!("order_ix:status:{status}:{id}")
}

pub fn order_status_index_prefix(status: OrderStatus) -> String {
    format!("order_ix:status:{status}:")
}

pub fn order_buyer_index(buyer_id: Uuid, id: Uuid) -> String {
    format!("order_ix:buyer:{buyer_id}:{id}")
}

pub fn order_buyer_index_prefix(buyer_id: Uuid) -> String {
    format!("order_ix:buyer:{buyer_id}:")
}

pub fn order_summary(buyer_id: Uuid, order_id: Uuid) -> String {
    format!("order_summary:{buyer_id}:{order_id}")
}

pub fn return_record(order_id: Uuid) -> String {
    format!("return:{order_id}")
}

pub fn refund_request(order_id: Uuid, request_id: Uuid) -> String {
    format!("refund:{order_id}:{request_id}")
}

pub fn refund_prefix(order_id: Uuid) -> String {
    format!("refund:{order_id}:")
}

pub fn cart_item(buyer_id: Uuid, product_id: Uuid) -> String {
    format!("cart:{buyer_id}:{product_id}")
}

pub fn cart_prefix(buyer_id: Uuid) -> String {
    format!("cart:{buyer_id}:")
}

pub fn review(seller_id: Uuid, review_id: Uuid) -> String {
    format!("review:{seller_id}:{review_id}")
}

pub fn review_prefix(seller_id: Uuid) -> String {
    format!("review:{seller_id}:")
}

pub const ALL_USERS_PREFIX: &str = "user:";
