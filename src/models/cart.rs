use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// One line of a buyer's cart, keyed by product so re-adding replaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CartItem {
    pub product_id: Uuid,
    pub seller_id: Uuid,
    pub quantity: u32,
    pub added_at: DateTime<Utc>,
}
