use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;

/// Lifecycle of a cash-on-delivery order.
///
/// Forward movement is a single chain; `cancelled` is reachable from any
/// pre-dispatch state. `delivered` and `cancelled` are terminal.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// The single legal forward step, if any. Drives the console's
    /// one-button advance so operators can never request an arbitrary jump.
    pub fn next_forward(self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Pending => Some(OrderStatus::Confirmed),
            OrderStatus::Confirmed => Some(OrderStatus::Preparing),
            OrderStatus::Preparing => Some(OrderStatus::OutForDelivery),
            OrderStatus::OutForDelivery => Some(OrderStatus::Delivered),
            OrderStatus::Delivered | OrderStatus::Cancelled => None,
        }
    }

    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        if next == OrderStatus::Cancelled {
            return self.is_cancellable();
        }
        self.next_forward() == Some(next)
    }

    /// Cancellation is allowed until the order leaves the seller's hands.
    pub fn is_cancellable(self) -> bool {
        matches!(
            self,
            OrderStatus::Pending | OrderStatus::Confirmed | OrderStatus::Preparing
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// "Pending" in the console's stats sense: anything still moving.
    pub fn is_open(self) -> bool {
        matches!(
            self,
            OrderStatus::Pending
                | OrderStatus::Confirmed
                | OrderStatus::Preparing
                | OrderStatus::OutForDelivery
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PaymentMethod {
    Cod,
}

/// A cash-on-delivery order. The central entity of the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub product_id: Uuid,
    pub seller_id: Uuid,
    pub buyer_id: Uuid,
    pub quantity: u32,
    /// unit price x quantity, snapshotted at order time; never recomputed
    pub total_amount: Decimal,
    pub delivery_address: String,
    pub delivery_phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_delivery_time: Option<DateTime<Utc>>,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    /// Computed once at creation; not revised as the status advances.
    pub estimated_delivery_time: DateTime<Utc>,
    /// Set exactly once, when the order enters `delivered`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivered_at: Option<DateTime<Utc>>,
    /// Optimistic-concurrency counter bumped on every write.
    pub version: u64,
}

/// Reduced order record mirrored for administrative visibility.
/// Written best-effort at checkout; its absence never blocks an order.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderSummary {
    pub order_id: Uuid,
    pub buyer_id: Uuid,
    pub product_id: Uuid,
    pub seller_id: Uuid,
    pub quantity: u32,
    pub total: Decimal,
    pub payment_method: PaymentMethod,
    pub created_at: DateTime<Utc>,
}

/// Why a buyer is asking for their money back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RefundReason {
    DamagedInDelivery,
    NotAsDescribed,
    WrongItem,
    QualityIssue,
    ChangedMind,
    /// Free-text explanation goes in the request description.
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RefundType {
    Full,
    Partial,
}

/// A recorded refund request. Recording it does not adjudicate it and never
/// mutates the order's status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RefundRequest {
    pub id: Uuid,
    pub order_id: Uuid,
    pub reason: RefundReason,
    pub refund_type: RefundType,
    pub refund_amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub requested_at: DateTime<Utc>,
}

/// Audit record for a post-delivery return. The order itself keeps its
/// `delivered` status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReturnRecord {
    pub order_id: Uuid,
    pub requested_by: Uuid,
    pub requested_at: DateTime<Utc>,
}

/// Derived operational stats. Never persisted; recomputed from the full
/// order set on every call so it cannot drift from the data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OperationalSnapshot {
    pub total_orders: u64,
    pub pending_orders: u64,
    pub completed_orders: u64,
    pub total_revenue: Decimal,
    pub active_deliveries: u64,
}

impl OperationalSnapshot {
    pub fn from_orders(orders: &[Order]) -> Self {
        let mut snapshot = OperationalSnapshot {
            total_orders: orders.len() as u64,
            pending_orders: 0,
            completed_orders: 0,
            total_revenue: Decimal::ZERO,
            active_deliveries: 0,
        };

        for order in orders {
            if order.status.is_open() {
                snapshot.pending_orders += 1;
            }
            match order.status {
                OrderStatus::Delivered => {
                    snapshot.completed_orders += 1;
                    snapshot.total_revenue += order.total_amount;
                }
                OrderStatus::OutForDelivery => snapshot.active_deliveries += 1,
                _ => {}
            }
        }

        snapshot
    }
}
