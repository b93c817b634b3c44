//! In-process domain events.
//!
//! Services emit events after their writes commit; a single spawned consumer
//! logs them. Emission is fire-and-forget: a full or closed channel is logged
//! and never propagated back into the request path.

use rust_decimal::Decimal;
use tokio::sync::mpsc;
use tracing::{error, info};
use uuid::Uuid;

use crate::models::OrderStatus;

#[derive(Debug, Clone)]
pub enum Event {
    OrderCreated(Uuid),
    OrderStatusChanged {
        order_id: Uuid,
        old_status: OrderStatus,
        new_status: OrderStatus,
    },
    OrderCancelled(Uuid),
    OrderDelivered(Uuid),
    ReturnRequested(Uuid),
    RefundRequested {
        order_id: Uuid,
        amount: Decimal,
    },
    ProductCreated(Uuid),
    ReviewCreated(Uuid),
}

#[derive(Clone)]
pub struct EventSender {
    tx: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(tx: mpsc::Sender<Event>) -> Self {
        Self { tx }
    }

    /// Best-effort emit. Losing an event is a logging gap, not a failure.
    pub async fn send(&self, event: Event) {
        if let Err(e) = self.tx.send(event).await {
            error!("Failed to emit event: {}", e);
        }
    }
}

/// Drains the event channel for the life of the process.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    while let Some(event) = rx.recv().await {
        match event {
            Event::OrderCreated(id) => info!(order_id = %id, "order created"),
            Event::OrderStatusChanged {
                order_id,
                old_status,
                new_status,
            } => info!(
                %order_id,
                from = %old_status,
                to = %new_status,
                "order status changed"
            ),
            Event::OrderCancelled(id) => info!(order_id = %id, "order cancelled"),
            Event::OrderDelivered(id) => info!(order_id = %id, "order delivered"),
            Event::ReturnRequested(id) => info!(order_id = %id, "return requested"),
            Event::RefundRequested { order_id, amount } => {
                info!(%order_id, %amount, "refund requested")
            }
            Event::ProductCreated(id) => info!(product_id = %id, "product created"),
            Event::ReviewCreated(id) => info!(review_id = %id, "review created"),
        }
    }
}
