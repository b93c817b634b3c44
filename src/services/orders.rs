//! Order lifecycle: cash-on-delivery checkout, status transitions,
//! cancellation, returns and refund requests.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::models::{
    Order, OrderStatus, OrderSummary, PaymentMethod, Product, RefundReason, RefundRequest,
    RefundType, ReturnRecord,
};
use crate::repositories::OrderRepository;
use crate::store::{self, keys, RecordStore};

/// Refunds may be requested up to this long after delivery, inclusive.
pub const REFUND_WINDOW_DAYS: i64 = 2;

/// Supplies the delivery estimate shown to the buyer at checkout.
/// The estimate is computed once and never revised.
pub trait DeliveryEstimator: Send + Sync {
    fn estimate(&self, now: DateTime<Utc>) -> DateTime<Utc>;
}

/// Production estimator: a 30 minute dispatch floor plus up to an hour of
/// courier variance.
pub struct DispatchWindowEstimator;

impl DeliveryEstimator for DispatchWindowEstimator {
    fn estimate(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let variance = rand::thread_rng().gen_range(0..60);
        now + Duration::minutes(30) + Duration::minutes(variance)
    }
}

/// Deterministic estimator for tests and local tooling.
pub struct FixedEstimator(pub Duration);

impl DeliveryEstimator for FixedEstimator {
    fn estimate(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + self.0
    }
}

#[derive(Debug, Clone)]
pub struct NewOrderInput {
    pub product_id: Uuid,
    pub seller_id: Uuid,
    pub quantity: u32,
    pub delivery_address: String,
    pub delivery_phone: String,
    pub delivery_notes: Option<String>,
    pub preferred_delivery_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct RefundRequestInput {
    pub order_id: Uuid,
    pub reason: RefundReason,
    pub refund_type: RefundType,
    pub refund_amount: Option<Decimal>,
    pub description: Option<String>,
}

#[derive(Clone)]
pub struct OrderService {
    repo: OrderRepository,
    store: Arc<dyn RecordStore>,
    estimator: Arc<dyn DeliveryEstimator>,
    events: EventSender,
}

impl OrderService {
    pub fn new(
        store: Arc<dyn RecordStore>,
        estimator: Arc<dyn DeliveryEstimator>,
        events: EventSender,
    ) -> Self {
        Self {
            repo: OrderRepository::new(Arc::clone(&store)),
            store,
            estimator,
            events,
        }
    }

    /// Places a cash-on-delivery order.
    ///
    /// The total is the listed unit price times the quantity, snapshotted
    /// here; later price edits never touch existing orders. After the order
    /// is durable, an admin-visibility summary is mirrored and the buyer's
    /// cart is cleared, both best-effort.
    #[instrument(skip(self, buyer, input), fields(buyer_id = %buyer.user_id, product_id = %input.product_id))]
    pub async fn create_cod_order(
        &self,
        buyer: &AuthUser,
        input: NewOrderInput,
    ) -> Result<Order, ServiceError> {
        if input.quantity == 0 {
            return Err(ServiceError::ValidationError(
                "Quantity must be at least 1".into(),
            ));
        }
        if input.delivery_address.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "Delivery address is required".into(),
            ));
        }
        if input.delivery_phone.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "Delivery phone is required".into(),
            ));
        }

        let product: Product = store::get_typed(
            self.store.as_ref(),
            &keys::product(input.seller_id, input.product_id),
        )
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", input.product_id)))?;

        if !product.available {
            return Err(ServiceError::ValidationError(
                "Product is no longer available".into(),
            ));
        }

        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4(),
            product_id: product.id,
            seller_id: product.seller_id,
            buyer_id: buyer.user_id,
            quantity: input.quantity,
            total_amount: product.price * Decimal::from(input.quantity),
            delivery_address: input.delivery_address,
            delivery_phone: input.delivery_phone,
            delivery_notes: input.delivery_notes,
            preferred_delivery_time: input.preferred_delivery_time,
            payment_method: PaymentMethod::Cod,
            status: OrderStatus::Pending,
            created_at: now,
            estimated_delivery_time: self.estimator.estimate(now),
            delivered_at: None,
            version: 1,
        };

        self.repo.insert(&order).await?;
        info!(order_id = %order.id, total = %order.total_amount, "COD order placed");

        self.spawn_post_checkout(&order);
        self.events.send(Event::OrderCreated(order.id)).await;

        Ok(order)
    }

    /// Mirror the summary record and clear the cart off the request path.
    /// Failures are logged and never surfaced to the buyer.
    fn spawn_post_checkout(&self, order: &Order) {
        let store = Arc::clone(&self.store);
        let summary = OrderSummary {
            order_id: order.id,
            buyer_id: order.buyer_id,
            product_id: order.product_id,
            seller_id: order.seller_id,
            quantity: order.quantity,
            total: order.total_amount,
            payment_method: order.payment_method,
            created_at: order.created_at,
        };

        tokio::spawn(async move {
            let key = keys::order_summary(summary.buyer_id, summary.order_id);
            if let Err(e) = store::set_typed(store.as_ref(), &key, &summary).await {
                warn!(order_id = %summary.order_id, error = %e, "order summary mirror failed");
            }

            match store::scan_typed::<crate::models::CartItem>(
                store.as_ref(),
                &keys::cart_prefix(summary.buyer_id),
            )
            .await
            {
                Ok(items) => {
                    for item in items {
                        let key = keys::cart_item(summary.buyer_id, item.product_id);
                        if let Err(e) = store.delete(&key).await {
                            warn!(buyer_id = %summary.buyer_id, error = %e, "cart item removal failed");
                        }
                    }
                }
                Err(e) => {
                    warn!(buyer_id = %summary.buyer_id, error = %e, "cart clearing failed")
                }
            }
        });
    }

    /// Fetches an order, visible only to its buyer, its seller, or an admin.
    pub async fn get_order(&self, id: Uuid, actor: &AuthUser) -> Result<Order, ServiceError> {
        let order = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", id)))?;

        let involved = actor.user_id == order.buyer_id || actor.user_id == order.seller_id;
        if !involved && !actor.is_admin() {
            return Err(ServiceError::Forbidden(
                "You are not a party to this order".into(),
            ));
        }
        Ok(order)
    }

    pub async fn list_orders_for_buyer(&self, actor: &AuthUser) -> Result<Vec<Order>, ServiceError> {
        self.repo.find_by_buyer(actor.user_id).await
    }

    /// Applies a single status transition under the lifecycle rules.
    ///
    /// Forward moves are operator actions; cancellation belongs to the
    /// order's buyer (or an admin) while the order is still pre-dispatch.
    /// The write is compare-and-set, so a concurrent change surfaces as
    /// `Conflict` rather than silently overwriting.
    #[instrument(skip(self, actor), fields(order_id = %id, requested = %requested, actor_id = %actor.user_id))]
    pub async fn transition(
        &self,
        id: Uuid,
        requested: OrderStatus,
        actor: &AuthUser,
    ) -> Result<Order, ServiceError> {
        let order = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", id)))?;

        if requested == OrderStatus::Cancelled {
            if actor.user_id != order.buyer_id && !actor.is_admin() {
                return Err(ServiceError::Forbidden(
                    "Only the buyer may cancel this order".into(),
                ));
            }
        } else if !actor.is_admin() {
            return Err(ServiceError::Forbidden(
                "Only operators may advance an order".into(),
            ));
        }

        if !order.status.can_transition_to(requested) {
            return Err(ServiceError::InvalidTransition(format!(
                "Cannot move order from {} to {}",
                order.status, requested
            )));
        }

        let old_status = order.status;
        let expected_version = order.version;
        let mut next = order;
        next.status = requested;
        if requested == OrderStatus::Delivered && next.delivered_at.is_none() {
            next.delivered_at = Some(Utc::now());
        }

        let stored = self.repo.update_versioned(expected_version, next).await?;
        info!(from = %old_status, to = %stored.status, "order transitioned");

        self.events
            .send(Event::OrderStatusChanged {
                order_id: stored.id,
                old_status,
                new_status: stored.status,
            })
            .await;
        match stored.status {
            OrderStatus::Cancelled => self.events.send(Event::OrderCancelled(stored.id)).await,
            OrderStatus::Delivered => self.events.send(Event::OrderDelivered(stored.id)).await,
            _ => {}
        }

        Ok(stored)
    }

    pub async fn cancel_order(&self, id: Uuid, actor: &AuthUser) -> Result<Order, ServiceError> {
        self.transition(id, OrderStatus::Cancelled, actor).await
    }

    /// Records a post-delivery return. The order keeps its `delivered`
    /// status; the record exists for the back office to act on.
    #[instrument(skip(self, actor), fields(order_id = %id, actor_id = %actor.user_id))]
    pub async fn request_return(
        &self,
        id: Uuid,
        actor: &AuthUser,
    ) -> Result<ReturnRecord, ServiceError> {
        let order = self.get_order(id, actor).await?;
        if actor.user_id != order.buyer_id && !actor.is_admin() {
            return Err(ServiceError::Forbidden(
                "Only the buyer may return this order".into(),
            ));
        }
        if order.status != OrderStatus::Delivered {
            return Err(ServiceError::InvalidTransition(
                "Only delivered orders can be returned".into(),
            ));
        }

        let key = keys::return_record(order.id);
        if store::get_typed::<ReturnRecord>(self.store.as_ref(), &key)
            .await?
            .is_some()
        {
            return Err(ServiceError::Conflict(
                "A return was already requested for this order".into(),
            ));
        }

        let record = ReturnRecord {
            order_id: order.id,
            requested_by: actor.user_id,
            requested_at: Utc::now(),
        };
        store::set_typed(self.store.as_ref(), &key, &record).await?;
        self.events.send(Event::ReturnRequested(order.id)).await;

        Ok(record)
    }

    /// Records a refund request inside the post-delivery window.
    ///
    /// Recording never adjudicates: the order's status and totals are left
    /// untouched for the back office to settle.
    #[instrument(skip(self, actor, input), fields(order_id = %input.order_id, actor_id = %actor.user_id))]
    pub async fn submit_refund_request(
        &self,
        actor: &AuthUser,
        input: RefundRequestInput,
    ) -> Result<RefundRequest, ServiceError> {
        let order = self.get_order(input.order_id, actor).await?;
        if actor.user_id != order.buyer_id && !actor.is_admin() {
            return Err(ServiceError::Forbidden(
                "Only the buyer may request a refund".into(),
            ));
        }
        if order.status != OrderStatus::Delivered {
            return Err(ServiceError::ValidationError(
                "Only delivered orders are refundable".into(),
            ));
        }
        if !is_refund_eligible(&order, Utc::now()) {
            return Err(ServiceError::RefundWindowExpired(format!(
                "Refunds must be requested within {} days of delivery",
                REFUND_WINDOW_DAYS
            )));
        }

        let refund_amount = match input.refund_type {
            // a full refund always means the snapshotted total
            RefundType::Full => order.total_amount,
            RefundType::Partial => {
                let amount = input.refund_amount.ok_or_else(|| {
                    ServiceError::ValidationError(
                        "Partial refunds require a refund amount".into(),
                    )
                })?;
                if amount <= Decimal::ZERO || amount > order.total_amount {
                    return Err(ServiceError::ValidationError(format!(
                        "Refund amount must be between 0 and {}",
                        order.total_amount
                    )));
                }
                amount
            }
        };

        let request = RefundRequest {
            id: Uuid::new_v4(),
            order_id: order.id,
            reason: input.reason,
            refund_type: input.refund_type,
            refund_amount,
            description: input.description,
            requested_at: Utc::now(),
        };
        store::set_typed(
            self.store.as_ref(),
            &keys::refund_request(order.id, request.id),
            &request,
        )
        .await?;
        self.events
            .send(Event::RefundRequested {
                order_id: order.id,
                amount: refund_amount,
            })
            .await;

        Ok(request)
    }
}

/// Window check, inclusive at exactly `REFUND_WINDOW_DAYS` after delivery.
/// Orders that never delivered are not eligible.
pub fn is_refund_eligible(order: &Order, now: DateTime<Utc>) -> bool {
    match order.delivered_at {
        Some(delivered_at) => now - delivered_at <= Duration::days(REFUND_WINDOW_DAYS),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use crate::store::MemoryStore;
    use rust_decimal_macros::dec;
    use tokio::sync::mpsc;

    fn actor(role: Role) -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            role,
            email: "test@example.com".into(),
        }
    }

    fn service(store: Arc<dyn RecordStore>) -> OrderService {
        let (tx, _rx) = mpsc::channel(64);
        OrderService::new(
            store,
            Arc::new(FixedEstimator(Duration::minutes(45))),
            EventSender::new(tx),
        )
    }

    async fn seed_product(store: &dyn RecordStore, price: Decimal) -> Product {
        let product = Product {
            id: Uuid::new_v4(),
            seller_id: Uuid::new_v4(),
            title: "Handwoven basket".into(),
            description: String::new(),
            price,
            category: "crafts".into(),
            images: vec![],
            available: true,
            created_at: Utc::now(),
        };
        store::set_typed(store, &keys::product(product.seller_id, product.id), &product)
            .await
            .unwrap();
        product
    }

    fn order_input(product: &Product, quantity: u32) -> NewOrderInput {
        NewOrderInput {
            product_id: product.id,
            seller_id: product.seller_id,
            quantity,
            delivery_address: "Piassa, Addis Ababa".into(),
            delivery_phone: "+251911223344".into(),
            delivery_notes: None,
            preferred_delivery_time: None,
        }
    }

    #[tokio::test]
    async fn checkout_snapshots_total_and_estimate() {
        let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
        let svc = service(Arc::clone(&store));
        let product = seed_product(store.as_ref(), dec!(15.00)).await;
        let buyer = actor(Role::Buyer);

        let order = svc
            .create_cod_order(&buyer, order_input(&product, 2))
            .await
            .unwrap();

        assert_eq!(order.total_amount, dec!(30.00));
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_method, PaymentMethod::Cod);
        assert_eq!(
            order.estimated_delivery_time,
            order.created_at + Duration::minutes(45)
        );
        assert!(order.delivered_at.is_none());
    }

    #[tokio::test]
    async fn checkout_rejects_zero_quantity_and_missing_product() {
        let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
        let svc = service(Arc::clone(&store));
        let product = seed_product(store.as_ref(), dec!(9.99)).await;
        let buyer = actor(Role::Buyer);

        let err = svc
            .create_cod_order(&buyer, order_input(&product, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::ValidationError(_)));

        let mut missing = order_input(&product, 1);
        missing.product_id = Uuid::new_v4();
        let err = svc.create_cod_order(&buyer, missing).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn checkout_clears_the_buyers_cart() {
        let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
        let svc = service(Arc::clone(&store));
        let product = seed_product(store.as_ref(), dec!(5.00)).await;
        let buyer = actor(Role::Buyer);

        let item = crate::models::CartItem {
            product_id: product.id,
            seller_id: product.seller_id,
            quantity: 1,
            added_at: Utc::now(),
        };
        store::set_typed(
            store.as_ref(),
            &keys::cart_item(buyer.user_id, product.id),
            &item,
        )
        .await
        .unwrap();

        svc.create_cod_order(&buyer, order_input(&product, 1))
            .await
            .unwrap();

        // the clearing task runs off the request path
        for _ in 0..50 {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            let left = store
                .scan_by_prefix(&keys::cart_prefix(buyer.user_id))
                .await
                .unwrap();
            if left.is_empty() {
                return;
            }
        }
        panic!("cart was not cleared");
    }

    /// Store wrapper that refuses writes to one key prefix.
    struct FailingPrefixStore {
        inner: MemoryStore,
        deny_prefix: &'static str,
    }

    #[async_trait::async_trait]
    impl RecordStore for FailingPrefixStore {
        async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, crate::store::StoreError> {
            self.inner.get(key).await
        }

        async fn set(
            &self,
            key: &str,
            record: serde_json::Value,
        ) -> Result<(), crate::store::StoreError> {
            if key.starts_with(self.deny_prefix) {
                return Err(crate::store::StoreError::Unavailable("write refused".into()));
            }
            self.inner.set(key, record).await
        }

        async fn delete(&self, key: &str) -> Result<(), crate::store::StoreError> {
            self.inner.delete(key).await
        }

        async fn scan_by_prefix(
            &self,
            prefix: &str,
        ) -> Result<Vec<serde_json::Value>, crate::store::StoreError> {
            self.inner.scan_by_prefix(prefix).await
        }
    }

    #[tokio::test]
    async fn mirror_write_failure_does_not_fail_checkout() {
        let store: Arc<dyn RecordStore> = Arc::new(FailingPrefixStore {
            inner: MemoryStore::new(),
            deny_prefix: "order_summary:",
        });
        let svc = service(Arc::clone(&store));
        let product = seed_product(store.as_ref(), dec!(15.00)).await;
        let buyer = actor(Role::Buyer);

        let order = svc
            .create_cod_order(&buyer, order_input(&product, 1))
            .await
            .expect("checkout must survive a failing mirror write");

        // the primary record is durable even though the mirror never lands
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        let stored = svc.get_order(order.id, &buyer).await.unwrap();
        assert_eq!(stored.id, order.id);
        assert!(store
            .scan_by_prefix(&keys::order_summary(buyer.user_id, order.id))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn full_lifecycle_sets_delivered_at_once() {
        let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
        let svc = service(Arc::clone(&store));
        let product = seed_product(store.as_ref(), dec!(10.00)).await;
        let buyer = actor(Role::Buyer);
        let admin = actor(Role::Admin);

        let order = svc
            .create_cod_order(&buyer, order_input(&product, 1))
            .await
            .unwrap();

        let mut current = order;
        for status in [
            OrderStatus::Confirmed,
            OrderStatus::Preparing,
            OrderStatus::OutForDelivery,
            OrderStatus::Delivered,
        ] {
            current = svc.transition(current.id, status, &admin).await.unwrap();
            assert_eq!(current.status, status);
        }
        assert!(current.delivered_at.is_some());

        // terminal: no further moves
        let err = svc
            .transition(current.id, OrderStatus::Pending, &admin)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidTransition(_)));
    }

    #[tokio::test]
    async fn skipping_states_is_rejected() {
        let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
        let svc = service(Arc::clone(&store));
        let product = seed_product(store.as_ref(), dec!(10.00)).await;
        let buyer = actor(Role::Buyer);
        let admin = actor(Role::Admin);

        let order = svc
            .create_cod_order(&buyer, order_input(&product, 1))
            .await
            .unwrap();
        let err = svc
            .transition(order.id, OrderStatus::Delivered, &admin)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidTransition(_)));
    }

    #[tokio::test]
    async fn buyers_cannot_advance_but_can_cancel_pre_dispatch() {
        let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
        let svc = service(Arc::clone(&store));
        let product = seed_product(store.as_ref(), dec!(10.00)).await;
        let buyer = actor(Role::Buyer);
        let admin = actor(Role::Admin);

        let order = svc
            .create_cod_order(&buyer, order_input(&product, 1))
            .await
            .unwrap();

        let err = svc
            .transition(order.id, OrderStatus::Confirmed, &buyer)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        // another buyer cannot cancel someone else's order
        let stranger = actor(Role::Buyer);
        let err = svc.cancel_order(order.id, &stranger).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        let order = svc.transition(order.id, OrderStatus::Confirmed, &admin).await.unwrap();
        let order = svc.transition(order.id, OrderStatus::Preparing, &admin).await.unwrap();
        let cancelled = svc.cancel_order(order.id, &buyer).await.unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
    }

    #[tokio::test]
    async fn cancel_after_dispatch_is_rejected() {
        let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
        let svc = service(Arc::clone(&store));
        let product = seed_product(store.as_ref(), dec!(10.00)).await;
        let buyer = actor(Role::Buyer);
        let admin = actor(Role::Admin);

        let order = svc
            .create_cod_order(&buyer, order_input(&product, 1))
            .await
            .unwrap();
        for status in [
            OrderStatus::Confirmed,
            OrderStatus::Preparing,
            OrderStatus::OutForDelivery,
        ] {
            svc.transition(order.id, status, &admin).await.unwrap();
        }

        let err = svc.cancel_order(order.id, &buyer).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidTransition(_)));
    }

    #[tokio::test]
    async fn return_requires_delivery_and_is_recorded_once() {
        let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
        let svc = service(Arc::clone(&store));
        let product = seed_product(store.as_ref(), dec!(10.00)).await;
        let buyer = actor(Role::Buyer);
        let admin = actor(Role::Admin);

        let order = svc
            .create_cod_order(&buyer, order_input(&product, 1))
            .await
            .unwrap();

        let err = svc.request_return(order.id, &buyer).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidTransition(_)));

        for status in [
            OrderStatus::Confirmed,
            OrderStatus::Preparing,
            OrderStatus::OutForDelivery,
            OrderStatus::Delivered,
        ] {
            svc.transition(order.id, status, &admin).await.unwrap();
        }

        let record = svc.request_return(order.id, &buyer).await.unwrap();
        assert_eq!(record.order_id, order.id);
        assert_eq!(record.requested_by, buyer.user_id);

        // the order itself stays delivered
        let stored = svc.get_order(order.id, &buyer).await.unwrap();
        assert_eq!(stored.status, OrderStatus::Delivered);

        let err = svc.request_return(order.id, &buyer).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[test]
    fn refund_window_is_inclusive_at_two_days() {
        let now = Utc::now();
        let mut order = Order {
            id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            seller_id: Uuid::new_v4(),
            buyer_id: Uuid::new_v4(),
            quantity: 1,
            total_amount: dec!(20.00),
            delivery_address: "Bole".into(),
            delivery_phone: "+251911000000".into(),
            delivery_notes: None,
            preferred_delivery_time: None,
            payment_method: PaymentMethod::Cod,
            status: OrderStatus::Delivered,
            created_at: now - Duration::days(3),
            estimated_delivery_time: now - Duration::days(3),
            delivered_at: Some(now - Duration::days(REFUND_WINDOW_DAYS)),
            version: 1,
        };

        // exactly on the boundary: still eligible
        assert!(is_refund_eligible(&order, now));

        order.delivered_at = Some(now - Duration::days(REFUND_WINDOW_DAYS) - Duration::seconds(1));
        assert!(!is_refund_eligible(&order, now));

        order.delivered_at = None;
        assert!(!is_refund_eligible(&order, now));
    }

    #[tokio::test]
    async fn partial_refund_amount_is_bounded_and_full_forces_total() {
        let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
        let svc = service(Arc::clone(&store));
        let product = seed_product(store.as_ref(), dec!(10.00)).await;
        let buyer = actor(Role::Buyer);
        let admin = actor(Role::Admin);

        let order = svc
            .create_cod_order(&buyer, order_input(&product, 2))
            .await
            .unwrap();
        for status in [
            OrderStatus::Confirmed,
            OrderStatus::Preparing,
            OrderStatus::OutForDelivery,
            OrderStatus::Delivered,
        ] {
            svc.transition(order.id, status, &admin).await.unwrap();
        }

        let base = RefundRequestInput {
            order_id: order.id,
            reason: RefundReason::DamagedInDelivery,
            refund_type: RefundType::Partial,
            refund_amount: Some(dec!(25.00)),
            description: None,
        };

        // over the snapshotted 20.00 total
        let err = svc
            .submit_refund_request(&buyer, base.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::ValidationError(_)));

        let ok = svc
            .submit_refund_request(
                &buyer,
                RefundRequestInput {
                    refund_amount: Some(dec!(5.00)),
                    ..base.clone()
                },
            )
            .await
            .unwrap();
        assert_eq!(ok.refund_amount, dec!(5.00));

        // full refunds ignore any provided amount
        let full = svc
            .submit_refund_request(
                &buyer,
                RefundRequestInput {
                    refund_type: RefundType::Full,
                    refund_amount: Some(dec!(1.00)),
                    ..base
                },
            )
            .await
            .unwrap();
        assert_eq!(full.refund_amount, dec!(20.00));
    }
}
