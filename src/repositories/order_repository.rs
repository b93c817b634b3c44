//! Order persistence over the record store.
//!
//! The store itself only does point reads and prefix scans, so this
//! repository maintains two id-only index families alongside each order:
//! `order_ix:status:{status}:{id}` and `order_ix:buyer:{buyer}:{id}`.
//! Index keys hold the order id as a JSON string; the order record under
//! `order:{id}` stays the single source of truth.

use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::models::{Order, OrderStatus};
use crate::store::{self, keys, RecordStore};

#[derive(Clone)]
pub struct OrderRepository {
    store: Arc<dyn RecordStore>,
}

impl OrderRepository {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Persists a new order and both of its index entries.
    #[instrument(skip(self, order), fields(order_id = %order.id, status = %order.status))]
    pub async fn insert(&self, order: &Order) -> Result<(), ServiceError> {
        store::set_typed(self.store.as_ref(), &keys::order(order.id), order).await?;
        self.write_indexes(order).await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, ServiceError> {
        Ok(store::get_typed(self.store.as_ref(), &keys::order(id)).await?)
    }

    /// Every order in the system, newest first.
    pub async fn find_all(&self) -> Result<Vec<Order>, ServiceError> {
        let mut orders: Vec<Order> =
            store::scan_typed(self.store.as_ref(), keys::ALL_ORDERS_PREFIX).await?;
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    /// Orders currently in `status`, resolved through the status index.
    pub async fn find_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, ServiceError> {
        let ids: Vec<Uuid> = store::scan_typed(
            self.store.as_ref(),
            &keys::order_status_index_prefix(status),
        )
        .await?;
        self.resolve(ids).await
    }

    /// All of one buyer's orders, resolved through the buyer index.
    pub async fn find_by_buyer(&self, buyer_id: Uuid) -> Result<Vec<Order>, ServiceError> {
        let ids: Vec<Uuid> = store::scan_typed(
            self.store.as_ref(),
            &keys::order_buyer_index_prefix(buyer_id),
        )
        .await?;
        self.resolve(ids).await
    }

    /// Compare-and-set update. The caller passes the version it read and the
    /// fully mutated order; if the stored version moved in the meantime the
    /// write is refused with `Conflict` and no key is touched.
    ///
    /// On success the stored record carries `expected_version + 1` and the
    /// status index is moved to the order's (possibly new) status.
    #[instrument(skip(self, order), fields(order_id = %order.id, expected_version))]
    pub async fn update_versioned(
        &self,
        expected_version: u64,
        mut order: Order,
    ) -> Result<Order, ServiceError> {
        let current: Order = store::get_typed(self.store.as_ref(), &keys::order(order.id))
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order.id)))?;

        if current.version != expected_version {
            return Err(ServiceError::Conflict(format!(
                "Order {} was modified concurrently (version {} != {})",
                order.id, current.version, expected_version
            )));
        }

        order.version = expected_version + 1;
        store::set_typed(self.store.as_ref(), &keys::order(order.id), &order).await?;

        if current.status != order.status {
            self.store
                .delete(&keys::order_status_index(current.status, order.id))
                .await?;
            store::set_typed(
                self.store.as_ref(),
                &keys::order_status_index(order.status, order.id),
                &order.id,
            )
            .await?;
        }

        Ok(order)
    }

    async fn write_indexes(&self, order: &Order) -> Result<(), ServiceError> {
        store::set_typed(
            self.store.as_ref(),
            &keys::order_status_index(order.status, order.id),
            &order.id,
        )
        .await?;
        store::set_typed(
            self.store.as_ref(),
            &keys::order_buyer_index(order.buyer_id, order.id),
            &order.id,
        )
        .await?;
        Ok(())
    }

    async fn resolve(&self, ids: Vec<Uuid>) -> Result<Vec<Order>, ServiceError> {
        let mut orders = Vec::with_capacity(ids.len());
        for id in ids {
            // a dangling index entry is skipped, not treated as corruption
            if let Some(order) = self.find_by_id(id).await? {
                orders.push(order);
            }
        }
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }
}
