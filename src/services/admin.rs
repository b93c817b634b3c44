//! Operator console: order listings, one-step advancement and the
//! operational snapshot.

use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::ServiceError;
use crate::models::{OperationalSnapshot, Order, OrderStatus, Product, UserProfile};
use crate::repositories::OrderRepository;
use crate::services::OrderService;
use crate::store::{self, keys, RecordStore};

/// Console listing filter. `Pending` is everything pre-dispatch,
/// `Delivery` is in-flight, `Completed` is delivered orders only.
/// Cancelled orders show up under `All` and nowhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OrderFilter {
    #[default]
    All,
    Pending,
    Delivery,
    Completed,
}

impl OrderFilter {
    /// The statuses a filter selects. `None` means no restriction, which the
    /// listing serves as a full scan; `Some` groups are resolved through the
    /// per-status index instead.
    fn statuses(self) -> Option<&'static [OrderStatus]> {
        match self {
            OrderFilter::All => None,
            OrderFilter::Pending => Some(&[
                OrderStatus::Pending,
                OrderStatus::Confirmed,
                OrderStatus::Preparing,
            ]),
            OrderFilter::Delivery => Some(&[OrderStatus::OutForDelivery]),
            OrderFilter::Completed => Some(&[OrderStatus::Delivered]),
        }
    }
}

impl FromStr for OrderFilter {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(OrderFilter::All),
            "pending" => Ok(OrderFilter::Pending),
            "delivery" => Ok(OrderFilter::Delivery),
            "completed" => Ok(OrderFilter::Completed),
            other => Err(ServiceError::ValidationError(format!(
                "Unknown order filter '{}'",
                other
            ))),
        }
    }
}

/// An order denormalized for the console: display fields are embedded so the
/// console never fans out per row. Missing referenced records degrade to
/// placeholders rather than failing the listing.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdminOrderView {
    #[serde(flatten)]
    pub order: Order,
    pub product_title: String,
    pub seller_name: String,
    pub buyer_name: String,
    pub buyer_phone: String,
    pub next_status: Option<OrderStatus>,
}

#[derive(Clone)]
pub struct AdminService {
    repo: OrderRepository,
    store: Arc<dyn RecordStore>,
    orders: OrderService,
}

impl AdminService {
    pub fn new(store: Arc<dyn RecordStore>, orders: OrderService) -> Self {
        Self {
            repo: OrderRepository::new(Arc::clone(&store)),
            store,
            orders,
        }
    }

    /// Lists orders for the console, newest first, filtered by lifecycle
    /// group and denormalized for display. Filtered groups read the status
    /// index; only `All` scans the full order prefix.
    #[instrument(skip(self))]
    pub async fn list_orders(&self, filter: OrderFilter) -> Result<Vec<AdminOrderView>, ServiceError> {
        let orders = match filter.statuses() {
            None => self.repo.find_all().await?,
            Some(statuses) => {
                let mut orders = Vec::new();
                for &status in statuses {
                    orders.extend(self.repo.find_by_status(status).await?);
                }
                orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                orders
            }
        };
        let mut views = Vec::with_capacity(orders.len());
        for order in orders {
            views.push(self.denormalize(order).await?);
        }
        Ok(views)
    }

    /// Recomputes the operational stats from the full order set. Nothing is
    /// cached, so the numbers can never drift from the records.
    pub async fn snapshot(&self) -> Result<OperationalSnapshot, ServiceError> {
        let orders = self.repo.find_all().await?;
        Ok(OperationalSnapshot::from_orders(&orders))
    }

    /// Console action: apply one requested transition on behalf of an
    /// operator. Legality and concurrency checks live in the order service.
    pub async fn set_order_status(
        &self,
        order_id: Uuid,
        requested: OrderStatus,
        actor: &AuthUser,
    ) -> Result<Order, ServiceError> {
        self.orders.transition(order_id, requested, actor).await
    }

    async fn denormalize(&self, order: Order) -> Result<AdminOrderView, ServiceError> {
        let product: Option<Product> = store::get_typed(
            self.store.as_ref(),
            &keys::product(order.seller_id, order.product_id),
        )
        .await?;
        let seller: Option<UserProfile> =
            store::get_typed(self.store.as_ref(), &keys::user(order.seller_id)).await?;
        let buyer: Option<UserProfile> =
            store::get_typed(self.store.as_ref(), &keys::user(order.buyer_id)).await?;

        Ok(AdminOrderView {
            product_title: product
                .map(|p| p.title)
                .unwrap_or_else(|| "Unknown product".into()),
            seller_name: seller
                .map(|s| s.name)
                .unwrap_or_else(|| "Unknown seller".into()),
            buyer_name: buyer
                .as_ref()
                .map(|b| b.name.clone())
                .unwrap_or_else(|| "Unknown buyer".into()),
            buyer_phone: buyer.map(|b| b.phone).unwrap_or_default(),
            next_status: order.status.next_forward(),
            order,
        })
    }
}
