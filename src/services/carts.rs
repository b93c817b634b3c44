//! Buyer carts. One record per (buyer, product); re-adding replaces.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::ServiceError;
use crate::models::{CartItem, Product};
use crate::store::{self, keys, RecordStore};

/// A cart line joined with its listing for display. The product is optional
/// because a listing can be removed while it sits in someone's cart.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CartEntry {
    #[serde(flatten)]
    pub item: CartItem,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<Product>,
}

#[derive(Clone)]
pub struct CartService {
    store: Arc<dyn RecordStore>,
}

impl CartService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn get_cart(&self, actor: &AuthUser) -> Result<Vec<CartEntry>, ServiceError> {
        let items: Vec<CartItem> =
            store::scan_typed(self.store.as_ref(), &keys::cart_prefix(actor.user_id)).await?;

        let mut entries = Vec::with_capacity(items.len());
        for item in items {
            let product = store::get_typed(
                self.store.as_ref(),
                &keys::product(item.seller_id, item.product_id),
            )
            .await?;
            entries.push(CartEntry { item, product });
        }
        Ok(entries)
    }

    #[instrument(skip(self, actor), fields(buyer_id = %actor.user_id, product_id = %product_id))]
    pub async fn add_item(
        &self,
        actor: &AuthUser,
        seller_id: Uuid,
        product_id: Uuid,
        quantity: u32,
    ) -> Result<CartItem, ServiceError> {
        if quantity == 0 {
            return Err(ServiceError::ValidationError(
                "Quantity must be at least 1".into(),
            ));
        }

        // the listing must exist and be orderable
        let product: Product =
            store::get_typed(self.store.as_ref(), &keys::product(seller_id, product_id))
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Product {} not found", product_id))
                })?;
        if !product.available {
            return Err(ServiceError::ValidationError(
                "Product is no longer available".into(),
            ));
        }

        let item = CartItem {
            product_id,
            seller_id,
            quantity,
            added_at: Utc::now(),
        };
        store::set_typed(
            self.store.as_ref(),
            &keys::cart_item(actor.user_id, product_id),
            &item,
        )
        .await?;
        Ok(item)
    }

    pub async fn remove_item(
        &self,
        actor: &AuthUser,
        product_id: Uuid,
    ) -> Result<(), ServiceError> {
        self.store
            .delete(&keys::cart_item(actor.user_id, product_id))
            .await?;
        Ok(())
    }
}
