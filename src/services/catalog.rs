//! Product catalog, seller discovery and reviews.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::geo;
use crate::models::{Location, Product, Review, Role, UserProfile};
use crate::store::{self, keys, RecordStore};

#[derive(Debug, Clone)]
pub struct NewProductInput {
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub category: String,
    pub images: Vec<String>,
}

/// A seller as presented in category discovery: profile, their matching
/// listings, review aggregate and distance from the searching buyer.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SellerRanking {
    pub seller: UserProfile,
    pub products: Vec<Product>,
    pub average_rating: f64,
    pub review_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn RecordStore>,
    events: EventSender,
}

impl CatalogService {
    pub fn new(store: Arc<dyn RecordStore>, events: EventSender) -> Self {
        Self { store, events }
    }

    #[instrument(skip(self, actor, input), fields(seller_id = %actor.user_id))]
    pub async fn add_product(
        &self,
        actor: &AuthUser,
        input: NewProductInput,
    ) -> Result<Product, ServiceError> {
        if actor.role == Role::Buyer {
            return Err(ServiceError::Forbidden(
                "Only sellers may list products".into(),
            ));
        }
        if input.price <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Price must be positive".into(),
            ));
        }

        let product = Product {
            id: Uuid::new_v4(),
            seller_id: actor.user_id,
            title: input.title,
            description: input.description,
            price: input.price,
            category: input.category,
            images: input.images,
            available: true,
            created_at: Utc::now(),
        };
        store::set_typed(
            self.store.as_ref(),
            &keys::product(product.seller_id, product.id),
            &product,
        )
        .await?;
        self.events.send(Event::ProductCreated(product.id)).await;
        Ok(product)
    }

    pub async fn list_seller_products(
        &self,
        seller_id: Uuid,
    ) -> Result<Vec<Product>, ServiceError> {
        Ok(store::scan_typed(self.store.as_ref(), &keys::product_prefix(seller_id)).await?)
    }

    pub async fn get_product(
        &self,
        seller_id: Uuid,
        product_id: Uuid,
    ) -> Result<Product, ServiceError> {
        store::get_typed(self.store.as_ref(), &keys::product(seller_id, product_id))
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))
    }

    /// Sellers with available listings in `category`, closest first when the
    /// caller shares a location, ties broken by rating.
    #[instrument(skip(self, near))]
    pub async fn sellers_by_category(
        &self,
        category: &str,
        near: Option<&Location>,
    ) -> Result<Vec<SellerRanking>, ServiceError> {
        let products: Vec<Product> =
            store::scan_typed(self.store.as_ref(), keys::ALL_PRODUCTS_PREFIX).await?;

        let mut by_seller: HashMap<Uuid, Vec<Product>> = HashMap::new();
        for product in products {
            if product.available && product.category.eq_ignore_ascii_case(category) {
                by_seller.entry(product.seller_id).or_default().push(product);
            }
        }

        let mut rankings = Vec::with_capacity(by_seller.len());
        for (seller_id, products) in by_seller {
            let seller: UserProfile =
                match store::get_typed(self.store.as_ref(), &keys::user(seller_id)).await? {
                    Some(profile) => profile,
                    // listings whose seller record vanished are not shown
                    None => continue,
                };

            let reviews = self.list_reviews(seller_id).await?;
            let review_count = reviews.len();
            let average_rating = if review_count == 0 {
                0.0
            } else {
                reviews.iter().map(|r| r.rating as f64).sum::<f64>() / review_count as f64
            };

            let distance_km = near.map(|loc| {
                geo::distance_km(loc.lat, loc.lng, seller.location.lat, seller.location.lng)
            });

            rankings.push(SellerRanking {
                seller,
                products,
                average_rating,
                review_count,
                distance_km,
            });
        }

        rankings.sort_by(|a, b| {
            match (a.distance_km, b.distance_km) {
                (Some(da), Some(db)) => da
                    .partial_cmp(&db)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| {
                        b.average_rating
                            .partial_cmp(&a.average_rating)
                            .unwrap_or(std::cmp::Ordering::Equal)
                    }),
                _ => b
                    .average_rating
                    .partial_cmp(&a.average_rating)
                    .unwrap_or(std::cmp::Ordering::Equal),
            }
        });

        Ok(rankings)
    }

    #[instrument(skip(self, actor, comment), fields(seller_id = %seller_id, buyer_id = %actor.user_id))]
    pub async fn add_review(
        &self,
        actor: &AuthUser,
        seller_id: Uuid,
        rating: u8,
        comment: String,
    ) -> Result<Review, ServiceError> {
        if !(1..=5).contains(&rating) {
            return Err(ServiceError::ValidationError(
                "Rating must be between 1 and 5".into(),
            ));
        }
        if actor.user_id == seller_id {
            return Err(ServiceError::ValidationError(
                "Sellers cannot review themselves".into(),
            ));
        }

        let review = Review {
            id: Uuid::new_v4(),
            seller_id,
            buyer_id: actor.user_id,
            rating,
            comment,
            created_at: Utc::now(),
        };
        store::set_typed(
            self.store.as_ref(),
            &keys::review(seller_id, review.id),
            &review,
        )
        .await?;
        self.events.send(Event::ReviewCreated(review.id)).await;
        Ok(review)
    }

    pub async fn list_reviews(&self, seller_id: Uuid) -> Result<Vec<Review>, ServiceError> {
        Ok(store::scan_typed(self.store.as_ref(), &keys::review_prefix(seller_id)).await?)
    }
}
