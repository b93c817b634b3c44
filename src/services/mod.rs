pub mod admin;
pub mod carts;
pub mod catalog;
pub mod orders;
pub mod users;

pub use admin::AdminService;
pub use carts::CartService;
pub use catalog::CatalogService;
pub use orders::{
    DeliveryEstimator, DispatchWindowEstimator, FixedEstimator, NewOrderInput, OrderService,
    RefundRequestInput,
};
pub use users::UserService;
