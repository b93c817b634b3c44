pub mod cart;
pub mod order;
pub mod product;
pub mod review;
pub mod user;

pub use cart::CartItem;
pub use order::{
    OperationalSnapshot, Order, OrderStatus, OrderSummary, PaymentMethod, RefundReason,
    RefundRequest, RefundType, ReturnRecord,
};
pub use product::Product;
pub use review::Review;
pub use user::{Location, Role, UserProfile};
