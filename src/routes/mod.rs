pub mod deal;
pub mod order;
mod route;
pub mod shopee;
pub mod util;
pub use deal::{admin_deal_route, deal_route};
pub use order::{admin_order_route, order_route};
pub use route::main_route;
pub use shopee::shopee_route;
pub use util::util_route;
