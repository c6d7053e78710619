pub(crate) mod errors;
pub mod handlers;
mod routes;
pub mod schemas;
pub mod utils;
pub use routes::shopee_route;
