pub mod handlers;
mod routes;
pub mod schemas;
pub use routes::util_route;
