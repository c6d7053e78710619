pub mod configuration;
pub mod constants;
pub mod database;
pub mod errors;
pub mod headless_client;
pub mod middleware;
pub mod openapi;
pub mod pg_repository;
pub mod repository;
pub mod routes;
pub mod schemas;
pub mod shopee_client;
pub mod startup;
pub mod supabase_client;
pub mod telemetry;
pub mod utils;
