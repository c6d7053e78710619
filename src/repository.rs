//! Storage seam for deals and orders.
//!
//! The storefront does not own its persistence: rows live in a hosted
//! Postgres service. [`crate::supabase_client::SupabaseClient`] talks to its
//! REST interface, [`crate::pg_repository::PgCommerceRepository`] connects to
//! the same tables directly.
use async_trait::async_trait;
use uuid::Uuid;

use crate::routes::deal::models::{DealListFilter, DealModel, DealPatchModel, NewDealModel};
use crate::routes::order::models::{
    NewOrderItemModel, NewOrderModel, OrderListFilter, OrderModel, OrderPage, OrderPatchModel,
};

/// Typed failures a backend reports inside its `anyhow::Error`.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// A write collided with a unique index, e.g. `deals.slug`.
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),
}

pub fn is_unique_violation(error: &anyhow::Error) -> bool {
    matches!(
        error.downcast_ref::<RepositoryError>(),
        Some(RepositoryError::UniqueViolation(_))
    )
}

#[async_trait]
pub trait CommerceRepository: Send + Sync {
    fn backend_name(&self) -> &'static str;

    async fn list_deals(&self, filter: &DealListFilter) -> Result<Vec<DealModel>, anyhow::Error>;

    async fn fetch_deal_by_slug(&self, slug: &str) -> Result<Option<DealModel>, anyhow::Error>;

    /// Fails with [`RepositoryError::UniqueViolation`] when the slug is taken.
    async fn insert_deal(&self, deal: &NewDealModel) -> Result<DealModel, anyhow::Error>;

    /// Fails with [`RepositoryError::UniqueViolation`] when the new slug is taken.
    async fn update_deal(
        &self,
        id: Uuid,
        patch: &DealPatchModel,
    ) -> Result<Option<DealModel>, anyhow::Error>;

    /// Returns `false` when no deal had this id.
    async fn delete_deal(&self, id: Uuid) -> Result<bool, anyhow::Error>;

    async fn insert_order(&self, order: &NewOrderModel) -> Result<OrderModel, anyhow::Error>;

    async fn insert_order_item(&self, item: &NewOrderItemModel) -> Result<(), anyhow::Error>;

    async fn fetch_order(&self, id: Uuid) -> Result<Option<OrderModel>, anyhow::Error>;

    /// An empty patch leaves the row as it is and returns it.
    async fn update_order(
        &self,
        id: Uuid,
        patch: &OrderPatchModel,
    ) -> Result<Option<OrderModel>, anyhow::Error>;

    async fn list_orders(&self, filter: &OrderListFilter) -> Result<OrderPage, anyhow::Error>;
}
