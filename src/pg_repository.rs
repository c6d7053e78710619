use anyhow::Context;
use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::repository::{CommerceRepository, RepositoryError};
use crate::routes::deal::models::{DealListFilter, DealModel, DealPatchModel, NewDealModel};
use crate::routes::order::models::{
    NewOrderItemModel, NewOrderModel, OrderListFilter, OrderModel, OrderPage, OrderPatchModel,
};

const DEAL_COLUMNS: &str = "id, slug, name, price, old_price, image, category, is_active, affiliate_link, source, source_url, updated_at";
const ORDER_COLUMNS: &str = "id, guest_id, contact_email, service_code, target_url, payment_method, subtotal_vnd, discount_vnd, total_vnd, status, note, transfer_submitted_at, transfer_note, created_at";

/// Same tables as the REST backend, reached over a direct connection.
#[derive(Debug, Clone)]
pub struct PgCommerceRepository {
    pool: PgPool,
}

impl PgCommerceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// `ILIKE` pattern matching `search` anywhere, with its wildcards taken literally.
pub fn contains_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn deal_write_error(error: sqlx::Error, message: &'static str) -> anyhow::Error {
    match &error {
        sqlx::Error::Database(db_error) if db_error.is_unique_violation() => {
            RepositoryError::UniqueViolation(db_error.message().to_string()).into()
        }
        _ => anyhow::Error::new(error).context(message),
    }
}

fn push_order_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &OrderListFilter) {
    if let Some(status) = filter.status {
        builder.push(" AND status = ").push_bind(status);
    }
    if let Some(search) = &filter.search {
        let pattern = contains_pattern(search);
        builder
            .push(" AND (contact_email ILIKE ")
            .push_bind(pattern.clone())
            .push(r" ESCAPE '\' OR guest_id ILIKE ")
            .push_bind(pattern)
            .push(r" ESCAPE '\')");
    }
    if let Some(from) = filter.created_from {
        builder.push(" AND created_at >= ").push_bind(from);
    }
    if let Some(to) = filter.created_to {
        builder.push(" AND created_at <= ").push_bind(to);
    }
}

#[async_trait]
impl CommerceRepository for PgCommerceRepository {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    #[tracing::instrument(name = "Fetch deals", skip(self))]
    async fn list_deals(&self, filter: &DealListFilter) -> Result<Vec<DealModel>, anyhow::Error> {
        let mut builder =
            QueryBuilder::<Postgres>::new(format!("SELECT {} FROM deals WHERE TRUE", DEAL_COLUMNS));
        if filter.active_only {
            builder.push(" AND is_active = TRUE");
        }
        if let Some(source) = &filter.source {
            builder.push(" AND source = ").push_bind(source.clone());
        }
        builder
            .push(" ORDER BY updated_at DESC LIMIT ")
            .push_bind(filter.limit);
        let deals = builder
            .build_query_as::<DealModel>()
            .fetch_all(&self.pool)
            .await
            .context("Failed to fetch deals from database")?;
        Ok(deals)
    }

    #[tracing::instrument(name = "Fetch deal by slug", skip(self))]
    async fn fetch_deal_by_slug(&self, slug: &str) -> Result<Option<DealModel>, anyhow::Error> {
        let deal = sqlx::query_as::<_, DealModel>(&format!(
            "SELECT {} FROM deals WHERE slug = $1",
            DEAL_COLUMNS
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch deal from database")?;
        Ok(deal)
    }

    #[tracing::instrument(name = "Save deal", skip(self))]
    async fn insert_deal(&self, deal: &NewDealModel) -> Result<DealModel, anyhow::Error> {
        let query = format!(
            r#"INSERT INTO deals (name, slug, category, price, old_price, image, is_active, affiliate_link, source, source_url, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {}"#,
            DEAL_COLUMNS
        );
        let row = sqlx::query_as::<_, DealModel>(&query)
            .bind(&deal.name)
            .bind(&deal.slug)
            .bind(&deal.category)
            .bind(deal.price)
            .bind(deal.old_price)
            .bind(&deal.image)
            .bind(deal.active)
            .bind(&deal.affiliate_link)
            .bind(&deal.source)
            .bind(&deal.source_url)
            .bind(deal.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| deal_write_error(e, "Failed to save deal in database"))?;
        Ok(row)
    }

    #[tracing::instrument(name = "Update deal", skip(self))]
    async fn update_deal(
        &self,
        id: Uuid,
        patch: &DealPatchModel,
    ) -> Result<Option<DealModel>, anyhow::Error> {
        let mut builder = QueryBuilder::<Postgres>::new("UPDATE deals SET updated_at = ");
        builder.push_bind(patch.updated_at);
        if let Some(name) = &patch.name {
            builder.push(", name = ").push_bind(name.clone());
        }
        if let Some(slug) = &patch.slug {
            builder.push(", slug = ").push_bind(slug.clone());
        }
        if let Some(price) = patch.price {
            builder.push(", price = ").push_bind(price);
        }
        if let Some(old_price) = patch.old_price {
            builder.push(", old_price = ").push_bind(old_price);
        }
        if let Some(image) = &patch.image {
            builder.push(", image = ").push_bind(image.clone());
        }
        if let Some(category) = &patch.category {
            builder.push(", category = ").push_bind(category.clone());
        }
        if let Some(active) = patch.active {
            builder.push(", is_active = ").push_bind(active);
        }
        if let Some(affiliate_link) = &patch.affiliate_link {
            builder
                .push(", affiliate_link = ")
                .push_bind(affiliate_link.clone());
        }
        if let Some(source) = &patch.source {
            builder.push(", source = ").push_bind(source.clone());
        }
        if let Some(source_url) = &patch.source_url {
            builder.push(", source_url = ").push_bind(source_url.clone());
        }
        builder
            .push(" WHERE id = ")
            .push_bind(id)
            .push(format!(" RETURNING {}", DEAL_COLUMNS));
        let deal = builder
            .build_query_as::<DealModel>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| deal_write_error(e, "Failed to update deal in database"))?;
        Ok(deal)
    }

    #[tracing::instrument(name = "Delete deal", skip(self))]
    async fn delete_deal(&self, id: Uuid) -> Result<bool, anyhow::Error> {
        let result = sqlx::query("DELETE FROM deals WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete deal from database")?;
        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(name = "Save order", skip(self))]
    async fn insert_order(&self, order: &NewOrderModel) -> Result<OrderModel, anyhow::Error> {
        let query = format!(
            r#"INSERT INTO orders (guest_id, service_code, target_url, subtotal_vnd, total_vnd, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}"#,
            ORDER_COLUMNS
        );
        let row = sqlx::query_as::<_, OrderModel>(&query)
            .bind(&order.guest_id)
            .bind(&order.service_code)
            .bind(&order.target_url)
            .bind(order.subtotal_vnd)
            .bind(order.total_vnd)
            .bind(order.status)
            .fetch_one(&self.pool)
            .await
            .context("Failed to save order in database")?;
        Ok(row)
    }

    #[tracing::instrument(name = "Save order item", skip(self))]
    async fn insert_order_item(&self, item: &NewOrderItemModel) -> Result<(), anyhow::Error> {
        sqlx::query(
            r#"INSERT INTO order_items (order_id, deal_id, deal_snapshot, unit_price_vnd, quantity)
            VALUES ($1, $2, $3, $4, $5)"#,
        )
        .bind(item.order_id)
        .bind(item.deal_id)
        .bind(Json(&item.deal_snapshot))
        .bind(item.unit_price_vnd)
        .bind(item.quantity)
        .execute(&self.pool)
        .await
        .context("Failed to save order item in database")?;
        Ok(())
    }

    #[tracing::instrument(name = "Fetch order", skip(self))]
    async fn fetch_order(&self, id: Uuid) -> Result<Option<OrderModel>, anyhow::Error> {
        let order = sqlx::query_as::<_, OrderModel>(&format!(
            "SELECT {} FROM orders WHERE id = $1",
            ORDER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch order from database")?;
        Ok(order)
    }

    #[tracing::instrument(name = "Update order", skip(self))]
    async fn update_order(
        &self,
        id: Uuid,
        patch: &OrderPatchModel,
    ) -> Result<Option<OrderModel>, anyhow::Error> {
        if patch.is_empty() {
            return self.fetch_order(id).await;
        }
        let mut builder = QueryBuilder::<Postgres>::new("UPDATE orders SET ");
        let mut assignments = builder.separated(", ");
        if let Some(status) = patch.status {
            assignments.push("status = ").push_bind_unseparated(status);
        }
        if let Some(note) = &patch.note {
            assignments.push("note = ").push_bind_unseparated(note.clone());
        }
        if let Some(payment_method) = &patch.payment_method {
            assignments
                .push("payment_method = ")
                .push_bind_unseparated(payment_method.clone());
        }
        if let Some(transfer_submitted_at) = patch.transfer_submitted_at {
            assignments
                .push("transfer_submitted_at = ")
                .push_bind_unseparated(transfer_submitted_at);
        }
        if let Some(transfer_note) = &patch.transfer_note {
            assignments
                .push("transfer_note = ")
                .push_bind_unseparated(transfer_note.clone());
        }
        builder
            .push(" WHERE id = ")
            .push_bind(id)
            .push(format!(" RETURNING {}", ORDER_COLUMNS));
        let order = builder
            .build_query_as::<OrderModel>()
            .fetch_optional(&self.pool)
            .await
            .context("Failed to update order in database")?;
        Ok(order)
    }

    #[tracing::instrument(name = "Fetch order list", skip(self))]
    async fn list_orders(&self, filter: &OrderListFilter) -> Result<OrderPage, anyhow::Error> {
        let mut count_builder =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM orders WHERE TRUE");
        push_order_filters(&mut count_builder, filter);
        let total = count_builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .context("Failed to count orders in database")?;

        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM orders WHERE TRUE",
            ORDER_COLUMNS
        ));
        push_order_filters(&mut builder, filter);
        builder
            .push(" ORDER BY created_at DESC OFFSET ")
            .push_bind(filter.offset)
            .push(" LIMIT ")
            .push_bind(filter.limit);
        let items = builder
            .build_query_as::<OrderModel>()
            .fetch_all(&self.pool)
            .await
            .context("Failed to fetch orders from database")?;
        Ok(OrderPage { items, total })
    }
}
