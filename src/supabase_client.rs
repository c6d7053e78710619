use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, CONTENT_RANGE};
use reqwest::{Client, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::repository::{CommerceRepository, RepositoryError};
use crate::routes::deal::models::{DealListFilter, DealModel, DealPatchModel, NewDealModel};
use crate::routes::order::models::{
    NewOrderItemModel, NewOrderModel, OrderListFilter, OrderModel, OrderPage, OrderPatchModel,
};

const DEAL_COLUMNS: &str = "id,slug,name,price,old_price,image,category,active:is_active,affiliate_link,source,source_url,updated_at";
const UNIQUE_VIOLATION_CODE: &str = "23505";
const ORDER_COLUMNS: &str = "id,guest_id,contact_email,service_code,target_url,payment_method,subtotal_vnd,discount_vnd,total_vnd,status,note,transfer_submitted_at,transfer_note,created_at";

/// Client for the hosted database's REST (PostgREST) interface.
#[derive(Debug)]
pub struct SupabaseClient {
    http_client: Client,
    base_url: String,
    service_role_key: SecretString,
}

impl SupabaseClient {
    #[tracing::instrument(skip(service_role_key))]
    pub fn new(
        base_url: String,
        service_role_key: SecretString,
        timeout: std::time::Duration,
    ) -> Result<Self, anyhow::Error> {
        tracing::info!("Establishing connection to the database REST interface.");
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build the REST http client")?;
        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            service_role_key,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let key = self.service_role_key.expose_secret();
        request
            .header("apikey", key)
            .header("Authorization", format!("Bearer {}", key))
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<(T, HeaderMap), anyhow::Error> {
        let response = self
            .authorized(request)
            .send()
            .await
            .context("Failed to reach the database REST interface")?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .context("Failed to read the database REST response")?;
        if is_unique_violation_response(status, &body) {
            tracing::warn!(%status, %body, "database REST write hit a unique index");
            return Err(RepositoryError::UniqueViolation(body).into());
        }
        if !status.is_success() {
            tracing::error!(%status, %body, "database REST request failed");
            return Err(anyhow::anyhow!(
                "Database REST request failed with status {}: {}",
                status,
                body
            ));
        }
        let parsed = if body.trim().is_empty() {
            serde_json::from_str("[]")
        } else {
            serde_json::from_str(&body)
        }
        .context("Failed to parse the database REST response")?;
        Ok((parsed, headers))
    }
}

/// PostgREST answers a unique index collision with 409 and the Postgres
/// error code in the body.
pub fn is_unique_violation_response(status: StatusCode, body: &str) -> bool {
    status == StatusCode::CONFLICT
        && serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|error| {
                error
                    .get("code")
                    .and_then(|code| code.as_str())
                    .map(|code| code == UNIQUE_VIOLATION_CODE)
            })
            .unwrap_or(false)
}

fn first_row<T>(rows: Vec<T>, what: &str) -> Result<T, anyhow::Error> {
    rows.into_iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("Database returned no {} row", what))
}

/// Total from a `Content-Range: 0-9/57` header.
pub fn parse_total_count(headers: &HeaderMap) -> Option<i64> {
    headers
        .get(CONTENT_RANGE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.rsplit('/').next())
        .and_then(|total| total.trim().parse::<i64>().ok())
}

/// `or=(...)` filter matching the search term against contact email or guest id.
pub fn order_search_filter(search: &str) -> String {
    let cleaned: String = search
        .chars()
        .filter(|c| !matches!(c, '"' | '\\' | '*'))
        .collect();
    format!(
        "(contact_email.ilike.\"*{0}*\",guest_id.ilike.\"*{0}*\")",
        cleaned
    )
}

#[async_trait]
impl CommerceRepository for SupabaseClient {
    fn backend_name(&self) -> &'static str {
        "rest"
    }

    #[tracing::instrument(name = "Fetching deals over REST", skip(self))]
    async fn list_deals(&self, filter: &DealListFilter) -> Result<Vec<DealModel>, anyhow::Error> {
        let mut query: Vec<(&str, String)> = vec![("select", DEAL_COLUMNS.to_string())];
        if filter.active_only {
            query.push(("is_active", "eq.true".to_string()));
        }
        if let Some(source) = &filter.source {
            query.push(("source", format!("eq.{}", source)));
        }
        query.push(("order", "updated_at.desc".to_string()));
        query.push(("limit", filter.limit.to_string()));

        let request = self.http_client.get(self.table_url("deals")).query(&query);
        let (deals, _) = self.execute::<Vec<DealModel>>(request).await?;
        Ok(deals)
    }

    #[tracing::instrument(name = "Fetching deal by slug over REST", skip(self))]
    async fn fetch_deal_by_slug(&self, slug: &str) -> Result<Option<DealModel>, anyhow::Error> {
        let request = self.http_client.get(self.table_url("deals")).query(&[
            ("select", DEAL_COLUMNS.to_string()),
            ("slug", format!("eq.{}", slug)),
            ("limit", "1".to_string()),
        ]);
        let (deals, _) = self.execute::<Vec<DealModel>>(request).await?;
        Ok(deals.into_iter().next())
    }

    #[tracing::instrument(name = "Saving deal over REST", skip(self))]
    async fn insert_deal(&self, deal: &NewDealModel) -> Result<DealModel, anyhow::Error> {
        let request = self
            .http_client
            .post(self.table_url("deals"))
            .query(&[("select", DEAL_COLUMNS)])
            .header("Prefer", "return=representation")
            .json(&[deal]);
        let (deals, _) = self.execute::<Vec<DealModel>>(request).await?;
        first_row(deals, "inserted deal")
    }

    #[tracing::instrument(name = "Updating deal over REST", skip(self))]
    async fn update_deal(
        &self,
        id: Uuid,
        patch: &DealPatchModel,
    ) -> Result<Option<DealModel>, anyhow::Error> {
        let request = self
            .http_client
            .patch(self.table_url("deals"))
            .query(&[
                ("id", format!("eq.{}", id)),
                ("select", DEAL_COLUMNS.to_string()),
            ])
            .header("Prefer", "return=representation")
            .json(patch);
        let (deals, _) = self.execute::<Vec<DealModel>>(request).await?;
        Ok(deals.into_iter().next())
    }

    #[tracing::instrument(name = "Deleting deal over REST", skip(self))]
    async fn delete_deal(&self, id: Uuid) -> Result<bool, anyhow::Error> {
        let request = self
            .http_client
            .delete(self.table_url("deals"))
            .query(&[("id", format!("eq.{}", id)), ("select", "id".to_string())])
            .header("Prefer", "return=representation");
        let (deleted, _) = self.execute::<Vec<serde_json::Value>>(request).await?;
        Ok(!deleted.is_empty())
    }

    #[tracing::instrument(name = "Saving order over REST", skip(self))]
    async fn insert_order(&self, order: &NewOrderModel) -> Result<OrderModel, anyhow::Error> {
        let request = self
            .http_client
            .post(self.table_url("orders"))
            .query(&[("select", ORDER_COLUMNS)])
            .header("Prefer", "return=representation")
            .json(&[order]);
        let (orders, _) = self.execute::<Vec<OrderModel>>(request).await?;
        first_row(orders, "inserted order")
    }

    #[tracing::instrument(name = "Saving order item over REST", skip(self))]
    async fn insert_order_item(&self, item: &NewOrderItemModel) -> Result<(), anyhow::Error> {
        let request = self
            .http_client
            .post(self.table_url("order_items"))
            .header("Prefer", "return=minimal")
            .json(&[item]);
        self.execute::<serde_json::Value>(request).await?;
        Ok(())
    }

    #[tracing::instrument(name = "Fetching order over REST", skip(self))]
    async fn fetch_order(&self, id: Uuid) -> Result<Option<OrderModel>, anyhow::Error> {
        let request = self.http_client.get(self.table_url("orders")).query(&[
            ("select", ORDER_COLUMNS.to_string()),
            ("id", format!("eq.{}", id)),
            ("limit", "1".to_string()),
        ]);
        let (orders, _) = self.execute::<Vec<OrderModel>>(request).await?;
        Ok(orders.into_iter().next())
    }

    #[tracing::instrument(name = "Updating order over REST", skip(self))]
    async fn update_order(
        &self,
        id: Uuid,
        patch: &OrderPatchModel,
    ) -> Result<Option<OrderModel>, anyhow::Error> {
        if patch.is_empty() {
            return self.fetch_order(id).await;
        }
        let request = self
            .http_client
            .patch(self.table_url("orders"))
            .query(&[
                ("id", format!("eq.{}", id)),
                ("select", ORDER_COLUMNS.to_string()),
            ])
            .header("Prefer", "return=representation")
            .json(patch);
        let (orders, _) = self.execute::<Vec<OrderModel>>(request).await?;
        Ok(orders.into_iter().next())
    }

    #[tracing::instrument(name = "Fetching order list over REST", skip(self))]
    async fn list_orders(&self, filter: &OrderListFilter) -> Result<OrderPage, anyhow::Error> {
        let mut query: Vec<(&str, String)> = vec![("select", ORDER_COLUMNS.to_string())];
        if let Some(status) = &filter.status {
            query.push(("status", format!("eq.{}", status)));
        }
        if let Some(search) = &filter.search {
            query.push(("or", order_search_filter(search)));
        }
        if let Some(from) = &filter.created_from {
            query.push(("created_at", format!("gte.{}", from.to_rfc3339())));
        }
        if let Some(to) = &filter.created_to {
            query.push(("created_at", format!("lte.{}", to.to_rfc3339())));
        }
        query.push(("order", "created_at.desc".to_string()));
        query.push(("offset", filter.offset.to_string()));
        query.push(("limit", filter.limit.to_string()));

        let request = self
            .http_client
            .get(self.table_url("orders"))
            .query(&query)
            .header("Prefer", "count=exact");
        let (items, headers) = self.execute::<Vec<OrderModel>>(request).await?;
        let total = parse_total_count(&headers).unwrap_or(items.len() as i64);
        Ok(OrderPage { items, total })
    }
}
