use chrono::Utc;
use uuid::Uuid;

use super::errors::DealError;
use super::models::{DealListFilter, DealModel, DealPatchModel, NewDealModel};
use super::schemas::{DealCreateRequest, DealUpdateRequest};
use crate::configuration::StorefrontConfig;
use crate::constants::DEAL_LIST_LIMIT;
use crate::repository::{is_unique_violation, CommerceRepository};
use crate::routes::shopee::schemas::OpenGraphData;
use crate::shopee_client::ShopeeClient;
use crate::utils::{slug_with_suffix, slugify};

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

pub fn public_deal_filter() -> DealListFilter {
    DealListFilter {
        active_only: true,
        source: None,
        limit: DEAL_LIST_LIMIT,
    }
}

pub fn admin_deal_filter(source: Option<&str>) -> DealListFilter {
    DealListFilter {
        active_only: false,
        source: non_blank(source),
        limit: DEAL_LIST_LIMIT,
    }
}

/// Title and image of the source page. Scrape failures only get logged.
#[tracing::instrument(skip(client))]
pub async fn scrape_source(client: &ShopeeClient, source_url: Option<&str>) -> OpenGraphData {
    let Some(source_url) = non_blank(source_url) else {
        return OpenGraphData::default();
    };
    match client.fetch_open_graph(&source_url).await {
        Ok(data) => data,
        Err(e) => {
            tracing::error!(error = ?e, "Open Graph scrape failed");
            OpenGraphData::default()
        }
    }
}

/// Slug derived from the deal name, or the link when there is no name.
pub fn base_slug(name: Option<&str>, affiliate_link: &str) -> String {
    let slug = slugify(name.unwrap_or(affiliate_link));
    if slug.is_empty() {
        Uuid::new_v4().to_string()
    } else {
        slug
    }
}

pub async fn resolve_unique_slug(
    repository: &dyn CommerceRepository,
    slug: String,
) -> Result<String, anyhow::Error> {
    if repository.fetch_deal_by_slug(&slug).await?.is_some() {
        return Ok(slug_with_suffix(&slug));
    }
    Ok(slug)
}

pub fn build_new_deal(
    body: &DealCreateRequest,
    affiliate_link: String,
    scraped: OpenGraphData,
    slug: String,
    config: &StorefrontConfig,
) -> NewDealModel {
    NewDealModel {
        name: non_blank(body.name.as_deref())
            .or(scraped.title)
            .unwrap_or_else(|| config.default_deal_name.clone()),
        slug,
        category: Some(
            non_blank(body.category.as_deref()).unwrap_or_else(|| config.default_category.clone()),
        ),
        price: body.price.unwrap_or(0),
        old_price: None,
        image: Some(
            non_blank(body.image.as_deref())
                .or(scraped.image)
                .unwrap_or_else(|| config.fallback_image.clone()),
        ),
        active: true,
        affiliate_link,
        source: non_blank(body.source.as_deref()),
        source_url: non_blank(body.source_url.as_deref()),
        updated_at: Utc::now(),
    }
}

#[tracing::instrument(skip(repository, shopee_client, config))]
pub async fn create_deal(
    repository: &dyn CommerceRepository,
    shopee_client: &ShopeeClient,
    config: &StorefrontConfig,
    body: &DealCreateRequest,
) -> Result<DealModel, DealError> {
    let affiliate_link = non_blank(body.affiliate_link.as_deref())
        .ok_or_else(|| DealError::ValidationError("affiliate_link is required".to_string()))?;
    let scraped = scrape_source(shopee_client, body.source_url.as_deref()).await;
    let name = non_blank(body.name.as_deref()).or_else(|| scraped.title.clone());
    let base = base_slug(name.as_deref(), &affiliate_link);
    let slug = resolve_unique_slug(repository, base.clone())
        .await
        .map_err(|e| DealError::DatabaseError("Failed to check deal slug".to_string(), e))?;
    let deal = build_new_deal(body, affiliate_link, scraped, slug, config);
    match repository.insert_deal(&deal).await {
        Ok(saved) => Ok(saved),
        Err(e) if is_unique_violation(&e) => {
            tracing::warn!(slug = %deal.slug, "Deal slug was taken meanwhile, retrying with a suffix");
            let retry = NewDealModel {
                slug: slug_with_suffix(&base),
                ..deal
            };
            repository
                .insert_deal(&retry)
                .await
                .map_err(|e| slug_write_error(e, &retry.slug, "Failed to save deal"))
        }
        Err(e) => Err(DealError::DatabaseError("Failed to save deal".to_string(), e)),
    }
}

fn slug_write_error(error: anyhow::Error, slug: &str, message: &str) -> DealError {
    if is_unique_violation(&error) {
        DealError::SlugConflictError(format!("Slug {} is already used by another deal", slug))
    } else {
        DealError::DatabaseError(message.to_string(), error)
    }
}

pub fn build_deal_patch(body: &DealUpdateRequest) -> DealPatchModel {
    DealPatchModel {
        name: body.name.clone(),
        slug: body.slug.clone(),
        price: body.price,
        old_price: body.old_price,
        image: body.image.clone(),
        category: body.category.clone(),
        active: body.active,
        affiliate_link: body.affiliate_link.clone(),
        source: body.source.clone(),
        source_url: body.source_url.clone(),
        updated_at: Utc::now(),
    }
}

#[tracing::instrument(skip(repository))]
pub async fn update_deal(
    repository: &dyn CommerceRepository,
    body: &DealUpdateRequest,
) -> Result<DealModel, DealError> {
    let id = body
        .id
        .ok_or_else(|| DealError::ValidationError("id is required".to_string()))?;
    if let Some(slug) = &body.slug {
        let existing = repository
            .fetch_deal_by_slug(slug)
            .await
            .map_err(|e| DealError::DatabaseError("Failed to check deal slug".to_string(), e))?;
        if existing.is_some_and(|deal| deal.id != id) {
            return Err(DealError::SlugConflictError(format!(
                "Slug {} is already used by another deal",
                slug
            )));
        }
    }
    repository
        .update_deal(id, &build_deal_patch(body))
        .await
        .map_err(|e| {
            slug_write_error(e, body.slug.as_deref().unwrap_or_default(), "Failed to update deal")
        })?
        .ok_or_else(|| DealError::NotFoundError(format!("Deal {} not found", id)))
}

#[tracing::instrument(skip(repository))]
pub async fn delete_deal(
    repository: &dyn CommerceRepository,
    id: Option<Uuid>,
) -> Result<(), DealError> {
    let id = id.ok_or_else(|| DealError::ValidationError("id is required".to_string()))?;
    let deleted = repository
        .delete_deal(id)
        .await
        .map_err(|e| DealError::DatabaseError("Failed to delete deal".to_string(), e))?;
    if !deleted {
        return Err(DealError::NotFoundError(format!("Deal {} not found", id)));
    }
    Ok(())
}

/// Where `/api/go/{slug}` should send the shopper.
#[tracing::instrument(skip(repository))]
pub async fn redirect_location(repository: &dyn CommerceRepository, slug: &str) -> String {
    match repository.fetch_deal_by_slug(slug).await {
        Ok(Some(deal)) => deal
            .redirect_target()
            .map(str::to_string)
            .unwrap_or_else(|| "/".to_string()),
        Ok(None) => "/".to_string(),
        Err(e) => {
            tracing::error!(error = ?e, "Failed to look up deal for redirect");
            "/".to_string()
        }
    }
}
