use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::impl_json_request;
use crate::utils::slugify;

#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct Deal {
    #[schema(value_type = String)]
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub price: i64,
    pub old_price: Option<i64>,
    pub image: Option<String>,
    pub category: Option<String>,
    pub active: bool,
    pub affiliate_link: Option<String>,
    pub source: Option<String>,
    pub source_url: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct DealListData {
    pub items: Vec<Deal>,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct DealItemData {
    pub item: Deal,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct DealListQuery {
    pub source: Option<String>,
}

#[derive(Deserialize, Debug, ToSchema, Validate)]
pub struct DealCreateRequest {
    pub affiliate_link: Option<String>,
    #[validate(url(message = "source_url must be a valid URL"))]
    pub source_url: Option<String>,
    pub name: Option<String>,
    pub category: Option<String>,
    #[validate(range(min = 0, message = "price cannot be negative"))]
    pub price: Option<i64>,
    pub image: Option<String>,
    pub source: Option<String>,
}
impl_json_request!(DealCreateRequest);

fn validate_slug(slug: &str) -> Result<(), validator::ValidationError> {
    if slug.is_empty() || slugify(slug) != slug {
        let mut error = validator::ValidationError::new("slug");
        error.message = Some("slug may only contain a-z, 0-9 and -".into());
        return Err(error);
    }
    Ok(())
}

#[derive(Deserialize, Debug, ToSchema, Validate)]
pub struct DealUpdateRequest {
    #[schema(value_type = Option<String>)]
    pub id: Option<Uuid>,
    pub name: Option<String>,
    #[validate(custom(function = "validate_slug"))]
    pub slug: Option<String>,
    #[validate(range(min = 0, message = "price cannot be negative"))]
    pub price: Option<i64>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<i64>)]
    pub old_price: Option<Option<i64>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub image: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub category: Option<Option<String>>,
    pub active: Option<bool>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub affiliate_link: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub source: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub source_url: Option<Option<String>>,
}
impl_json_request!(DealUpdateRequest);

#[derive(Deserialize, Debug, ToSchema)]
pub struct DealIdQuery {
    #[schema(value_type = Option<String>)]
    pub id: Option<Uuid>,
}
