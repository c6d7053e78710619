use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::schemas::Deal;

/// Row of the `deals` table. `active` is stored as `is_active`.
#[derive(Debug, Clone, Deserialize, FromRow, PartialEq)]
pub struct DealModel {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub price: i64,
    pub old_price: Option<i64>,
    pub image: Option<String>,
    pub category: Option<String>,
    #[sqlx(rename = "is_active")]
    #[serde(alias = "is_active")]
    pub active: bool,
    pub affiliate_link: Option<String>,
    pub source: Option<String>,
    pub source_url: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl DealModel {
    pub fn into_schema(self) -> Deal {
        Deal {
            id: self.id,
            slug: self.slug,
            name: self.name,
            price: self.price,
            old_price: self.old_price,
            image: self.image,
            category: self.category,
            active: self.active,
            affiliate_link: self.affiliate_link,
            source: self.source,
            source_url: self.source_url,
            updated_at: self.updated_at,
        }
    }

    /// Only active deals with a non-empty link can be redirected to.
    pub fn redirect_target(&self) -> Option<&str> {
        if !self.active {
            return None;
        }
        self.affiliate_link
            .as_deref()
            .map(str::trim)
            .filter(|link| !link.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewDealModel {
    pub name: String,
    pub slug: String,
    pub category: Option<String>,
    pub price: i64,
    pub old_price: Option<i64>,
    pub image: Option<String>,
    #[serde(rename = "is_active")]
    pub active: bool,
    pub affiliate_link: String,
    pub source: Option<String>,
    pub source_url: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update of a deal. `None` leaves the column untouched; for the
/// nullable columns `Some(None)` clears it.
#[derive(Debug, Clone, Serialize, Default, PartialEq)]
pub struct DealPatchModel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_price: Option<Option<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Option<String>>,
    #[serde(rename = "is_active", skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affiliate_link: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<Option<String>>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DealListFilter {
    pub active_only: bool,
    pub source: Option<String>,
    pub limit: i64,
}
