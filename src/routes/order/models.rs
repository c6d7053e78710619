use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::schemas::{DealSnapshot, Order, OrderStatus, TransferSubmission};

#[derive(Debug, Clone, Deserialize, FromRow, PartialEq)]
pub struct OrderModel {
    pub id: Uuid,
    pub guest_id: Option<String>,
    pub contact_email: Option<String>,
    pub service_code: Option<String>,
    pub target_url: Option<String>,
    pub payment_method: Option<String>,
    pub subtotal_vnd: Option<i64>,
    pub discount_vnd: Option<i64>,
    pub total_vnd: Option<i64>,
    pub status: OrderStatus,
    pub note: Option<String>,
    pub transfer_submitted_at: Option<DateTime<Utc>>,
    pub transfer_note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl OrderModel {
    pub fn into_schema(self) -> Order {
        Order {
            id: self.id,
            guest_id: self.guest_id,
            contact_email: self.contact_email,
            service_code: self.service_code,
            target_url: self.target_url,
            payment_method: self.payment_method,
            subtotal_vnd: self.subtotal_vnd,
            discount_vnd: self.discount_vnd,
            total_vnd: self.total_vnd,
            status: self.status,
            note: self.note,
            transfer_submitted_at: self.transfer_submitted_at,
            transfer_note: self.transfer_note,
            created_at: self.created_at,
        }
    }

    pub fn transfer_submission(&self) -> TransferSubmission {
        TransferSubmission {
            id: self.id,
            status: self.status,
            transfer_submitted_at: self.transfer_submitted_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewOrderModel {
    pub guest_id: Option<String>,
    pub service_code: Option<String>,
    pub target_url: Option<String>,
    pub subtotal_vnd: Option<i64>,
    pub total_vnd: Option<i64>,
    pub status: OrderStatus,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewOrderItemModel {
    pub order_id: Uuid,
    pub deal_id: Uuid,
    pub deal_snapshot: DealSnapshot,
    pub unit_price_vnd: i64,
    pub quantity: i64,
}

/// Partial update of an order. `None` leaves the column untouched; for the
/// nullable columns `Some(None)` clears it.
#[derive(Debug, Clone, Serialize, Default, PartialEq)]
pub struct OrderPatchModel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfer_submitted_at: Option<Option<DateTime<Utc>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfer_note: Option<Option<String>>,
}

impl OrderPatchModel {
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.note.is_none()
            && self.payment_method.is_none()
            && self.transfer_submitted_at.is_none()
            && self.transfer_note.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct OrderListFilter {
    pub status: Option<OrderStatus>,
    pub search: Option<String>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
    pub offset: i64,
    pub limit: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderPage {
    pub items: Vec<OrderModel>,
    pub total: i64,
}
