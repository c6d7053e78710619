use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::impl_json_request;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "order_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    PaidPendingVerify,
    Processing,
    Paid,
    Completed,
    #[serde(alias = "cancelled")]
    Canceled,
    Refunded,
    Failed,
}

impl OrderStatus {
    /// Statuses a customer may set through `PATCH /api/orders/{id}`.
    pub const CUSTOMER_SETTABLE: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Paid,
        OrderStatus::Failed,
        OrderStatus::Canceled,
        OrderStatus::Processing,
        OrderStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::PaidPendingVerify => "paid_pending_verify",
            OrderStatus::Processing => "processing",
            OrderStatus::Paid => "paid",
            OrderStatus::Completed => "completed",
            OrderStatus::Canceled => "canceled",
            OrderStatus::Refunded => "refunded",
            OrderStatus::Failed => "failed",
        }
    }

    pub fn is_customer_settable(&self) -> bool {
        Self::CUSTOMER_SETTABLE.contains(self)
    }

    /// Moving to one of these means the customer reports the transfer as sent.
    pub fn stamps_transfer_submission(&self) -> bool {
        matches!(self, OrderStatus::Processing | OrderStatus::Paid)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "paid_pending_verify" => Ok(OrderStatus::PaidPendingVerify),
            "processing" => Ok(OrderStatus::Processing),
            "paid" => Ok(OrderStatus::Paid),
            "completed" => Ok(OrderStatus::Completed),
            "canceled" | "cancelled" => Ok(OrderStatus::Canceled),
            "refunded" => Ok(OrderStatus::Refunded),
            "failed" => Ok(OrderStatus::Failed),
            other => Err(format!("Invalid order status: {}", other)),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct Order {
    #[schema(value_type = String)]
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

#[derive(Deserialize, Debug, ToSchema, Validate)]
pub struct ServiceOrderRequest {
    #[validate(length(min = 1, message = "service_code is required"))]
    pub service_code: String,
    #[validate(range(min = 1, message = "price_vnd must be greater than zero"))]
    pub price_vnd: i64,
    #[validate(url(message = "target_url must be a valid URL"))]
    pub target_url: String,
}
impl_json_request!(ServiceOrderRequest);

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct OrderCreatedData {
    #[schema(value_type = String)]
    pub order_id: Uuid,
}

fn default_quantity() -> i64 {
    1
}

#[derive(Deserialize, Debug, ToSchema, Validate)]
pub struct CheckoutRequest {
    #[validate(length(min = 1, message = "slug is required"))]
    pub slug: String,
    #[serde(default = "default_quantity")]
    #[validate(range(min = 1, max = 1000, message = "qty must be between 1 and 1000"))]
    pub qty: i64,
    pub guest_id: Option<String>,
}
impl_json_request!(CheckoutRequest);

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct CheckoutData {
    #[schema(value_type = String)]
    pub order_id: Uuid,
    pub total_vnd: i64,
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, ToSchema, PartialEq)]
pub struct DealSnapshot {
    pub name: String,
    pub image: Option<String>,
    pub slug: String,
    pub price: i64,
}

#[derive(Deserialize, Debug, ToSchema, Validate)]
pub struct OrderStatusUpdateRequest {
    pub status: Option<OrderStatus>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub transfer_note: Option<Option<String>>,
}
impl_json_request!(OrderStatusUpdateRequest);

#[derive(Deserialize, Debug, ToSchema, Validate)]
pub struct ConfirmTransferRequest {
    #[schema(value_type = String)]
    pub order_id: Uuid,
    pub note: Option<String>,
}
impl_json_request!(ConfirmTransferRequest);

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct TransferSubmission {
    #[schema(value_type = String)]
    pub id: Uuid,
    pub status: OrderStatus,
    pub transfer_submitted_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct ConfirmTransferData {
    pub ok: bool,
    pub order: TransferSubmission,
}

#[derive(Serialize, Deserialize, Debug, ToSchema, PartialEq)]
pub struct PaymentInstruction {
    #[schema(value_type = String)]
    pub order_id: Uuid,
    pub amount_vnd: i64,
    pub add_info: String,
    pub qr_url: String,
    pub bank_name: String,
    pub account: String,
    pub account_name: String,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct AdminOrderListQuery {
    pub page: Option<i64>,
    #[serde(alias = "pageSize")]
    pub page_size: Option<i64>,
    pub status: Option<String>,
    pub q: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct OrderListData {
    pub items: Vec<Order>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
}

#[derive(Deserialize, Debug, ToSchema, Validate)]
pub struct AdminOrderUpdateRequest {
    #[schema(value_type = Option<String>)]
    pub id: Option<Uuid>,
    pub status: Option<OrderStatus>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub note: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub payment_method: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub transfer_submitted_at: Option<Option<DateTime<Utc>>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub transfer_note: Option<Option<String>>,
}
impl_json_request!(AdminOrderUpdateRequest);

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct OrderItemData {
    pub item: Order,
}
