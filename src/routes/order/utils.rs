use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

use super::errors::OrderError;
use super::models::{NewOrderItemModel, NewOrderModel, OrderListFilter, OrderModel, OrderPatchModel};
use super::schemas::{
    AdminOrderListQuery, AdminOrderUpdateRequest, CheckoutData, CheckoutRequest,
    ConfirmTransferRequest, DealSnapshot, OrderListData, OrderStatus, OrderStatusUpdateRequest,
    PaymentInstruction, ServiceOrderRequest,
};
use crate::configuration::BankConfig;
use crate::constants::{
    BANK_PAYMENT_METHOD, ORDER_PAGE_SIZE_DEFAULT, ORDER_PAGE_SIZE_MAX, VIETQR_IMAGE_BASE,
};
use crate::repository::CommerceRepository;

fn order_not_found(id: Uuid) -> OrderError {
    OrderError::NotFoundError(format!("Order {} not found", id))
}

#[tracing::instrument(skip(repository))]
pub async fn create_service_order(
    repository: &dyn CommerceRepository,
    body: &ServiceOrderRequest,
) -> Result<OrderModel, OrderError> {
    let order = NewOrderModel {
        guest_id: None,
        service_code: Some(body.service_code.trim().to_string()),
        target_url: Some(body.target_url.trim().to_string()),
        subtotal_vnd: Some(body.price_vnd),
        total_vnd: Some(body.price_vnd),
        status: OrderStatus::Pending,
    };
    repository
        .insert_order(&order)
        .await
        .map_err(|e| OrderError::DatabaseError("Failed to create order".to_string(), e))
}

#[tracing::instrument(skip(repository))]
pub async fn checkout(
    repository: &dyn CommerceRepository,
    body: &CheckoutRequest,
) -> Result<CheckoutData, OrderError> {
    let deal = repository
        .fetch_deal_by_slug(body.slug.trim())
        .await
        .map_err(|e| OrderError::DatabaseError("Failed to fetch deal".to_string(), e))?
        .filter(|deal| deal.active)
        .ok_or_else(|| OrderError::NotFoundError(format!("Deal {} not found", body.slug)))?;

    let subtotal = deal
        .price
        .checked_mul(body.qty)
        .ok_or_else(|| OrderError::ValidationError("Order total is too large".to_string()))?;
    let total = subtotal;

    let order = repository
        .insert_order(&NewOrderModel {
            guest_id: body.guest_id.clone(),
            service_code: None,
            target_url: None,
            subtotal_vnd: Some(subtotal),
            total_vnd: Some(total),
            status: OrderStatus::Pending,
        })
        .await
        .map_err(|e| OrderError::DatabaseError("Failed to create order".to_string(), e))?;

    let item = NewOrderItemModel {
        order_id: order.id,
        deal_id: deal.id,
        deal_snapshot: DealSnapshot {
            name: deal.name.clone(),
            image: deal.image.clone(),
            slug: deal.slug.clone(),
            price: deal.price,
        },
        unit_price_vnd: deal.price,
        quantity: body.qty,
    };
    if let Err(e) = repository.insert_order_item(&item).await {
        tracing::error!(error = ?e, order_id = %order.id, "Failed to save order item");
    }

    Ok(CheckoutData {
        order_id: order.id,
        total_vnd: total,
        name: deal.name,
    })
}

pub fn build_customer_patch(
    body: &OrderStatusUpdateRequest,
    now: DateTime<Utc>,
) -> Result<OrderPatchModel, OrderError> {
    let mut patch = OrderPatchModel::default();
    if let Some(status) = body.status {
        if !status.is_customer_settable() {
            let allowed: Vec<&str> = OrderStatus::CUSTOMER_SETTABLE
                .iter()
                .map(|status| status.as_str())
                .collect();
            return Err(OrderError::ValidationError(format!(
                "Invalid status. Allowed: {}",
                allowed.join(", ")
            )));
        }
        patch.status = Some(status);
        if status.stamps_transfer_submission() {
            patch.transfer_submitted_at = Some(Some(now));
        }
    }
    patch.transfer_note = body.transfer_note.clone();
    Ok(patch)
}

#[tracing::instrument(skip(repository))]
pub async fn update_order_status(
    repository: &dyn CommerceRepository,
    id: Uuid,
    body: &OrderStatusUpdateRequest,
) -> Result<OrderModel, OrderError> {
    let patch = build_customer_patch(body, Utc::now())?;
    repository
        .update_order(id, &patch)
        .await
        .map_err(|e| OrderError::DatabaseError("Failed to update order".to_string(), e))?
        .ok_or_else(|| order_not_found(id))
}

pub fn confirm_transfer_patch(note: Option<String>, now: DateTime<Utc>) -> OrderPatchModel {
    OrderPatchModel {
        status: Some(OrderStatus::PaidPendingVerify),
        note: None,
        payment_method: Some(Some(BANK_PAYMENT_METHOD.to_string())),
        transfer_submitted_at: Some(Some(now)),
        transfer_note: Some(note),
    }
}

#[tracing::instrument(skip(repository))]
pub async fn confirm_transfer(
    repository: &dyn CommerceRepository,
    body: &ConfirmTransferRequest,
) -> Result<OrderModel, OrderError> {
    let patch = confirm_transfer_patch(body.note.clone(), Utc::now());
    repository
        .update_order(body.order_id, &patch)
        .await
        .map_err(|e| OrderError::DatabaseError("Failed to confirm transfer".to_string(), e))?
        .ok_or_else(|| order_not_found(body.order_id))
}

/// VietQR bank transfer instructions for an order.
pub fn build_payment_instruction(
    order: &OrderModel,
    bank: &BankConfig,
) -> Result<PaymentInstruction, OrderError> {
    if !bank.is_configured() {
        return Err(OrderError::ConfigurationError(
            "Bank transfer details are not configured (bank.bin, bank.account)".to_string(),
        ));
    }
    let amount_vnd = order.total_vnd.unwrap_or(0);
    let add_info = format!("ORDER {}", order.id);
    let qr_url = reqwest::Url::parse_with_params(
        &format!(
            "{}/{}-{}-compact2.png",
            VIETQR_IMAGE_BASE,
            bank.bin.trim(),
            bank.account.trim()
        ),
        &[("amount", amount_vnd.to_string()), ("addInfo", add_info.clone())],
    )
    .map_err(|e| OrderError::ConfigurationError(format!("Invalid VietQR url: {}", e)))?;
    Ok(PaymentInstruction {
        order_id: order.id,
        amount_vnd,
        add_info,
        qr_url: qr_url.to_string(),
        bank_name: bank.bank_name.clone(),
        account: bank.account.trim().to_string(),
        account_name: bank.account_name.clone(),
    })
}

#[tracing::instrument(skip(repository, bank))]
pub async fn payment_instructions(
    repository: &dyn CommerceRepository,
    id: Uuid,
    bank: &BankConfig,
) -> Result<PaymentInstruction, OrderError> {
    let order = repository
        .fetch_order(id)
        .await
        .map_err(|e| OrderError::DatabaseError("Failed to fetch order".to_string(), e))?
        .ok_or_else(|| order_not_found(id))?;
    build_payment_instruction(&order, bank)
}

/// RFC 3339 timestamp, also when an unencoded `+` offset reached us as a space.
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .or_else(|e| match value.rsplit_once(' ') {
            Some((head, offset)) if head.contains(':') => {
                DateTime::parse_from_rfc3339(&format!("{}+{}", head, offset))
            }
            _ => Err(e),
        })
        .ok()
        .map(|timestamp| timestamp.with_timezone(&Utc))
}

/// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates; a plain date
/// covers the whole day.
pub fn parse_date_bound(
    value: Option<&str>,
    end_of_day: bool,
) -> Result<Option<DateTime<Utc>>, OrderError> {
    let Some(value) = value.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };
    if let Some(timestamp) = parse_timestamp(value) {
        return Ok(Some(timestamp));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| OrderError::ValidationError(format!("Invalid date: {}", value)))?;
    let time = if end_of_day {
        NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999)
    } else {
        Some(NaiveTime::MIN)
    }
    .ok_or_else(|| OrderError::ValidationError(format!("Invalid date: {}", value)))?;
    Ok(Some(date.and_time(time).and_utc()))
}

pub fn clamp_page(page: Option<i64>, page_size: Option<i64>) -> (i64, i64) {
    let page = page.unwrap_or(1).max(1);
    let page_size = page_size
        .unwrap_or(ORDER_PAGE_SIZE_DEFAULT)
        .clamp(1, ORDER_PAGE_SIZE_MAX);
    (page, page_size)
}

pub fn build_order_list_filter(
    query: &AdminOrderListQuery,
) -> Result<(OrderListFilter, i64, i64), OrderError> {
    let (page, page_size) = clamp_page(query.page, query.page_size);
    let status = match query.status.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(status) => Some(OrderStatus::from_str(status).map_err(OrderError::ValidationError)?),
    };
    let filter = OrderListFilter {
        status,
        search: query
            .q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_string),
        created_from: parse_date_bound(query.from.as_deref(), false)?,
        created_to: parse_date_bound(query.to.as_deref(), true)?,
        offset: (page - 1).saturating_mul(page_size),
        limit: page_size,
    };
    Ok((filter, page, page_size))
}

#[tracing::instrument(skip(repository))]
pub async fn list_admin_orders(
    repository: &dyn CommerceRepository,
    query: &AdminOrderListQuery,
) -> Result<OrderListData, OrderError> {
    let (filter, page, page_size) = build_order_list_filter(query)?;
    let result = repository
        .list_orders(&filter)
        .await
        .map_err(|e| OrderError::DatabaseError("Failed to fetch orders".to_string(), e))?;
    Ok(OrderListData {
        items: result
            .items
            .into_iter()
            .map(|order| order.into_schema())
            .collect(),
        total: result.total,
        page,
        page_size,
    })
}

pub fn build_admin_patch(body: &AdminOrderUpdateRequest) -> OrderPatchModel {
    OrderPatchModel {
        status: body.status,
        note: body.note.clone(),
        payment_method: body.payment_method.clone(),
        transfer_submitted_at: body.transfer_submitted_at,
        transfer_note: body.transfer_note.clone(),
    }
}

#[tracing::instrument(skip(repository))]
pub async fn admin_update_order(
    repository: &dyn CommerceRepository,
    body: &AdminOrderUpdateRequest,
) -> Result<OrderModel, OrderError> {
    let id = body
        .id
        .ok_or_else(|| OrderError::ValidationError("id is required".to_string()))?;
    let patch = build_admin_patch(body);
    if patch.is_empty() {
        return Err(OrderError::ValidationError(
            "No fields to update".to_string(),
        ));
    }
    repository
        .update_order(id, &patch)
        .await
        .map_err(|e| OrderError::DatabaseError("Failed to update order".to_string(), e))?
        .ok_or_else(|| order_not_found(id))
}
