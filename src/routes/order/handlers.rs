use actix_web::web;
use uuid::Uuid;

use super::schemas::{
    AdminOrderListQuery, AdminOrderUpdateRequest, CheckoutData, CheckoutRequest,
    ConfirmTransferData, ConfirmTransferRequest, OrderCreatedData, OrderItemData, OrderListData,
    OrderStatusUpdateRequest, PaymentInstruction, ServiceOrderRequest,
};
use super::utils::{
    admin_update_order, checkout, confirm_transfer, create_service_order, list_admin_orders,
    payment_instructions, update_order_status,
};
use crate::configuration::BankConfig;
use crate::errors::GenericError;
use crate::repository::CommerceRepository;
use crate::schemas::{GenericResponse, OkData};

#[utoipa::path(
    post,
    path = "/api/orders",
    tag = "Orders",
    request_body(content = ServiceOrderRequest, description = "Request Body"),
    responses(
        (status=200, description= "Service order created", body= GenericResponse<OrderCreatedData>),
    )
)]
#[tracing::instrument(name = "Create service order", skip(repository), fields(service_code = %body.service_code))]
pub async fn create_service_order_req(
    body: ServiceOrderRequest,
    repository: web::Data<dyn CommerceRepository>,
) -> Result<web::Json<GenericResponse<OrderCreatedData>>, GenericError> {
    let order = create_service_order(repository.get_ref(), &body).await?;
    Ok(web::Json(GenericResponse::success(
        "Successfully created order",
        Some(OrderCreatedData { order_id: order.id }),
    )))
}

#[utoipa::path(
    post,
    path = "/api/checkout",
    tag = "Orders",
    request_body(content = CheckoutRequest, description = "Request Body"),
    responses(
        (status=200, description= "Deal checkout", body= GenericResponse<CheckoutData>),
    )
)]
#[tracing::instrument(name = "Checkout", skip(repository), fields(slug = %body.slug))]
pub async fn checkout_req(
    body: CheckoutRequest,
    repository: web::Data<dyn CommerceRepository>,
) -> Result<web::Json<GenericResponse<CheckoutData>>, GenericError> {
    let data = checkout(repository.get_ref(), &body).await?;
    Ok(web::Json(GenericResponse::success(
        "Successfully placed order",
        Some(data),
    )))
}

#[utoipa::path(
    patch,
    path = "/api/orders/{id}",
    tag = "Orders",
    request_body(content = OrderStatusUpdateRequest, description = "Request Body"),
    params(("id" = String, Path, description = "Order id")),
    responses(
        (status=200, description= "Order updated", body= GenericResponse<OkData>),
    )
)]
#[tracing::instrument(name = "Update order status", skip(repository))]
pub async fn update_order_status_req(
    path: web::Path<Uuid>,
    body: OrderStatusUpdateRequest,
    repository: web::Data<dyn CommerceRepository>,
) -> Result<web::Json<GenericResponse<OkData>>, GenericError> {
    update_order_status(repository.get_ref(), path.into_inner(), &body).await?;
    Ok(web::Json(GenericResponse::success(
        "Successfully updated order",
        Some(OkData::new()),
    )))
}

#[utoipa::path(
    post,
    path = "/api/orders/confirm-transfer",
    tag = "Orders",
    request_body(content = ConfirmTransferRequest, description = "Request Body"),
    responses(
        (status=200, description= "Transfer reported", body= GenericResponse<ConfirmTransferData>),
    )
)]
#[tracing::instrument(name = "Confirm transfer", skip(repository), fields(order_id = %body.order_id))]
pub async fn confirm_transfer_req(
    body: ConfirmTransferRequest,
    repository: web::Data<dyn CommerceRepository>,
) -> Result<web::Json<GenericResponse<ConfirmTransferData>>, GenericError> {
    let order = confirm_transfer(repository.get_ref(), &body).await?;
    Ok(web::Json(GenericResponse::success(
        "Successfully submitted transfer",
        Some(ConfirmTransferData {
            ok: true,
            order: order.transfer_submission(),
        }),
    )))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}/payment",
    tag = "Orders",
    params(("id" = String, Path, description = "Order id")),
    responses(
        (status=200, description= "VietQR transfer instructions", body= GenericResponse<PaymentInstruction>),
    )
)]
#[tracing::instrument(name = "Payment instructions", skip(repository, bank))]
pub async fn payment_instructions_req(
    path: web::Path<Uuid>,
    repository: web::Data<dyn CommerceRepository>,
    bank: web::Data<BankConfig>,
) -> Result<web::Json<GenericResponse<PaymentInstruction>>, GenericError> {
    let instruction = payment_instructions(repository.get_ref(), path.into_inner(), &bank).await?;
    Ok(web::Json(GenericResponse::success(
        "Successfully generated payment instructions",
        Some(instruction),
    )))
}

#[utoipa::path(
    get,
    path = "/api/admin/orders",
    tag = "Orders Admin",
    params(
        ("x-admin-key" = String, Header, description = "Admin key"),
        ("page" = Option<i64>, Query, description = "Page, starting at 1"),
        ("page_size" = Option<i64>, Query, description = "Between 1 and 100"),
        ("status" = Option<String>, Query, description = "Order status"),
        ("q" = Option<String>, Query, description = "Contact email or guest id"),
        ("from" = Option<String>, Query, description = "Created at or after"),
        ("to" = Option<String>, Query, description = "Created at or before"),
    ),
    responses(
        (status=200, description= "Orders, newest first", body= GenericResponse<OrderListData>),
    )
)]
#[tracing::instrument(name = "List admin orders", skip(repository))]
pub async fn list_admin_orders_req(
    query: web::Query<AdminOrderListQuery>,
    repository: web::Data<dyn CommerceRepository>,
) -> Result<web::Json<GenericResponse<OrderListData>>, GenericError> {
    let data = list_admin_orders(repository.get_ref(), &query).await?;
    Ok(web::Json(GenericResponse::success(
        "Successfully fetched orders",
        Some(data),
    )))
}

#[utoipa::path(
    patch,
    path = "/api/admin/orders",
    tag = "Orders Admin",
    request_body(content = AdminOrderUpdateRequest, description = "Request Body"),
    params(("x-admin-key" = String, Header, description = "Admin key")),
    responses(
        (status=200, description= "Updated order", body= GenericResponse<OrderItemData>),
    )
)]
#[tracing::instrument(name = "Admin update order", skip(repository))]
pub async fn admin_update_order_req(
    body: AdminOrderUpdateRequest,
    repository: web::Data<dyn CommerceRepository>,
) -> Result<web::Json<GenericResponse<OrderItemData>>, GenericError> {
    let order = admin_update_order(repository.get_ref(), &body).await?;
    Ok(web::Json(GenericResponse::success(
        "Successfully updated order",
        Some(OrderItemData {
            item: order.into_schema(),
        }),
    )))
}
