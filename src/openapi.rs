use utoipa::OpenApi;

use crate::routes::deal::handlers::{
    __path_create_deal_req, __path_delete_deal_req, __path_go_redirect, __path_list_admin_deals,
    __path_list_public_deals, __path_update_deal_req,
};
use crate::routes::deal::schemas::{
    Deal, DealCreateRequest, DealIdQuery, DealItemData, DealListData, DealUpdateRequest,
};
use crate::routes::order::handlers::{
    __path_admin_update_order_req, __path_checkout_req, __path_confirm_transfer_req,
    __path_create_service_order_req, __path_list_admin_orders_req,
    __path_payment_instructions_req, __path_update_order_status_req,
};
use crate::routes::order::schemas::{
    AdminOrderUpdateRequest, CheckoutData, CheckoutRequest, ConfirmTransferData,
    ConfirmTransferRequest, DealSnapshot, Order, OrderCreatedData, OrderItemData, OrderListData,
    OrderStatus, OrderStatusUpdateRequest, PaymentInstruction, ServiceOrderRequest,
    TransferSubmission,
};
use crate::routes::shopee::handlers::{
    __path_open_graph, __path_open_graph_post, __path_resolve_image,
    __path_resolve_image_headless,
};
use crate::routes::shopee::schemas::{
    ImageResolveData, ImageTraceData, OpenGraphData, OpenGraphRequest, TraceStep,
};
use crate::routes::util::handlers::__path_env_check;
use crate::routes::util::schemas::EnvCheckData;
use crate::schemas::OkData;

#[derive(OpenApi)]
#[openapi(
    paths(
        list_public_deals,
        list_admin_deals,
        create_deal_req,
        update_deal_req,
        delete_deal_req,
        go_redirect,
        create_service_order_req,
        checkout_req,
        update_order_status_req,
        confirm_transfer_req,
        payment_instructions_req,
        list_admin_orders_req,
        admin_update_order_req,
        resolve_image,
        resolve_image_headless,
        open_graph,
        open_graph_post,
        env_check,
    ),
    components(schemas(
        OkData,
        Deal,
        DealListData,
        DealItemData,
        DealCreateRequest,
        DealUpdateRequest,
        DealIdQuery,
        Order,
        OrderStatus,
        OrderCreatedData,
        OrderItemData,
        OrderListData,
        ServiceOrderRequest,
        CheckoutRequest,
        CheckoutData,
        DealSnapshot,
        OrderStatusUpdateRequest,
        ConfirmTransferRequest,
        ConfirmTransferData,
        TransferSubmission,
        PaymentInstruction,
        AdminOrderUpdateRequest,
        TraceStep,
        ImageResolveData,
        ImageTraceData,
        OpenGraphData,
        OpenGraphRequest,
        EnvCheckData,
    )),
    tags(
        (name = "Deal Storefront REST API", description = "Deal storefront and order API endpoints")
    ),
)]
pub struct ApiDoc {}
