use actix_web::web;

use super::handlers::{
    admin_update_order_req, checkout_req, confirm_transfer_req, create_service_order_req,
    list_admin_orders_req, payment_instructions_req, update_order_status_req,
};
use crate::middleware::RequireAdmin;

pub fn order_route(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/orders").route(web::post().to(create_service_order_req)));
    cfg.service(
        web::resource("/orders/confirm-transfer").route(web::post().to(confirm_transfer_req)),
    );
    cfg.service(web::resource("/orders/{id}").route(web::patch().to(update_order_status_req)));
    cfg.service(
        web::resource("/orders/{id}/payment").route(web::get().to(payment_instructions_req)),
    );
    cfg.service(web::resource("/checkout").route(web::post().to(checkout_req)));
}

pub fn admin_order_route(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/orders")
            .route(web::get().to(list_admin_orders_req))
            .route(web::patch().to(admin_update_order_req))
            .wrap(RequireAdmin),
    );
}
