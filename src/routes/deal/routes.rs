use actix_web::web;

use super::handlers::{
    create_deal_req, delete_deal_req, go_redirect, list_admin_deals, list_public_deals,
    update_deal_req,
};
use crate::middleware::RequireAdmin;

pub fn deal_route(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/deals").route(web::get().to(list_public_deals)));
    cfg.service(web::resource("/go/{slug}").route(web::get().to(go_redirect)));
}

pub fn admin_deal_route(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/deals")
            .route(web::get().to(list_admin_deals))
            .route(web::post().to(create_deal_req))
            .route(web::patch().to(update_deal_req))
            .route(web::delete().to(delete_deal_req))
            .wrap(RequireAdmin),
    );
}
