use crate::openapi::ApiDoc;
use crate::routes::{
    admin_deal_route, admin_order_route, deal_route, order_route, shopee_route, util_route,
};
use actix_web::web;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub fn main_route(cfg: &mut web::ServiceConfig) {
    let openapi = ApiDoc::openapi();
    cfg.service(SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", openapi))
        .service(web::scope("/util").configure(util_route))
        .service(
            web::scope("/api")
                .service(
                    web::scope("/admin")
                        .configure(admin_deal_route)
                        .configure(admin_order_route),
                )
                .configure(deal_route)
                .configure(order_route)
                .configure(shopee_route),
        );
}
