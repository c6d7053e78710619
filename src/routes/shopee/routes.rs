use actix_web::web;

use super::handlers::{open_graph, open_graph_post, resolve_image, resolve_image_headless};

pub fn shopee_route(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/utils/shopee-image").route(web::get().to(resolve_image)));
    cfg.service(
        web::resource("/utils/shopee-image-headless")
            .route(web::get().to(resolve_image_headless)),
    );
    cfg.service(
        web::resource("/shopee/og")
            .route(web::get().to(open_graph))
            .route(web::post().to(open_graph_post)),
    );
}
