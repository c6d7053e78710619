use actix_web::web;

use super::handlers::{env_check, health_check};

pub fn util_route(cfg: &mut web::ServiceConfig) {
    cfg.route("/health_check", web::get().to(health_check))
        .route("/env_check", web::get().to(env_check));
}
