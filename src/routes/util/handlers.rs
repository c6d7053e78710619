use actix_web::{web, HttpResponse, Responder};
use secrecy::ExposeSecret;

use super::schemas::EnvCheckData;
use crate::configuration::{Settings, StorageBackend};
use crate::repository::CommerceRepository;
use crate::schemas::GenericResponse;

pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().body("Running Server")
}

pub fn build_env_check(settings: &Settings, backend: &str) -> EnvCheckData {
    let database = &settings.database;
    let rest_url = Some(database.rest.base_url().to_string()).filter(|url| !url.is_empty());
    EnvCheckData {
        backend: backend.to_string(),
        rest_url,
        rest_key_present: !database.rest.service_role_key.expose_secret().is_empty(),
        postgres_host: (database.backend == StorageBackend::Postgres)
            .then(|| database.postgres.host.clone()),
        headless_enabled: settings.headless.enabled,
        bank_configured: settings.bank.is_configured(),
        admin_key_present: !settings.admin.api_key.expose_secret().is_empty(),
    }
}

#[utoipa::path(
    get,
    path = "/util/env_check",
    tag = "Util",
    responses(
        (status=200, description= "Configuration presence report", body= GenericResponse<EnvCheckData>),
    )
)]
#[tracing::instrument(name = "Env check", skip(settings, repository))]
pub async fn env_check(
    settings: web::Data<Settings>,
    repository: web::Data<dyn CommerceRepository>,
) -> web::Json<GenericResponse<EnvCheckData>> {
    web::Json(GenericResponse::success(
        "Successfully checked environment",
        Some(build_env_check(&settings, repository.backend_name())),
    ))
}
