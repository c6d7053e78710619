use std::net::TcpListener;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use tracing_actix_web::TracingLogger;

use crate::configuration::{ApplicationConfig, Settings};
use crate::database::build_repository;
use crate::errors::GenericError;
use crate::headless_client::HeadlessClient;
use crate::repository::CommerceRepository;
use crate::routes::main_route;
use crate::shopee_client::ShopeeClient;

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    pub async fn build(configuration: Settings) -> Result<Self, anyhow::Error> {
        let repository = build_repository(&configuration.database).await?;
        Self::build_with_repository(configuration, repository).await
    }

    /// Same as [`Application::build`] with the storage backend supplied by
    /// the caller.
    pub async fn build_with_repository(
        configuration: Settings,
        repository: Arc<dyn CommerceRepository>,
    ) -> Result<Self, anyhow::Error> {
        let address = format!(
            "{}:{}",
            configuration.application.host, configuration.application.port
        );
        let listener = TcpListener::bind(&address)?;
        let port = listener.local_addr()?.port();
        tracing::info!(
            "Listening on {} with the {} backend",
            address,
            repository.backend_name()
        );
        let server = run(listener, configuration, repository).await?;
        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

fn build_cors(config: &ApplicationConfig) -> Cors {
    if config.allowed_origins.is_empty() {
        return Cors::permissive();
    }
    config
        .allowed_origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allow_any_method()
        .allow_any_header()
        .max_age(3600)
}

async fn run(
    listener: TcpListener,
    configuration: Settings,
    repository: Arc<dyn CommerceRepository>,
) -> Result<Server, anyhow::Error> {
    let shopee_client = ShopeeClient::new(&configuration.shopee)?;
    let headless_client = HeadlessClient::new(
        configuration.headless.clone(),
        shopee_client.cdn_base_url().to_string(),
    );
    let repository: web::Data<dyn CommerceRepository> = web::Data::from(repository);
    let shopee_client = web::Data::new(shopee_client);
    let headless_client = web::Data::new(headless_client);
    let admin_config = web::Data::new(configuration.admin.clone());
    let storefront_config = web::Data::new(configuration.storefront.clone());
    let bank_config = web::Data::new(configuration.bank.clone());
    let application_config = configuration.application.clone();
    let workers = configuration.application.workers;
    let settings = web::Data::new(configuration);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(build_cors(&application_config))
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                GenericError::ValidationError(err.to_string()).into()
            }))
            .app_data(web::QueryConfig::default().error_handler(|err, _req| {
                GenericError::ValidationError(err.to_string()).into()
            }))
            .app_data(web::PathConfig::default().error_handler(|err, _req| {
                GenericError::ValidationError(err.to_string()).into()
            }))
            .app_data(repository.clone())
            .app_data(shopee_client.clone())
            .app_data(headless_client.clone())
            .app_data(admin_config.clone())
            .app_data(storefront_config.clone())
            .app_data(bank_config.clone())
            .app_data(settings.clone())
            .configure(main_route)
    })
    .workers(workers)
    .listen(listener)?
    .run();

    Ok(server)
}
