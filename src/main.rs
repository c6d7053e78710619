use deal_storefront::configuration::get_configuration;
use deal_storefront::startup::Application;
use deal_storefront::telemetry::{get_json_subscriber, init_subscriber};

#[actix_web::main]
async fn main() -> Result<(), anyhow::Error> {
    let subscriber = get_json_subscriber("deal-storefront".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);
    let configuration = get_configuration()?;
    let application = Application::build(configuration).await?;
    application.run_until_stopped().await?;
    Ok(())
}
