use actix::prelude::*;
use actix_web::middleware::{NormalizePath, TrailingSlash};
use actix_web::{middleware::DefaultHeaders, App, HttpServer};
use anyhow::Context as AnyhowContext;
use std::env;
use std::sync::Arc;
use subsync::config::{self, ServerConfig};
use subsync::subscription::repository::InMemorySubscriptionRepository;
use subsync_types::subscription::repository::SubscriptionRepository;
use subsync_types::subscription::service::SubscriptionService;

#[actix_web::main]
async fn main() -> Result<(), anyhow::Error> {
    if let Err(env::VarError::NotPresent) = env::var("RUST_LOG") {
        env::set_var("RUST_LOG", "INFO");
    }
    pretty_env_logger::formatted_timed_builder()
        .parse_default_env()
        .init();

    config::load_dotenv()?;
    let ServerConfig { host, port, seed } = ServerConfig::from_env();

    let subscription_repository: Arc<dyn SubscriptionRepository> = if seed {
        log::info!("Seeding subscriptions with demo records");
        Arc::new(InMemorySubscriptionRepository::seeded())
    } else {
        Arc::new(InMemorySubscriptionRepository::new())
    };
    let subscription_service = SubscriptionService::new(subscription_repository).start();

    log::info!("Listening on {host}:{port}");
    HttpServer::new(move || {
        App::new()
            .wrap(
                DefaultHeaders::new()
                    .add(("Access-Control-Allow-Origin", "*"))
                    .add(("Access-Control-Allow-Methods", "GET, POST, PATCH, OPTIONS"))
                    .add(("Access-Control-Allow-Headers", "*")),
            )
            .wrap(NormalizePath::new(TrailingSlash::Trim))
            .configure(subsync::configure(subscription_service.clone()))
    })
    .bind((host.as_str(), port))
    .context(format!(
        "Failed to bind server to {host}:{port}. Is the port already in use?"
    ))?
    .run()
    .await?;
    Ok(())
}
