use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use hirenodes::Services;
use hireruntime::HireRuntime;
use hireserver::{dispatch, AppState, ServerConfig};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting workflow server");

    let config = ServerConfig::from_env()?;
    let services = Services::from_config(&config.services).await?;
    let registry = hirenodes::default_registry(&services);

    info!(node_types = ?registry.list_node_types(), "Executors registered");

    let runtime = HireRuntime::with_registry(Arc::new(registry), config.runtime.clone());
    let app_state = web::Data::new(AppState::new(runtime).with_body_limit(config.max_body_bytes));

    info!("Server starting on http://{}", config.bind_address);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(app_state.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .default_service(web::to(dispatch))
    })
    .bind(&config.bind_address)?
    .run()
    .await?;

    Ok(())
}
