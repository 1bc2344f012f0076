use dotenvy::dotenv;
use lambda_runtime::{Error, run, service_fn};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod app;
mod common;
mod config;
mod infrastructure;
mod modules;
mod state;
mod workers;

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenv().ok();

    // CloudWatch adds its own timestamps
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .without_time()
        .init();

    info!("Starting DASH transcoder...");

    let state = app::create_state().await?;

    run(service_fn(|event| {
        modules::dash::handler::function_handler(event, &state)
    }))
    .await
}
