use stormlead_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize the application (lead store, maintenance service, routes)
    let (_state, router) = stormlead_api::setup::initialize_app(config.clone()).await?;

    // Start the server
    stormlead_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
