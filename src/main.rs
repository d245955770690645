use anyhow::Result;
use movieleaks_catalog::infrastructure::config::AppConfig;
use movieleaks_catalog::infrastructure::logging::init_logging_with_config;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;
    init_logging_with_config(&config.logging)?;
    config.validate()?;

    movieleaks_catalog::run(config).await
}
