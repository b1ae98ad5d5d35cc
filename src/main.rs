use anyhow::Result;
use tracing::info;

use kadra::api;
use kadra::config::Settings;
use kadra::logging::configure_logging;

#[tokio::main]
async fn main() -> Result<()> {
    configure_logging();

    let settings = Settings::from_env();
    info!(
        "agent.start web_scrape={} auto_write={} map={}",
        settings.web_scrape_enabled, settings.auto_write_enabled, settings.map_path
    );

    api::serve(settings).await
}
