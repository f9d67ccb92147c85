/// Application entry point: load the collection once and log the first page
use launch_browser::{AppConfig, Browser, ListView};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    // Load configuration
    let config = AppConfig::from_env()?;
    info!("Configuration loaded successfully");

    let browser = Browser::from_config(&config)?;

    match browser.load().await {
        ListView::Page(page) => {
            info!(
                "Showing {}-{} of {} launches (page {} of {})",
                page.start, page.end, page.total, page.current_page, page.total_pages
            );
            for launch in &page.items {
                let star = if browser.is_favorite(&launch.id) { "*" } else { " " };
                info!(
                    "{} {} {:<32} {}",
                    star,
                    launch.date_utc.format("%Y-%m-%d"),
                    launch.name,
                    launch.outcome()
                );
            }
        }
        ListView::Empty { favorites_only } => {
            warn!("No launches match (favorites only: {})", favorites_only);
        }
        ListView::Error(notice) => {
            error!("{}", notice.message);
            if let Some(hint) = notice.hint {
                error!("{}", hint);
            }
        }
        ListView::Loading => {}
    }

    let stats = browser.statistics();
    info!(
        "{} launches, {}% success, {} upcoming",
        stats.total, stats.success_rate, stats.upcoming
    );
    let query = browser.query_string();
    if !query.is_empty() {
        info!("View: ?{}", query);
    }

    Ok(())
}
