use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use wsp_config::LogConfig;

/// Initialize logging.
/// - JSON or plain lines depending on `log.json`
/// - RUST_LOG respected; otherwise `log.level` applies to everything
pub fn init(service_name: &str, config: &LogConfig) {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| config.level.clone());
    let filter = EnvFilter::try_new(&env_filter).unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    if config.json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!(service = %service_name, "Observability initialized");
}
