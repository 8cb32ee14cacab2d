use climatrix_alerts::AppResources;
use climatrix_alerts::alerts::SmtpAlertMailer;
use climatrix_alerts::api::start_webserver;
use climatrix_alerts::config::load_config_or_panic;
use rustls::crypto;
use rustls::crypto::CryptoProvider;
use sea_orm::Database;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn initialize_tracing() {
    let default_directives = "climatrix_alerts=info,tower_http=info,sea_orm=warn";
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));

    let layer = fmt::layer().with_target(true).with_level(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layer)
        .init();
}

#[tokio::main]
async fn main() -> color_eyre::eyre::Result<()> {
    color_eyre::install()?;
    initialize_tracing();

    let config = Arc::new(load_config_or_panic());

    let ring_provider = crypto::ring::default_provider();
    if CryptoProvider::install_default(ring_provider).is_err() {
        tracing::warn!("A rustls crypto provider was already installed");
    }

    let db = Arc::new(Database::connect(&config.database_url).await?);

    // One pooled SMTP transport for the whole process
    let mailer = Arc::new(SmtpAlertMailer::from_config(&config)?);

    tracing::info!(
        brand = %config.alerts.brand_name,
        max_concurrent_sends = config.alerts.max_concurrent_sends,
        logo = config.alerts.logo_path.is_some(),
        smtp_server = %config.smtp.server,
        "alerts configuration"
    );

    let resources = AppResources {
        db,
        mailer,
        config,
    };

    start_webserver(resources).await?;
    Ok(())
}
