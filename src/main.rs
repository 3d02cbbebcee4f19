use std::sync::Arc;

use anyhow::Context;
use poem::{Server, listener::TcpListener};
use tokio::main;
use tracing::info;
use tracing_subscriber::EnvFilter;

use dashamail_mailer::{
    application::webhook::DashaMailRequestParser,
    config::Config,
    infrastructure::{
        dashamail::{DashaMailTransportFactory, Dsn},
        events::TracingEventBus,
    },
    presentation::http::endpoints::root::{ApiState, app},
};

#[main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::try_parse().map_err(anyhow::Error::msg)?;

    let dsn: Dsn = config.mailer_dsn.parse().context("MAILER_DSN is not a valid mailer DSN")?;
    let transport = DashaMailTransportFactory::new()
        .create(&dsn)
        .context("unable to create the mailer transport")?;

    info!(transport = %transport, "mailer transport ready");

    let state = Arc::new(ApiState {
        transport: Arc::new(transport),
        parser: Arc::new(DashaMailRequestParser::new()),
        event_bus: Arc::new(TracingEventBus::new()),
        webhook_secret: config.webhook_secret.clone(),
    });

    let server_url = config.server_url();
    info!("Starting server at {}", server_url);

    Server::new(TcpListener::bind(format!("localhost:{}", config.port)))
        .run(app(state, &server_url))
        .await?;

    Ok(())
}
