use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::{
    application::services::transport::MailTransport,
    domain::{
        errors::{ConfigurationError, TransportError},
        models::{Envelope, MailMessage, SentMessage},
    },
};

use super::{DashaMailApiTransport, DashaMailSmtpTransport, Dsn, TrackingOptions};

pub const SUPPORTED_SCHEMES: &[&str] = &[
    "dashamail",
    "dashamail+api",
    "dashamail+smtp",
    "dashamail+smtps",
];

/// Any transport the factory can hand out.
pub enum DashaMailTransport {
    Api(DashaMailApiTransport),
    Smtp(DashaMailSmtpTransport),
}

impl fmt::Display for DashaMailTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DashaMailTransport::Api(transport) => fmt::Display::fmt(transport, f),
            DashaMailTransport::Smtp(transport) => fmt::Display::fmt(transport, f),
        }
    }
}

#[async_trait]
impl MailTransport for DashaMailTransport {
    async fn send(
        &self,
        message: MailMessage,
        envelope: Option<Envelope>,
    ) -> Result<SentMessage, TransportError> {
        match self {
            DashaMailTransport::Api(transport) => transport.send(message, envelope).await,
            DashaMailTransport::Smtp(transport) => transport.send(message, envelope).await,
        }
    }
}

pub struct DashaMailTransportFactory {
    client: Client,
}

impl Default for DashaMailTransportFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl DashaMailTransportFactory {
    pub fn new() -> Self {
        let client = Client::builder()
            .user_agent("dashamail-mailer")
            .build()
            .expect("failed to build dashamail client");

        Self::with_client(client)
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    pub fn supports(&self, dsn: &Dsn) -> bool {
        SUPPORTED_SCHEMES.contains(&dsn.scheme())
    }

    pub fn create(&self, dsn: &Dsn) -> Result<DashaMailTransport, ConfigurationError> {
        let tracking = TrackingOptions {
            no_track_opens: dsn.bool_option("no_track_opens"),
            no_track_clicks: dsn.bool_option("no_track_clicks"),
        };

        let transport = match dsn.scheme() {
            "dashamail+api" => {
                let host = Some(dsn.host())
                    .filter(|host| *host != "default")
                    .map(str::to_string);

                DashaMailTransport::Api(
                    DashaMailApiTransport::with_client(user(dsn)?, tracking, self.client.clone())
                        .with_host(host)
                        .with_port(dsn.port()),
                )
            }
            "dashamail" | "dashamail+smtps" => DashaMailTransport::Smtp(
                DashaMailSmtpTransport::new(user(dsn)?, password(dsn)?, true, tracking)?,
            ),
            "dashamail+smtp" => DashaMailTransport::Smtp(DashaMailSmtpTransport::new(
                user(dsn)?,
                password(dsn)?,
                false,
                tracking,
            )?),
            scheme => {
                return Err(ConfigurationError::UnsupportedScheme {
                    scheme: scheme.to_string(),
                    supported: SUPPORTED_SCHEMES
                        .iter()
                        .map(|scheme| format!("\"{scheme}\""))
                        .collect::<Vec<_>>()
                        .join(", "),
                });
            }
        };

        debug!(transport = %transport, "mailer transport created");

        Ok(transport)
    }
}

fn user(dsn: &Dsn) -> Result<&str, ConfigurationError> {
    dsn.user()
        .ok_or(ConfigurationError::IncompleteDsn("User is not set."))
}

fn password(dsn: &Dsn) -> Result<&str, ConfigurationError> {
    dsn.password()
        .ok_or(ConfigurationError::IncompleteDsn("Password is not set."))
}
