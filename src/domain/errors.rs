use poem::http::StatusCode;
use thiserror::Error;

/// Raised while turning a DSN into a transport.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error(
        "The \"{scheme}\" scheme is not supported; supported schemes for mailer \"dashamail\" are: {supported}."
    )]
    UnsupportedScheme { scheme: String, supported: String },
    #[error("{0}")]
    IncompleteDsn(&'static str),
    #[error("The mailer DSN is invalid.")]
    InvalidDsn(#[source] url::ParseError),
    #[error("Unable to configure the SMTP relay: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Unable to send an email: {message} (code {status}).")]
    Http { message: String, status: u16 },
    #[error("{0}")]
    Rejected(String),
    #[error("Could not reach the remote DashaMail server.")]
    Unreachable(#[source] reqwest::Error),
    #[error("Unable to build the request: {0}")]
    Request(String),
    #[error("Invalid message: {0}")]
    InvalidMessage(String),
    #[error("SMTP delivery failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Converter failure; the message is handed back to the webhook sender verbatim.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ParseError(pub String);

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("Request does not match.")]
    NotMatched,
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },
}

impl WebhookError {
    pub fn malformed() -> Self {
        Self::not_acceptable("Payload is malformed.")
    }

    pub fn not_acceptable(message: impl Into<String>) -> Self {
        WebhookError::Rejected {
            status: StatusCode::NOT_ACCEPTABLE,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            WebhookError::NotMatched => StatusCode::NOT_ACCEPTABLE,
            WebhookError::Rejected { status, .. } => *status,
        }
    }
}
