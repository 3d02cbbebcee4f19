use std::fmt;

use async_trait::async_trait;

use crate::domain::{
    errors::TransportError,
    models::{Envelope, MailMessage, SentMessage},
};

/// A configured way of handing a message to the provider.
///
/// When `envelope` is `None` it is derived from the message headers.
#[async_trait]
pub trait MailTransport: Send + Sync + fmt::Display {
    async fn send(
        &self,
        message: MailMessage,
        envelope: Option<Envelope>,
    ) -> Result<SentMessage, TransportError>;
}
