use uuid::Uuid;

use crate::domain::errors::TransportError;

use super::{address::Address, email::Email};

/// SMTP-level sender and recipients, independent of the message headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub sender: Address,
    pub recipients: Vec<Address>,
}

impl Envelope {
    pub fn new(sender: Address, recipients: Vec<Address>) -> Self {
        Self { sender, recipients }
    }

    pub fn from_email(email: &Email) -> Result<Self, TransportError> {
        let sender = email
            .sender
            .clone()
            .or_else(|| email.from.first().cloned())
            .ok_or_else(|| {
                TransportError::InvalidMessage(
                    "an email must have a \"From\" or a \"Sender\" header".to_string(),
                )
            })?;

        let recipients: Vec<Address> = email
            .to
            .iter()
            .chain(&email.cc)
            .chain(&email.bcc)
            .cloned()
            .collect();

        if recipients.is_empty() {
            return Err(TransportError::InvalidMessage(
                "an email must have a \"To\", \"Cc\", or \"Bcc\" header".to_string(),
            ));
        }

        Ok(Self { sender, recipients })
    }
}

#[derive(Debug, Clone)]
pub struct SentMessage {
    message_id: String,
    envelope: Envelope,
}

impl SentMessage {
    /// Starts with a locally generated id; transports replace it when the
    /// provider reports its own.
    pub fn new(envelope: Envelope) -> Self {
        let domain = envelope.sender.domain().unwrap_or("localhost");
        let message_id = format!("{}@{}", Uuid::new_v4().simple(), domain);

        Self {
            message_id,
            envelope,
        }
    }

    pub fn message_id(&self) -> &str {
        &self.message_id
    }

    pub fn set_message_id(&mut self, id: impl Into<String>) {
        self.message_id = id.into();
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }
}
