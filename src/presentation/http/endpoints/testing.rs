use std::{
    fmt,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;

use crate::{
    application::{
        services::{event_bus::MailerEventBus, transport::MailTransport},
        webhook::DashaMailRequestParser,
    },
    domain::{
        errors::TransportError,
        events::MailerEvent,
        models::{Envelope, MailMessage, SentMessage},
    },
};

use super::root::ApiState;

pub const SECRET: &str = "secret-hKEz2QK38UqofI69RGuJ9w3TIiWh9dL5";

/// Records sent messages and answers with a fixed id, or fails when asked to.
#[derive(Default)]
pub struct FakeTransport {
    pub sent: Mutex<Vec<MailMessage>>,
    pub failure: Option<fn() -> TransportError>,
}

impl fmt::Display for FakeTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("fake://")
    }
}

#[async_trait]
impl MailTransport for FakeTransport {
    async fn send(
        &self,
        message: MailMessage,
        envelope: Option<Envelope>,
    ) -> Result<SentMessage, TransportError> {
        if let Some(failure) = self.failure {
            return Err(failure());
        }

        let envelope = match (&message, envelope) {
            (_, Some(envelope)) => envelope,
            (MailMessage::Email(email), None) => Envelope::from_email(email)?,
            (MailMessage::Raw(_), None) => {
                return Err(TransportError::InvalidMessage("no envelope".to_string()));
            }
        };

        self.sent.lock().unwrap().push(message);

        let mut sent = SentMessage::new(envelope);
        sent.set_message_id("test-message-id");
        Ok(sent)
    }
}

#[derive(Default)]
pub struct RecordingBus {
    pub events: Mutex<Vec<MailerEvent>>,
}

#[async_trait]
impl MailerEventBus for RecordingBus {
    async fn publish(&self, event: MailerEvent) -> anyhow::Result<()> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

pub fn state(transport: Arc<FakeTransport>, bus: Arc<RecordingBus>) -> Arc<ApiState> {
    Arc::new(ApiState {
        transport,
        parser: Arc::new(DashaMailRequestParser::new()),
        event_bus: bus,
        webhook_secret: SECRET.to_string(),
    })
}
