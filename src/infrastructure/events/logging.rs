use async_trait::async_trait;
use tracing::info;

use crate::{application::services::event_bus::MailerEventBus, domain::events::MailerEvent};

/// Writes every received mailer event to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventBus;

impl TracingEventBus {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MailerEventBus for TracingEventBus {
    async fn publish(&self, event: MailerEvent) -> anyhow::Result<()> {
        let details = event.details();
        info!(
            event = event.name(),
            id = %details.id,
            recipient = %details.recipient_email,
            date = %details.date,
            reason = event.reason(),
            "mailer event received"
        );
        Ok(())
    }
}
