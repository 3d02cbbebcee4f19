use async_trait::async_trait;

use crate::domain::events::MailerEvent;

#[async_trait]
pub trait MailerEventBus: Send + Sync {
    async fn publish(&self, event: MailerEvent) -> anyhow::Result<()>;
}
