use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::{Map, Value};

/// Flat key/value body of an inbound webhook call.
pub type WebhookPayload = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryKind {
    Delivered,
    Bounce,
    Dropped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementKind {
    Open,
    Click,
    Unsubscribe,
    Spam,
}

/// Fields shared by every mailer event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventDetails {
    pub id: String,
    pub recipient_email: String,
    pub date: NaiveDateTime,
    pub metadata: Option<Value>,
    pub payload: WebhookPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryEvent {
    pub kind: DeliveryKind,
    pub reason: Option<String>,
    #[serde(flatten)]
    pub details: EventDetails,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngagementEvent {
    pub kind: EngagementKind,
    #[serde(flatten)]
    pub details: EventDetails,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MailerEvent {
    Delivery(DeliveryEvent),
    Engagement(EngagementEvent),
}

impl MailerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            MailerEvent::Delivery(event) => match event.kind {
                DeliveryKind::Delivered => "delivered",
                DeliveryKind::Bounce => "bounce",
                DeliveryKind::Dropped => "dropped",
            },
            MailerEvent::Engagement(event) => match event.kind {
                EngagementKind::Open => "open",
                EngagementKind::Click => "click",
                EngagementKind::Unsubscribe => "unsubscribe",
                EngagementKind::Spam => "spam",
            },
        }
    }

    pub fn details(&self) -> &EventDetails {
        match self {
            MailerEvent::Delivery(event) => &event.details,
            MailerEvent::Engagement(event) => &event.details,
        }
    }

    pub fn id(&self) -> &str {
        &self.details().id
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            MailerEvent::Delivery(event) => event.reason.as_deref(),
            MailerEvent::Engagement(_) => None,
        }
    }
}
