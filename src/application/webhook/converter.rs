use chrono::NaiveDateTime;
use serde_json::Value;

use crate::domain::{
    errors::ParseError,
    events::{
        DeliveryEvent, DeliveryKind, EngagementEvent, EngagementKind, EventDetails, MailerEvent,
        WebhookPayload,
    },
};

const EVENT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub trait PayloadConverter: Send + Sync {
    fn convert(&self, payload: WebhookPayload) -> Result<MailerEvent, ParseError>;
}

/// Turns DashaMail webhook bodies into mailer events.
#[derive(Debug, Default, Clone, Copy)]
pub struct DashaMailPayloadConverter;

enum EventKind {
    Delivery(DeliveryKind),
    Engagement(EngagementKind),
}

impl DashaMailPayloadConverter {
    pub fn new() -> Self {
        Self
    }

    fn event_kind(name: &str) -> Option<EventKind> {
        let kind = match name {
            "delivered" => EventKind::Delivery(DeliveryKind::Delivered),
            "bounced" => EventKind::Delivery(DeliveryKind::Bounce),
            "dropped" => EventKind::Delivery(DeliveryKind::Dropped),
            "clicked" => EventKind::Engagement(EngagementKind::Click),
            "unsubscribed" => EventKind::Engagement(EngagementKind::Unsubscribe),
            "opened" => EventKind::Engagement(EngagementKind::Open),
            "complained" => EventKind::Engagement(EngagementKind::Spam),
            _ => return None,
        };

        Some(kind)
    }

    fn reason(payload: &WebhookPayload) -> Option<String> {
        let parts: Vec<String> = ["description", "error", "reason"]
            .into_iter()
            .filter_map(|key| text_field(payload, key))
            .filter(|value| !value.is_empty())
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join("|"))
        }
    }

    fn metadata(payload: &WebhookPayload) -> Result<Option<Value>, ParseError> {
        let Some(raw) = payload
            .get("custom_vars")
            .and_then(Value::as_str)
            .filter(|raw| !raw.is_empty())
        else {
            return Ok(None);
        };

        serde_json::from_str(raw)
            .map(Some)
            .map_err(|e| ParseError(format!("Json decode custom vars exception: {e}")))
    }
}

impl PayloadConverter for DashaMailPayloadConverter {
    fn convert(&self, payload: WebhookPayload) -> Result<MailerEvent, ParseError> {
        let name = text_field(&payload, "event").unwrap_or_default();
        let kind = Self::event_kind(&name)
            .ok_or_else(|| ParseError(format!("Unsupported event \"{name}\".")))?;

        let event_time = text_field(&payload, "event_time").unwrap_or_default();
        let date = NaiveDateTime::parse_from_str(&event_time, EVENT_TIME_FORMAT)
            .map_err(|_| ParseError(format!("Invalid date \"{event_time}\".")))?;

        let reason = match kind {
            EventKind::Delivery(DeliveryKind::Bounce | DeliveryKind::Dropped) => {
                Self::reason(&payload)
            }
            _ => None,
        };
        let metadata = Self::metadata(&payload)?;

        let details = EventDetails {
            id: text_field(&payload, "message_id").unwrap_or_default(),
            recipient_email: text_field(&payload, "email").unwrap_or_default(),
            date,
            metadata,
            payload,
        };

        Ok(match kind {
            EventKind::Delivery(kind) => MailerEvent::Delivery(DeliveryEvent {
                kind,
                reason,
                details,
            }),
            EventKind::Engagement(kind) => {
                MailerEvent::Engagement(EngagementEvent { kind, details })
            }
        })
    }
}

/// Scalar payload value as text; `null` counts as absent.
pub(crate) fn text_field(payload: &WebhookPayload, key: &str) -> Option<String> {
    match payload.get(key)? {
        Value::Null => None,
        Value::String(value) => Some(value.clone()),
        other => Some(other.to_string()),
    }
}
