use md5::{Digest, Md5};
use poem::http::Method;
use subtle::ConstantTimeEq;
use tracing::{debug, warn};

use crate::domain::{errors::WebhookError, events::MailerEvent};

use super::{
    converter::{DashaMailPayloadConverter, PayloadConverter, text_field},
    request::WebhookRequest,
};

const REQUIRED_FIELDS: [&str; 5] = ["event", "email", "message_id", "event_time", "secret"];

pub trait RequestParser: Send + Sync {
    fn parse(&self, request: &WebhookRequest, secret: &str) -> Result<MailerEvent, WebhookError>;
}

pub struct DashaMailRequestParser<C = DashaMailPayloadConverter> {
    converter: C,
}

impl DashaMailRequestParser {
    pub fn new() -> Self {
        Self::with_converter(DashaMailPayloadConverter::new())
    }
}

impl Default for DashaMailRequestParser {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: PayloadConverter> DashaMailRequestParser<C> {
    pub fn with_converter(converter: C) -> Self {
        Self { converter }
    }
}

impl<C: PayloadConverter> RequestParser for DashaMailRequestParser<C> {
    fn parse(&self, request: &WebhookRequest, secret: &str) -> Result<MailerEvent, WebhookError> {
        if request.method != Method::POST {
            return Err(WebhookError::NotMatched);
        }

        let payload = request.payload()?;

        if let Some(missing) = REQUIRED_FIELDS
            .iter()
            .find(|key| text_field(&payload, key).is_none())
        {
            warn!(field = *missing, "dashamail webhook is missing a required field");
            return Err(WebhookError::malformed());
        }

        let email = text_field(&payload, "email").unwrap_or_default();
        let message_id = text_field(&payload, "message_id").unwrap_or_default();
        let provided = text_field(&payload, "secret").unwrap_or_default();

        if !verify_signature(&provided, &email, &message_id, secret) {
            warn!(message_id = %message_id, "dashamail webhook signature mismatch");
            return Err(WebhookError::malformed());
        }

        let event = self.converter.convert(payload).map_err(|e| {
            warn!(error = %e, "dashamail webhook payload rejected");
            WebhookError::not_acceptable(e.to_string())
        })?;

        debug!(message_id = %event.id(), event = event.name(), "dashamail webhook accepted");

        Ok(event)
    }
}

/// Lowercase hex MD5 of `email + message_id + secret`.
pub fn signature(email: &str, message_id: &str, secret: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(email.as_bytes());
    hasher.update(message_id.as_bytes());
    hasher.update(secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn verify_signature(provided: &str, email: &str, message_id: &str, secret: &str) -> bool {
    let expected = signature(email, message_id, secret);
    expected.as_bytes().ct_eq(provided.as_bytes()).into()
}
