use poem::http::Method;
use serde_json::Value;

use crate::domain::{errors::WebhookError, events::WebhookPayload};

/// An inbound webhook call, detached from the HTTP server that received it.
#[derive(Debug, Clone)]
pub struct WebhookRequest {
    pub method: Method,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl WebhookRequest {
    pub fn new(method: Method, content_type: Option<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            method,
            content_type,
            body: body.into(),
        }
    }

    pub fn json(method: Method, body: &Value) -> Self {
        Self::new(
            method,
            Some("application/json".to_string()),
            body.to_string(),
        )
    }

    fn is_form(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"))
    }

    /// Decodes the body as a flat map, either url-encoded or a JSON object.
    pub fn payload(&self) -> Result<WebhookPayload, WebhookError> {
        if self.is_form() {
            return Ok(url::form_urlencoded::parse(&self.body)
                .map(|(key, value)| (key.into_owned(), Value::String(value.into_owned())))
                .collect());
        }

        if self.body.is_empty() {
            return Ok(WebhookPayload::new());
        }

        match serde_json::from_slice(&self.body) {
            Ok(Value::Object(map)) => Ok(map),
            _ => Err(WebhookError::malformed()),
        }
    }
}
