use reqwest::multipart::{Form, Part};
use serde::Serialize;

use crate::domain::{
    errors::TransportError,
    models::{Address, Attachment, Email, Envelope, Header, join_addresses},
};

use super::TrackingOptions;

/// Headers already carried by dedicated payload fields.
pub const RESERVED_HEADERS: [&str; 9] = [
    "from",
    "sender",
    "to",
    "cc",
    "bcc",
    "subject",
    "reply-to",
    "content-type",
    "accept",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderValue {
    Text(String),
    List(Vec<String>),
}

#[derive(Serialize)]
struct InlineAttachment<'a> {
    mime_type: &'a str,
    filename: &'a str,
    body: String,
    cid: &'a str,
}

/// Fields of a `transactional.send` call.
#[derive(Debug, Clone)]
pub struct ApiPayload {
    fields: Vec<(&'static str, String)>,
    attachments: Vec<Attachment>,
    headers: Vec<(String, HeaderValue)>,
}

impl ApiPayload {
    pub fn build(
        email: &Email,
        envelope: &Envelope,
        tracking: TrackingOptions,
    ) -> Result<Self, TransportError> {
        let (inlines, attachments): (Vec<&Attachment>, Vec<&Attachment>) =
            email.attachments.iter().partition(|a| a.is_inline());

        let inline = serde_json::to_string(
            &inlines
                .iter()
                .map(|a| InlineAttachment {
                    mime_type: &a.content_type,
                    filename: &a.filename,
                    body: String::from_utf8_lossy(&a.body).into_owned(),
                    cid: &a.filename,
                })
                .collect::<Vec<_>>(),
        )
        .map_err(|e| TransportError::Request(e.to_string()))?;

        let mut fields = vec![
            ("format", "json".to_string()),
            ("no_track_opens", tracking.no_track_opens.to_string()),
            ("no_track_clicks", tracking.no_track_clicks.to_string()),
            ("from_email", envelope.sender.encoded().into_owned()),
            ("to", join_addresses(recipients(email, envelope))),
            ("subject", email.subject.clone()),
            ("inline", inline),
        ];

        if !envelope.sender.name.is_empty() {
            fields.push(("from_name", envelope.sender.name.clone()));
        }
        if !email.cc.is_empty() {
            fields.push(("cc", join_addresses(&email.cc)));
        }
        if !email.bcc.is_empty() {
            fields.push(("bcc", join_addresses(&email.bcc)));
        }
        if let Some(text) = email.text_body() {
            fields.push(("plain_text", text.to_string()));
        }
        if let Some(html) = email.html_body() {
            fields.push(("message", html.to_string()));
        }

        Ok(Self {
            fields,
            attachments: attachments.into_iter().cloned().collect(),
            headers: fold_headers(&email.headers),
        })
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn header(&self, name: &str) -> Option<&HeaderValue> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn headers(&self) -> &[(String, HeaderValue)] {
        &self.headers
    }

    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    pub fn into_form(self) -> Result<Form, TransportError> {
        let mut form = Form::new();

        for (key, value) in self.fields {
            form = form.text(key, value);
        }

        for (name, value) in self.headers {
            match value {
                HeaderValue::Text(text) => {
                    form = form.text(format!("headers[{name}]"), text);
                }
                HeaderValue::List(items) => {
                    for (index, item) in items.into_iter().enumerate() {
                        form = form.text(format!("headers[{name}][{index}]"), item);
                    }
                }
            }
        }

        for (index, attachment) in self.attachments.into_iter().enumerate() {
            let part = Part::bytes(attachment.body)
                .file_name(attachment.filename)
                .mime_str(&attachment.content_type)
                .map_err(|e| TransportError::Request(e.to_string()))?;
            form = form.part(format!("attachments[{index}]"), part);
        }

        Ok(form)
    }
}

/// Envelope recipients minus the ones the message itself lists as cc/bcc.
fn recipients<'a>(email: &'a Email, envelope: &'a Envelope) -> impl Iterator<Item = &'a Address> {
    envelope.recipients.iter().filter(move |recipient| {
        !email
            .cc
            .iter()
            .chain(&email.bcc)
            .any(|copy| copy.email.eq_ignore_ascii_case(&recipient.email))
    })
}

fn fold_headers(headers: &[Header]) -> Vec<(String, HeaderValue)> {
    let mut folded: Vec<(String, HeaderValue)> = Vec::new();

    for header in headers {
        let name = header.name();
        if RESERVED_HEADERS
            .iter()
            .any(|reserved| reserved.eq_ignore_ascii_case(&name))
        {
            continue;
        }

        let position = folded.iter().position(|(key, _)| *key == name);
        match (header, position) {
            (Header::Tag(tag), Some(index)) => match &mut folded[index].1 {
                HeaderValue::List(tags) => tags.push(tag.clone()),
                value => *value = HeaderValue::List(vec![tag.clone()]),
            },
            (Header::Tag(tag), None) => {
                folded.push((name.into_owned(), HeaderValue::List(vec![tag.clone()])));
            }
            (_, Some(index)) => folded[index].1 = HeaderValue::Text(header.body()),
            (_, None) => folded.push((name.into_owned(), HeaderValue::Text(header.body()))),
        }
    }

    folded
}
