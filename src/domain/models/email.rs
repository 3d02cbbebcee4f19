use std::borrow::Cow;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::address::Address;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    Attachment,
    Inline,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub filename: String,
    /// Full media type, e.g. `image/png`.
    pub content_type: String,
    pub body: Vec<u8>,
    pub disposition: Disposition,
}

impl Attachment {
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        body: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            body: body.into(),
            disposition: Disposition::Attachment,
        }
    }

    pub fn inline(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        body: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            disposition: Disposition::Inline,
            ..Self::new(filename, content_type, body)
        }
    }

    pub fn is_inline(&self) -> bool {
        matches!(self.disposition, Disposition::Inline)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Header {
    Text { name: String, value: String },
    /// Provider tag, sent as `X-Tag`.
    Tag(String),
    /// Provider metadata pair, sent as `X-Metadata-{key}`.
    Metadata { key: String, value: String },
    Date {
        name: String,
        value: DateTime<FixedOffset>,
    },
    Id { name: String, ids: Vec<String> },
}

impl Header {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Header::Text {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn tag(value: impl Into<String>) -> Self {
        Header::Tag(value.into())
    }

    pub fn metadata(key: impl Into<String>, value: impl Into<String>) -> Self {
        Header::Metadata {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn name(&self) -> Cow<'_, str> {
        match self {
            Header::Text { name, .. } | Header::Date { name, .. } | Header::Id { name, .. } => {
                Cow::Borrowed(name)
            }
            Header::Tag(_) => Cow::Borrowed("X-Tag"),
            Header::Metadata { key, .. } => Cow::Owned(format!("X-Metadata-{key}")),
        }
    }

    /// Header body as it appears on the wire.
    pub fn body(&self) -> String {
        match self {
            Header::Text { value, .. } | Header::Metadata { value, .. } => value.clone(),
            Header::Tag(value) => value.clone(),
            Header::Date { value, .. } => value.format("%a, %d %b %Y %H:%M:%S %z").to_string(),
            Header::Id { ids, .. } => ids
                .iter()
                .map(|id| format!("<{id}>"))
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Email {
    pub subject: String,
    pub text_body: Option<String>,
    pub html_body: Option<String>,
    pub from: Vec<Address>,
    pub sender: Option<Address>,
    pub reply_to: Vec<Address>,
    pub to: Vec<Address>,
    pub cc: Vec<Address>,
    pub bcc: Vec<Address>,
    pub attachments: Vec<Attachment>,
    pub headers: Vec<Header>,
}

impl Email {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.text_body = Some(body.into());
        self
    }

    pub fn html(mut self, body: impl Into<String>) -> Self {
        self.html_body = Some(body.into());
        self
    }

    pub fn from(mut self, address: impl Into<Address>) -> Self {
        self.from.push(address.into());
        self
    }

    pub fn sender(mut self, address: impl Into<Address>) -> Self {
        self.sender = Some(address.into());
        self
    }

    pub fn reply_to(mut self, address: impl Into<Address>) -> Self {
        self.reply_to.push(address.into());
        self
    }

    pub fn to(mut self, address: impl Into<Address>) -> Self {
        self.to.push(address.into());
        self
    }

    pub fn cc(mut self, address: impl Into<Address>) -> Self {
        self.cc.push(address.into());
        self
    }

    pub fn bcc(mut self, address: impl Into<Address>) -> Self {
        self.bcc.push(address.into());
        self
    }

    pub fn attach(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    pub fn header(mut self, header: Header) -> Self {
        self.headers.push(header);
        self
    }

    pub fn add_text_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.push(Header::text(name, value));
    }

    /// Text body, treating an empty string as absent.
    pub fn text_body(&self) -> Option<&str> {
        self.text_body.as_deref().filter(|body| !body.is_empty())
    }

    pub fn html_body(&self) -> Option<&str> {
        self.html_body.as_deref().filter(|body| !body.is_empty())
    }
}

/// What a transport is asked to deliver.
#[derive(Debug, Clone)]
pub enum MailMessage {
    Email(Box<Email>),
    /// Pre-rendered MIME bytes; only the SMTP relay accepts these.
    Raw(Vec<u8>),
}

impl From<Email> for MailMessage {
    fn from(value: Email) -> Self {
        MailMessage::Email(Box::new(value))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn tag_and_metadata_names() {
        assert_eq!(Header::tag("welcome").name(), "X-Tag");
        assert_eq!(Header::metadata("Color", "blue").name(), "X-Metadata-Color");
        assert_eq!(Header::metadata("Color", "blue").body(), "blue");
    }

    #[test]
    fn id_header_body_wraps_each_id() {
        let header = Header::Id {
            name: "References".to_string(),
            ids: vec!["id1@value".to_string(), "id2@value".to_string()],
        };
        assert_eq!(header.body(), "<id1@value> <id2@value>");
    }

    #[test]
    fn date_header_body_is_rfc2822() {
        let value = FixedOffset::east_opt(3 * 3600)
            .unwrap()
            .with_ymd_and_hms(2023, 1, 1, 12, 0, 0)
            .unwrap();
        let header = Header::Date {
            name: "date-header".to_string(),
            value,
        };
        let body = header.body();
        assert_eq!(body, "Sun, 01 Jan 2023 12:00:00 +0300");
        assert_eq!(DateTime::parse_from_rfc2822(&body).unwrap(), value);
    }

    #[test]
    fn empty_bodies_count_as_absent() {
        let email = Email::new().text("").html("<p>hi</p>");
        assert_eq!(email.text_body(), None);
        assert_eq!(email.html_body(), Some("<p>hi</p>"));
    }

    #[test]
    fn inline_attachment_is_marked_by_disposition() {
        assert!(Attachment::inline("logo.png", "image/png", vec![1, 2]).is_inline());
        assert!(!Attachment::new("logo.png", "image/png", vec![1, 2]).is_inline());
    }
}
