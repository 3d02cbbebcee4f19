use std::fmt;

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    address::Envelope as SmtpEnvelope,
    message::{
        Attachment as MimeAttachment, Mailbox, MultiPart, MultiPartBuilder, SinglePart,
        header::{ContentType, HeaderName, HeaderValue},
    },
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
};
use tracing::{debug, info};

use crate::{
    application::services::transport::MailTransport,
    domain::{
        errors::{ConfigurationError, TransportError},
        models::{Address, Attachment, Email, Envelope, Header, MailMessage, SentMessage},
    },
};

use super::TrackingOptions;

pub const RELAY_HOST: &str = "smtps.dashasender.ru";
const TLS_PORT: u16 = 465;
const STARTTLS_PORT: u16 = 2525;

/// SMTP submission through the DashaMail relay.
pub struct DashaMailSmtpTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    tls: bool,
    tracking: TrackingOptions,
}

impl DashaMailSmtpTransport {
    /// With `tls` the connection is encrypted from connect on port 465,
    /// otherwise port 2525 is used and upgraded with STARTTLS when offered.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        tls: bool,
        tracking: TrackingOptions,
    ) -> Result<Self, ConfigurationError> {
        let builder = if tls {
            AsyncSmtpTransport::<Tokio1Executor>::relay(RELAY_HOST)?.port(TLS_PORT)
        } else {
            let parameters = TlsParameters::new(RELAY_HOST.to_string())?;
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(RELAY_HOST)
                .port(STARTTLS_PORT)
                .tls(Tls::Opportunistic(parameters))
        };

        let transport = builder
            .credentials(Credentials::new(username.into(), password.into()))
            .build();

        Ok(Self {
            transport,
            tls,
            tracking,
        })
    }

    pub fn is_tls(&self) -> bool {
        self.tls
    }

    pub fn port(&self) -> u16 {
        if self.tls { TLS_PORT } else { STARTTLS_PORT }
    }

    pub fn tracking(&self) -> TrackingOptions {
        self.tracking
    }

    pub fn add_tracking_headers(&self, email: &mut Email) {
        if self.tracking.no_track_opens {
            email.add_text_header("DM-No-Track-Opens", "true");
        }

        if self.tracking.no_track_clicks {
            email.add_text_header("DM-No-Track-Clicks", "true");
        }
    }

    async fn relay(&self, envelope: &Envelope, raw: &[u8]) -> Result<(), TransportError> {
        let envelope = smtp_envelope(envelope)?;
        let response = self.transport.send_raw(&envelope, raw).await?;
        debug!(code = %response.code(), "relay accepted the message");
        Ok(())
    }
}

impl fmt::Display for DashaMailSmtpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.tls {
            write!(f, "smtps://{RELAY_HOST}")
        } else {
            write!(f, "smtp://{RELAY_HOST}:{STARTTLS_PORT}")
        }
    }
}

#[async_trait]
impl MailTransport for DashaMailSmtpTransport {
    async fn send(
        &self,
        message: MailMessage,
        envelope: Option<Envelope>,
    ) -> Result<SentMessage, TransportError> {
        match message {
            MailMessage::Email(mut email) => {
                self.add_tracking_headers(&mut email);

                let envelope = match envelope {
                    Some(envelope) => envelope,
                    None => Envelope::from_email(&email)?,
                };
                let sent = SentMessage::new(envelope);
                let rendered = render(&email, sent.message_id())?;

                self.relay(sent.envelope(), &rendered.formatted()).await?;
                info!(message_id = %sent.message_id(), "email relayed through dashamail smtp");

                Ok(sent)
            }
            MailMessage::Raw(raw) => {
                let envelope = envelope.ok_or_else(|| {
                    TransportError::InvalidMessage(
                        "an envelope is required to relay a raw message".to_string(),
                    )
                })?;
                let sent = SentMessage::new(envelope);

                self.relay(sent.envelope(), &raw).await?;
                info!(message_id = %sent.message_id(), "raw message relayed through dashamail smtp");

                Ok(sent)
            }
        }
    }
}

enum Content {
    Single(SinglePart),
    Multi(MultiPart),
}

impl Content {
    fn into_multipart(self, builder: MultiPartBuilder) -> MultiPart {
        match self {
            Content::Single(part) => builder.singlepart(part),
            Content::Multi(part) => builder.multipart(part),
        }
    }
}

/// Renders the email as MIME for the relay.
pub fn render(email: &Email, message_id: &str) -> Result<Message, TransportError> {
    let mut builder = Message::builder()
        .message_id(Some(format!("<{message_id}>")))
        .subject(email.subject.clone());

    for address in &email.from {
        builder = builder.from(mailbox(address)?);
    }
    if let Some(sender) = &email.sender {
        builder = builder.sender(mailbox(sender)?);
    }
    for address in &email.reply_to {
        builder = builder.reply_to(mailbox(address)?);
    }
    for address in &email.to {
        builder = builder.to(mailbox(address)?);
    }
    for address in &email.cc {
        builder = builder.cc(mailbox(address)?);
    }
    for address in &email.bcc {
        builder = builder.bcc(mailbox(address)?);
    }

    // lettre keeps one header per name, so tags share a single X-Tag line.
    let mut tags = Vec::new();
    for header in &email.headers {
        if let Header::Tag(tag) = header {
            tags.push(tag.as_str());
            continue;
        }
        builder = builder.raw_header(raw_header(&header.name(), header.body())?);
    }
    if !tags.is_empty() {
        builder = builder.raw_header(raw_header("X-Tag", tags.join(", "))?);
    }

    let mut content = match (email.text_body(), email.html_body()) {
        (Some(text), Some(html)) => Content::Multi(MultiPart::alternative_plain_html(
            text.to_string(),
            html.to_string(),
        )),
        (None, Some(html)) => Content::Single(SinglePart::html(html.to_string())),
        (text, None) => Content::Single(SinglePart::plain(text.unwrap_or_default().to_string())),
    };

    let (inlines, attachments): (Vec<&Attachment>, Vec<&Attachment>) =
        email.attachments.iter().partition(|a| a.is_inline());

    if !inlines.is_empty() {
        let mut related = content.into_multipart(MultiPart::related());
        for attachment in inlines {
            let part = MimeAttachment::new_inline(attachment.filename.clone())
                .body(attachment.body.clone(), content_type(attachment)?);
            related = related.singlepart(part);
        }
        content = Content::Multi(related);
    }

    if !attachments.is_empty() {
        let mut mixed = content.into_multipart(MultiPart::mixed());
        for attachment in attachments {
            let part = MimeAttachment::new(attachment.filename.clone())
                .body(attachment.body.clone(), content_type(attachment)?);
            mixed = mixed.singlepart(part);
        }
        content = Content::Multi(mixed);
    }

    let message = match content {
        Content::Single(part) => builder.singlepart(part),
        Content::Multi(part) => builder.multipart(part),
    };

    message.map_err(|e| TransportError::InvalidMessage(e.to_string()))
}

fn raw_header(name: &str, value: String) -> Result<HeaderValue, TransportError> {
    let name = HeaderName::new_from_ascii(name.to_string())
        .map_err(|_| TransportError::InvalidMessage(format!("invalid header name \"{name}\"")))?;
    Ok(HeaderValue::new(name, value))
}

fn mailbox(address: &Address) -> Result<Mailbox, TransportError> {
    let email = address.email.parse().map_err(|_| {
        TransportError::InvalidMessage(format!("invalid address \"{}\"", address.email))
    })?;
    let name = (!address.name.is_empty()).then(|| address.name.clone());

    Ok(Mailbox::new(name, email))
}

fn content_type(attachment: &Attachment) -> Result<ContentType, TransportError> {
    ContentType::parse(&attachment.content_type).map_err(|_| {
        TransportError::InvalidMessage(format!(
            "invalid content type \"{}\" for \"{}\"",
            attachment.content_type, attachment.filename
        ))
    })
}

fn smtp_envelope(envelope: &Envelope) -> Result<SmtpEnvelope, TransportError> {
    let parse = |address: &Address| -> Result<lettre::Address, TransportError> {
        address.email.parse().map_err(|_| {
            TransportError::InvalidMessage(format!("invalid address \"{}\"", address.email))
        })
    };

    let sender = parse(&envelope.sender)?;
    let recipients = envelope
        .recipients
        .iter()
        .map(parse)
        .collect::<Result<Vec<_>, _>>()?;

    SmtpEnvelope::new(Some(sender), recipients)
        .map_err(|e| TransportError::InvalidMessage(e.to_string()))
}
