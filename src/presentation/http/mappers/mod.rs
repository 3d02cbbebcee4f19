use crate::{
    domain::models::{Address, Email, Header, SentMessage},
    presentation::http::{requests::SendEmailRequestDto, responses::SendEmailResponseDto},
};

pub fn map_email(request: &SendEmailRequestDto) -> Email {
    let from = match &request.from_name {
        Some(name) => Address::with_name(request.from.0.as_str(), name.as_str()),
        None => Address::new(request.from.0.as_str()),
    };

    let mut email = Email::new().from(from).subject(request.subject.as_str());

    if let Some(text) = &request.text {
        email = email.text(text.as_str());
    }
    if let Some(html) = &request.html {
        email = email.html(html.as_str());
    }

    for to in &request.to {
        email = email.to(Address::new(to.0.as_str()));
    }
    for cc in &request.cc {
        email = email.cc(Address::new(cc.0.as_str()));
    }
    for bcc in &request.bcc {
        email = email.bcc(Address::new(bcc.0.as_str()));
    }

    for tag in &request.tags {
        email = email.header(Header::tag(tag.as_str()));
    }
    for (key, value) in &request.metadata {
        email = email.header(Header::metadata(key.as_str(), value.as_str()));
    }

    email
}

pub fn map_sent(sent: &SentMessage) -> SendEmailResponseDto {
    SendEmailResponseDto {
        message_id: sent.message_id().to_string(),
    }
}
