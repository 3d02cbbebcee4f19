use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info};

use crate::{
    application::services::transport::MailTransport,
    domain::{
        errors::TransportError,
        models::{Email, Envelope, MailMessage, SentMessage},
    },
};

use super::{TrackingOptions, error_codes, payload::ApiPayload};

pub const DEFAULT_HOST: &str = "api.dashamail.com";

/// Sends through the DashaMail `transactional.send` API method.
///
/// See <https://docs.dashamail.ru>.
pub struct DashaMailApiTransport {
    http: Client,
    key: String,
    tracking: TrackingOptions,
    host: Option<String>,
    port: Option<u16>,
    scheme: &'static str,
}

impl DashaMailApiTransport {
    pub fn new(key: impl Into<String>, tracking: TrackingOptions) -> Self {
        let http = Client::builder()
            .user_agent("dashamail-mailer")
            .build()
            .expect("failed to build dashamail client");

        Self::with_client(key, tracking, http)
    }

    pub fn with_client(key: impl Into<String>, tracking: TrackingOptions, http: Client) -> Self {
        Self {
            http,
            key: key.into(),
            tracking,
            host: None,
            port: None,
            scheme: "https",
        }
    }

    pub fn with_host(mut self, host: Option<String>) -> Self {
        self.host = host;
        self
    }

    pub fn with_port(mut self, port: Option<u16>) -> Self {
        self.port = port;
        self
    }

    pub fn tracking(&self) -> TrackingOptions {
        self.tracking
    }

    #[cfg(test)]
    fn plain_http(mut self) -> Self {
        self.scheme = "http";
        self
    }

    fn endpoint(&self) -> String {
        let host = self.host.as_deref().unwrap_or(DEFAULT_HOST);
        match self.port {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        }
    }

    async fn send_api(
        &self,
        sent: &mut SentMessage,
        email: &Email,
        envelope: &Envelope,
    ) -> Result<(), TransportError> {
        let form = ApiPayload::build(email, envelope, self.tracking)?.into_form()?;

        debug!(endpoint = %self.endpoint(), "sending email through the dashamail api");

        let response = self
            .http
            .post(format!("{}://{}/", self.scheme, self.endpoint()))
            .query(&[
                ("method", "transactional.send"),
                ("api_key", self.key.as_str()),
            ])
            .multipart(form)
            .send()
            .await
            .map_err(TransportError::Unreachable)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(TransportError::Unreachable)?;

        if let Some(transaction_id) = interpret_response(status, &body)? {
            info!(transaction_id = %transaction_id, "email accepted by dashamail");
            sent.set_message_id(transaction_id);
        }

        Ok(())
    }
}

/// Checks a `transactional.send` reply and returns the transaction id, if any.
pub fn interpret_response(status: u16, body: &str) -> Result<Option<String>, TransportError> {
    let Ok(result) = serde_json::from_str::<Value>(body) else {
        return Err(TransportError::Http {
            message: body.to_string(),
            status,
        });
    };

    if status != 200 {
        return Err(TransportError::Http {
            message: result.get("message").map(scalar).unwrap_or_default(),
            status,
        });
    }

    let failed = result
        .pointer("/response/msg/err_code")
        .and_then(error_code)
        .is_some_and(|code| code != 0);
    if failed {
        return Err(TransportError::Rejected(error_message(&result)));
    }

    Ok(result
        .pointer("/response/data/transaction_id")
        .filter(|id| !id.is_null())
        .map(scalar))
}

fn error_message(result: &Value) -> String {
    if let Some(text) = result.pointer("/response/msg/text").filter(|t| !t.is_null()) {
        return scalar(text);
    }

    match result.pointer("/response/msg/err_code").and_then(error_code) {
        Some(code) => error_codes::describe(code)
            .map(str::to_string)
            .unwrap_or_else(|| format!("unknown error code: {code}")),
        None => "unknown error".to_string(),
    }
}

fn error_code(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl fmt::Display for DashaMailApiTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dashamail+api://{}", self.endpoint())
    }
}

#[async_trait]
impl MailTransport for DashaMailApiTransport {
    async fn send(
        &self,
        message: MailMessage,
        envelope: Option<Envelope>,
    ) -> Result<SentMessage, TransportError> {
        let MailMessage::Email(email) = message else {
            return Err(TransportError::InvalidMessage(
                "the DashaMail API transport only sends structured emails".to_string(),
            ));
        };

        let envelope = match envelope {
            Some(envelope) => envelope,
            None => Envelope::from_email(&email)?,
        };

        let mut sent = SentMessage::new(envelope.clone());
        self.send_api(&mut sent, &email, &envelope).await?;

        Ok(sent)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_string_contains, method, path, query_param},
    };

    use crate::domain::models::{Address, Attachment, Header};

    use super::*;

    fn email() -> Email {
        Email::new()
            .subject("Test Email")
            .to(Address::with_name("to@example.com", "To Name"))
            .from(Address::with_name("from@example.com", "From Name"))
            .text("Test email text")
    }

    fn transport(server: &MockServer) -> DashaMailApiTransport {
        DashaMailApiTransport::with_client("ACCESS_KEY", TrackingOptions::default(), Client::new())
            .with_host(Some(server.address().ip().to_string()))
            .with_port(Some(server.address().port()))
            .plain_http()
    }

    #[rstest]
    #[case(None, None, "dashamail+api://api.dashamail.com")]
    #[case(Some("example.com"), None, "dashamail+api://example.com")]
    #[case(Some("example.com"), Some(99), "dashamail+api://example.com:99")]
    fn display(#[case] host: Option<&str>, #[case] port: Option<u16>, #[case] expected: &str) {
        let transport = DashaMailApiTransport::with_client(
            "ACCESS_KEY",
            TrackingOptions::default(),
            Client::new(),
        )
        .with_host(host.map(str::to_string))
        .with_port(port);

        assert_eq!(transport.to_string(), expected);
    }

    #[tokio::test]
    async fn send() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .and(query_param("method", "transactional.send"))
            .and(query_param("api_key", "ACCESS_KEY"))
            .and(body_string_contains("Test Email"))
            .and(body_string_contains("\"To Name\" <to@example.com>"))
            .and(body_string_contains("name=\"from_name\"\r\n\r\nFrom Name\r\n"))
            .and(body_string_contains("name=\"from_email\"\r\n\r\nfrom@example.com\r\n"))
            .and(body_string_contains("Test email text"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "response": {"data": {"transaction_id": "foobar"}}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let sent = transport(&server).send(email().into(), None).await.unwrap();

        assert_eq!(sent.message_id(), "foobar");
    }

    #[tokio::test]
    async fn send_with_multiple_tag_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains(
                "name=\"headers[X-Tag][0]\"\r\n\r\ntest-tag-foo\r\n",
            ))
            .and(body_string_contains(
                "name=\"headers[X-Tag][1]\"\r\n\r\ntest-tag-bar\r\n",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "response": {"data": {"transaction_id": "test-message-id"}}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let email = email()
            .header(Header::tag("test-tag-foo"))
            .header(Header::tag("test-tag-bar"));
        let sent = transport(&server).send(email.into(), None).await.unwrap();

        assert_eq!(sent.message_id(), "test-message-id");
    }

    #[tokio::test]
    async fn send_with_attachments_and_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains(
                "name=\"attachments[0]\"; filename=\"report.txt\"",
            ))
            .and(body_string_contains("Content-Type: text/plain\r\n\r\ndata\r\n"))
            .and(body_string_contains(
                "name=\"inline\"\r\n\r\n[{\"mime_type\":\"image/png\",\"filename\":\"logo.png\",\"body\":\"PNG\",\"cid\":\"logo.png\"}]\r\n",
            ))
            .and(body_string_contains(
                "name=\"headers[X-Metadata-Color]\"\r\n\r\nblue\r\n",
            ))
            .and(body_string_contains(
                "name=\"headers[X-Custom]\"\r\n\r\nvalue\r\n",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "response": {"data": {"transaction_id": "with-parts"}}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let email = email()
            .header(Header::metadata("Color", "blue"))
            .header(Header::text("X-Custom", "value"))
            .attach(Attachment::inline("logo.png", "image/png", b"PNG".to_vec()))
            .attach(Attachment::new("report.txt", "text/plain", b"data".to_vec()));
        let sent = transport(&server).send(email.into(), None).await.unwrap();

        assert_eq!(sent.message_id(), "with-parts");
    }

    #[tokio::test]
    async fn send_fails_for_error_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(418).set_body_json(json!({
                "message": "i'm a teapot"
            })))
            .mount(&server)
            .await;

        let err = transport(&server)
            .send(email().into(), None)
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Unable to send an email: i'm a teapot (code 418)."
        );
    }

    #[tokio::test]
    async fn send_fails_for_non_json_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(401)
                    .insert_header("content-type", "text/html")
                    .set_body_string("Forbidden"),
            )
            .mount(&server)
            .await;

        let err = transport(&server)
            .send(email().into(), None)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Unable to send an email: Forbidden (code 401).");
    }

    #[tokio::test]
    async fn send_fails_for_provider_error_code() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "response": {"msg": {"err_code": 6}}
            })))
            .mount(&server)
            .await;

        let err = transport(&server)
            .send(email().into(), None)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "некорректный email-адрес");
    }

    #[tokio::test]
    async fn raw_messages_are_refused() {
        let server = MockServer::start().await;
        let err = transport(&server)
            .send(MailMessage::Raw(b"Subject: hi\r\n\r\nbody".to_vec()), None)
            .await
            .unwrap_err();

        assert!(matches!(err, TransportError::InvalidMessage(_)));
    }

    #[test]
    fn success_without_transaction_id() {
        let id = interpret_response(200, r#"{"response":{"msg":{"err_code":0,"text":"OK"}}}"#);
        assert_eq!(id.unwrap(), None);
    }

    #[test]
    fn error_text_wins_over_table() {
        let err = interpret_response(
            200,
            r#"{"response":{"msg":{"err_code":6,"text":"bad address"}}}"#,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "bad address");
    }

    #[test]
    fn unknown_error_code() {
        let err = interpret_response(200, r#"{"response":{"msg":{"err_code":999}}}"#).unwrap_err();
        assert_eq!(err.to_string(), "unknown error code: 999");
    }

    #[test]
    fn string_error_code() {
        let err = interpret_response(200, r#"{"response":{"msg":{"err_code":"10"}}}"#).unwrap_err();
        assert_eq!(err.to_string(), "пользователь уже отписан");
    }

    #[test]
    fn data_and_msg_are_checked_independently() {
        let id = interpret_response(
            200,
            r#"{"response":{"msg":{"err_code":0},"data":{"transaction_id":"abc"}}}"#,
        );
        assert_eq!(id.unwrap(), Some("abc".to_string()));
    }

    #[test]
    fn unknown_error_without_code_or_text() {
        assert_eq!(error_message(&json!({"response": {}})), "unknown error");
    }
}
