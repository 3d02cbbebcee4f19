use std::sync::Arc;

use poem::{Request, Result as PoemResult, handler, http::StatusCode, web::Data};
use tracing::{info, warn};

use crate::{
    application::webhook::WebhookRequest, domain::errors::WebhookError,
    presentation::http::endpoints::root::ApiState,
};

/// Receives DashaMail event callbacks and hands them to the event bus.
#[handler]
pub async fn dashamail_webhook(
    req: &Request,
    body: Vec<u8>,
    state: Data<&Arc<ApiState>>,
) -> PoemResult<StatusCode> {
    let request = WebhookRequest::new(
        req.method().clone(),
        req.content_type().map(str::to_string),
        body,
    );

    let event = state
        .parser
        .parse(&request, &state.webhook_secret)
        .map_err(rejected)?;

    info!(event = event.name(), id = %event.id(), "dashamail webhook received");

    state.event_bus.publish(event).await.map_err(internal_error)?;

    Ok(StatusCode::ACCEPTED)
}

fn rejected(err: WebhookError) -> poem::Error {
    poem::Error::from_string(err.to_string(), err.status())
}

fn internal_error(err: anyhow::Error) -> poem::Error {
    warn!(error = %err, "mailer event could not be published");
    poem::Error::from_string(err.to_string(), StatusCode::INTERNAL_SERVER_ERROR)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use poem::{Route, http::StatusCode, test::TestClient};
    use serde_json::{Value, json};

    use crate::{
        application::webhook::signature,
        domain::events::MailerEvent,
        presentation::http::endpoints::{
            root::app,
            testing::{FakeTransport, RecordingBus, SECRET, state},
        },
    };

    fn client(bus: Arc<RecordingBus>) -> TestClient<Route> {
        TestClient::new(app(
            state(Arc::new(FakeTransport::default()), bus),
            "http://localhost:3000",
        ))
    }

    fn payload(secret: &str) -> Value {
        json!({
            "event": "opened",
            "email": "to@example.com",
            "message_id": "42",
            "event_time": "2024-01-02 03:04:05",
            "secret": signature("to@example.com", "42", secret),
        })
    }

    #[tokio::test]
    async fn accepts_signed_event() {
        let bus = Arc::new(RecordingBus::default());
        let cli = client(bus.clone());

        let resp = cli
            .post("/webhooks/dashamail")
            .body_json(&payload(SECRET))
            .send()
            .await;

        resp.assert_status(StatusCode::ACCEPTED);

        let events = bus.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], MailerEvent::Engagement(_)));
        assert_eq!(events[0].id(), "42");
    }

    #[tokio::test]
    async fn accepts_form_encoded_event() {
        let bus = Arc::new(RecordingBus::default());
        let cli = client(bus.clone());
        let body = format!(
            "event=bounced&email=to%40example.com&message_id=42&event_time=2024-01-02+03%3A04%3A05&description=mailbox+full&secret={}",
            signature("to@example.com", "42", SECRET)
        );

        let resp = cli
            .post("/webhooks/dashamail")
            .content_type("application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await;

        resp.assert_status(StatusCode::ACCEPTED);
        assert_eq!(
            bus.events.lock().unwrap()[0].reason(),
            Some("mailbox full")
        );
    }

    #[tokio::test]
    async fn rejects_wrong_signature() {
        let bus = Arc::new(RecordingBus::default());
        let cli = client(bus.clone());

        let resp = cli
            .post("/webhooks/dashamail")
            .body_json(&payload("another-secret"))
            .send()
            .await;

        resp.assert_status(StatusCode::NOT_ACCEPTABLE);
        resp.assert_text("Payload is malformed.").await;
        assert!(bus.events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejects_unsupported_event() {
        let cli = client(Arc::new(RecordingBus::default()));
        let mut body = payload(SECRET);
        body["event"] = json!("teleported");

        let resp = cli.post("/webhooks/dashamail").body_json(&body).send().await;

        resp.assert_status(StatusCode::NOT_ACCEPTABLE);
        resp.assert_text("Unsupported event \"teleported\".").await;
    }

    #[tokio::test]
    async fn rejects_other_methods() {
        let cli = client(Arc::new(RecordingBus::default()));

        let resp = cli.get("/webhooks/dashamail").send().await;

        resp.assert_status(StatusCode::NOT_ACCEPTABLE);
        resp.assert_text("Request does not match.").await;
    }
}
