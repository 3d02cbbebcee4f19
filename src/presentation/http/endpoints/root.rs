use std::sync::Arc;

use poem::{EndpointExt, Route};
use poem_openapi::{OpenApiService, Tags};

use crate::application::{
    services::{event_bus::MailerEventBus, transport::MailTransport},
    webhook::RequestParser,
};

use super::{messages::MessagesEndpoints, webhooks::dashamail_webhook};

#[derive(Clone)]
pub struct ApiState {
    pub transport: Arc<dyn MailTransport>,
    pub parser: Arc<dyn RequestParser>,
    pub event_bus: Arc<dyn MailerEventBus>,
    pub webhook_secret: String,
}

/// Enum of API sections (tags)
#[derive(Tags)]
pub enum EndpointsTags {
    Health,
    Messages,
}

pub struct Endpoints;

pub type Api = (Endpoints, MessagesEndpoints);

pub fn api(state: Arc<ApiState>) -> Api {
    (Endpoints, MessagesEndpoints::new(state))
}

/// OpenAPI routes under `/api`, the webhook receiver and swagger UI at `/`.
pub fn app(state: Arc<ApiState>, server_url: &str) -> Route {
    let api_service = OpenApiService::new(api(state.clone()), "DashaMail Mailer API", "0.1.0")
        .server(format!("{server_url}/api"));
    let ui = api_service.swagger_ui();

    Route::new()
        .nest("/api", api_service)
        .at("/webhooks/dashamail", dashamail_webhook.data(state))
        .nest("/", ui)
}
