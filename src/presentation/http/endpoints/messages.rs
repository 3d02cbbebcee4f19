use std::sync::Arc;

use poem::{Result as PoemResult, http::StatusCode};
use poem_openapi::{OpenApi, payload::Json};
use tracing::{info, warn};

use crate::{
    domain::errors::TransportError,
    presentation::http::{
        endpoints::root::{ApiState, EndpointsTags},
        mappers::{map_email, map_sent},
        requests::SendEmailRequestDto,
        responses::SendEmailResponseDto,
    },
};

#[derive(Clone)]
pub struct MessagesEndpoints {
    state: Arc<ApiState>,
}

impl MessagesEndpoints {
    pub fn new(state: Arc<ApiState>) -> Self {
        Self { state }
    }
}

#[OpenApi]
impl MessagesEndpoints {
    #[oai(
        path = "/messages",
        method = "post",
        tag = EndpointsTags::Messages,
    )]
    pub async fn send_message(
        &self,
        request: Json<SendEmailRequestDto>,
    ) -> PoemResult<Json<SendEmailResponseDto>> {
        let email = map_email(&request);

        let sent = self
            .state
            .transport
            .send(email.into(), None)
            .await
            .map_err(transport_error)?;

        info!(
            message_id = %sent.message_id(),
            transport = %self.state.transport,
            "email sent"
        );

        Ok(Json(map_sent(&sent)))
    }
}

fn transport_error(err: TransportError) -> poem::Error {
    warn!(error = %err, "email was not sent");

    let status = match err {
        TransportError::InvalidMessage(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::BAD_GATEWAY,
    };

    poem::Error::from_string(err.to_string(), status)
}
