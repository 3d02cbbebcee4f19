use poem_openapi::Object;

#[derive(Object)]
pub struct SendEmailResponseDto {
    pub message_id: String,
}
