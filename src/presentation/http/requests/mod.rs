use std::collections::BTreeMap;

use poem_openapi::{Object, types::Email};

#[derive(Object, Debug)]
pub struct SendEmailRequestDto {
    pub from: Email,
    pub from_name: Option<String>,
    pub to: Vec<Email>,
    #[oai(default)]
    pub cc: Vec<Email>,
    #[oai(default)]
    pub bcc: Vec<Email>,
    #[oai(validator(min_length = 1))]
    pub subject: String,
    pub text: Option<String>,
    pub html: Option<String>,
    #[oai(default)]
    pub tags: Vec<String>,
    /// Sent as `X-Metadata-{key}` headers.
    #[oai(default)]
    pub metadata: BTreeMap<String, String>,
}
