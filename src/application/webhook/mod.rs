pub mod converter;
pub mod parser;
pub mod request;

pub use converter::{DashaMailPayloadConverter, PayloadConverter};
pub use parser::{DashaMailRequestParser, RequestParser, signature};
pub use request::WebhookRequest;
